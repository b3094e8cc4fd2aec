use clap::Parser;

use hero_server::cli::{Cli, Commands, ServeArgs, genconf, resolve_config_path};
use hero_server::config::loader::load_config;
use hero_server::{ServerBuilder, apply_logging_level, init_tracing};

#[tokio::main]
async fn main() {
    // Load .env file if present (before anything else)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist - it's optional
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound) {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Genconf(args)) => {
            if let Err(e) = genconf(&args) {
                eprintln!("genconf failed: {e:#}");
                std::process::exit(1);
            }
        }
        Some(Commands::Serve(args)) => serve(args).await,
        None => serve(ServeArgs::default()).await,
    }
}

async fn serve(args: ServeArgs) {
    // Initialize tracing early with the default level
    init_tracing();

    let (config_path, source) = resolve_config_path(args.config.as_deref());

    let cfg = match load_config(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!(
        path = %config_path,
        source = %source,
        "Configuration loaded"
    );

    apply_logging_level(&cfg.logging.level);

    let server = match ServerBuilder::new().with_config(cfg).build().await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Server initialization failed: {e:#}");
            std::process::exit(2);
        }
    };

    if let Err(err) = server.run().await {
        eprintln!("Server error: {err:#}");
    }
}
