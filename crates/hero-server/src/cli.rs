use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::config::loader::{DEFAULT_CONFIG_PATH, default_config_toml};

#[derive(Parser)]
#[command(name = "hero")]
#[command(about = "hero: an OAuth 2.0 authorization server")]
#[command(version)]
pub struct Cli {
    /// Defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the authorization server
    Serve(ServeArgs),
    /// Print or write the default configuration as TOML
    Genconf(GenconfArgs),
}

#[derive(Args, Default)]
pub struct ServeArgs {
    /// Configuration file (overrides HERO_CONFIG)
    #[arg(short, long)]
    pub config: Option<String>,
}

#[derive(Args)]
pub struct GenconfArgs {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// From --config CLI argument
    CliArgument,
    /// From HERO_CONFIG environment variable
    EnvironmentVariable,
    /// Default path (hero.toml)
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (HERO_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Resolve the configuration file path.
///
/// Priority order:
/// 1. CLI argument: --config <path>
/// 2. Environment variable: HERO_CONFIG
/// 3. Default: hero.toml
pub fn resolve_config_path(cli_path: Option<&str>) -> (String, ConfigSource) {
    if let Some(path) = cli_path {
        return (path.to_string(), ConfigSource::CliArgument);
    }
    if let Ok(path) = std::env::var("HERO_CONFIG") {
        if !path.is_empty() {
            return (path, ConfigSource::EnvironmentVariable);
        }
    }
    (DEFAULT_CONFIG_PATH.to_string(), ConfigSource::Default)
}

/// `hero genconf`
pub fn genconf(args: &GenconfArgs) -> anyhow::Result<()> {
    let rendered = default_config_toml().map_err(anyhow::Error::msg)?;
    match &args.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{rendered}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["hero"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["hero", "serve", "--config", "dev.toml"]).unwrap();
        match cli.command {
            Some(Commands::Serve(args)) => assert_eq!(args.config.as_deref(), Some("dev.toml")),
            _ => panic!("expected serve"),
        }

        let cli = Cli::try_parse_from(["hero", "genconf", "-o", "out.toml"]).unwrap();
        match cli.command {
            Some(Commands::Genconf(args)) => {
                assert_eq!(args.output, Some(PathBuf::from("out.toml")));
            }
            _ => panic!("expected genconf"),
        }

        assert!(Cli::try_parse_from(["hero", "frobnicate"]).is_err());
    }

    #[test]
    fn test_cli_path_wins() {
        let (path, source) = resolve_config_path(Some("custom.toml"));
        assert_eq!(path, "custom.toml");
        assert_eq!(source, ConfigSource::CliArgument);
    }

    #[test]
    fn test_genconf_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hero.toml");
        genconf(&GenconfArgs {
            output: Some(path.clone()),
        })
        .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("[server]"));
        assert!(written.contains("token_endpoint = \"/tokens\""));
    }
}
