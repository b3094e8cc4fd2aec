pub mod account;
pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod handlers;
pub mod observability;
pub mod server;

pub use config::AppConfig;
pub use observability::{apply_logging_level, init_tracing};
pub use server::{HeroServer, ServerBuilder, build_app, build_app_with_storage};
