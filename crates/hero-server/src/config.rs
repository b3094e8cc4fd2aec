use hero_auth::config::{OAuthConfig, SessionConfig};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::account::ACCOUNT_PATHS;

/// Paths served outside the OAuth and account routers.
const RESERVED_PATHS: &[&str] = &["/healthz", "/readyz"];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// OAuth engine configuration (lifetimes, grant allow-list, endpoints)
    #[serde(default)]
    pub oauth: OAuthConfig,
    /// Browser session cookie configuration
    #[serde(default)]
    pub session: SessionConfig,
    /// Development seed data (initial user and client)
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Server validations
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.server.body_limit_bytes == 0 {
            return Err("server.body_limit_bytes must be > 0".into());
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        // OAuth validation
        self.oauth.validate().map_err(|e| format!("oauth: {e}"))?;
        for endpoint in [
            &self.oauth.auth_endpoint,
            &self.oauth.token_endpoint,
            &self.oauth.info_endpoint,
        ] {
            let path = endpoint.as_str();
            if RESERVED_PATHS.contains(&path) || ACCOUNT_PATHS.contains(&path) {
                return Err(format!("oauth endpoint '{path}' collides with a built-in route"));
            }
        }
        // Session validation
        self.session.validate().map_err(|e| e.to_string())?;
        // Bootstrap validation
        if let Some(user) = &self.bootstrap.user {
            if user.username.is_empty() || user.password.is_empty() {
                return Err("bootstrap.user requires username and password".into());
            }
        }
        if let Some(client) = &self.bootstrap.client {
            if self.bootstrap.user.is_none() {
                return Err("bootstrap.client requires bootstrap.user as its owner".into());
            }
            if client.uuid.is_empty() || client.secret.is_empty() {
                return Err("bootstrap.client requires uuid and secret".into());
            }
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8090
}
fn default_body_limit() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Seed data created at startup when absent.
///
/// Secrets can be supplied through the environment instead of the file:
/// - HERO__BOOTSTRAP__USER__PASSWORD
/// - HERO__BOOTSTRAP__CLIENT__SECRET
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BootstrapConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<BootstrapUser>,
    /// Owned by the bootstrap user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<BootstrapClient>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapUser {
    pub username: String,
    #[serde(default)]
    pub email: String,
    /// Plain text, hashed before storage.
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapClient {
    #[serde(default = "default_client_name")]
    pub name: String,
    /// Public `client_id`.
    pub uuid: String,
    /// Plain text, hashed before storage.
    pub secret: String,
    #[serde(default)]
    pub redirect_url: String,
}

fn default_client_name() -> String {
    "default".into()
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::{Path, PathBuf};

    /// Default configuration file, looked up in the working directory.
    pub const DEFAULT_CONFIG_PATH: &str = "hero.toml";

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_PATH));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        // Environment variable overrides, e.g., HERO__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("HERO")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }

    pub fn load_config_with_default_path<P: AsRef<Path>>(
        path: Option<P>,
    ) -> Result<AppConfig, String> {
        let p = path
            .as_ref()
            .map(|p| p.as_ref().to_string_lossy().to_string());
        load_config(p.as_deref())
    }

    /// Renders the default configuration as TOML.
    pub fn default_config_toml() -> Result<String, String> {
        toml::to_string_pretty(&AppConfig::default())
            .map_err(|e| format!("config serialize error: {e}"))
    }
}
