//! OAuth engine and browser session configuration.
//!
//! # Example (TOML)
//!
//! ```toml
//! [oauth]
//! redirect_separator = ";"
//! authorization_expire = "200s"
//! access_expire = "1h"
//! allow_get_access = false
//!
//! [session]
//! cookie_name = "_hero"
//! max_age = "30days"
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::oauth::grant_type;

/// Grant types the token engine knows how to process.
pub const SUPPORTED_GRANT_TYPES: [&str; 5] = [
    grant_type::AUTHORIZATION_CODE,
    grant_type::REFRESH_TOKEN,
    grant_type::PASSWORD,
    grant_type::CLIENT_CREDENTIALS,
    grant_type::ASSERTION,
];

/// OAuth 2.0 engine configuration.
///
/// Controls code and token lifetimes, the grant allow-list, endpoint paths
/// and how registered redirect URI lists are split.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// Separator between multiple registered redirect URIs of one client.
    /// Empty means every client registers exactly one URI.
    pub redirect_separator: String,

    /// Lifetime of authorization codes issued by `/authorize`.
    #[serde(with = "humantime_serde")]
    pub authorization_expire: Duration,

    /// Lifetime of access grants produced by the finalizer.
    #[serde(with = "humantime_serde")]
    pub access_expire: Duration,

    /// Accept `GET` on the token endpoint in addition to `POST`.
    pub allow_get_access: bool,

    /// Grant types accepted by the token endpoint.
    pub allowed_grant_types: Vec<String>,

    /// Value of `token_type` in token responses.
    pub token_type: String,

    /// Name shown on server-rendered pages.
    pub provider_name: String,

    /// Path of the authorization endpoint.
    pub auth_endpoint: String,

    /// Path of the token endpoint.
    pub token_endpoint: String,

    /// Path of the bearer-protected info endpoint.
    pub info_endpoint: String,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            redirect_separator: String::new(),
            authorization_expire: Duration::from_secs(200),
            access_expire: Duration::from_secs(200),
            allow_get_access: false,
            allowed_grant_types: SUPPORTED_GRANT_TYPES
                .iter()
                .map(|g| (*g).to_string())
                .collect(),
            token_type: "Bearer".to_string(),
            provider_name: "hero".to_string(),
            auth_endpoint: "/authorize".to_string(),
            token_endpoint: "/tokens".to_string(),
            info_endpoint: "/info".to_string(),
        }
    }
}

impl OAuthConfig {
    /// Returns `true` if the token endpoint accepts `grant_type`.
    #[must_use]
    pub fn access_allowed(&self, grant_type: &str) -> bool {
        self.allowed_grant_types.iter().any(|g| g == grant_type)
    }

    /// Authorization code lifetime in whole seconds.
    #[must_use]
    pub fn authorization_expire_secs(&self) -> i64 {
        duration_secs(self.authorization_expire)
    }

    /// Access grant lifetime in whole seconds.
    #[must_use]
    pub fn access_expire_secs(&self) -> i64 {
        duration_secs(self.access_expire)
    }

    /// Sets the redirect URI list separator.
    #[must_use]
    pub fn with_redirect_separator(mut self, separator: impl Into<String>) -> Self {
        self.redirect_separator = separator.into();
        self
    }

    /// Sets the authorization code lifetime.
    #[must_use]
    pub fn with_authorization_expire(mut self, lifetime: Duration) -> Self {
        self.authorization_expire = lifetime;
        self
    }

    /// Sets the access grant lifetime.
    #[must_use]
    pub fn with_access_expire(mut self, lifetime: Duration) -> Self {
        self.access_expire = lifetime;
        self
    }

    /// Enables or disables `GET` on the token endpoint.
    #[must_use]
    pub fn with_get_access(mut self, allow: bool) -> Self {
        self.allow_get_access = allow;
        self
    }

    /// Replaces the grant type allow-list.
    #[must_use]
    pub fn with_allowed_grant_types<I, S>(mut self, grants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_grant_types = grants.into_iter().map(Into::into).collect();
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a lifetime is zero, an endpoint
    /// path is not absolute or reused, or a grant type is unknown, and
    /// `ConfigError::Missing` if `token_type` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.authorization_expire.is_zero() {
            return Err(ConfigError::InvalidValue(
                "authorization_expire must be > 0".to_string(),
            ));
        }
        if self.access_expire.is_zero() {
            return Err(ConfigError::InvalidValue(
                "access_expire must be > 0".to_string(),
            ));
        }
        if self.token_type.trim().is_empty() {
            return Err(ConfigError::Missing("token_type".to_string()));
        }

        let endpoints = [
            ("auth_endpoint", &self.auth_endpoint),
            ("token_endpoint", &self.token_endpoint),
            ("info_endpoint", &self.info_endpoint),
        ];
        for (name, path) in endpoints {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidValue(format!(
                    "{name} must start with '/', got '{path}'"
                )));
            }
        }
        if self.auth_endpoint == self.token_endpoint
            || self.auth_endpoint == self.info_endpoint
            || self.token_endpoint == self.info_endpoint
        {
            return Err(ConfigError::InvalidValue(
                "auth, token and info endpoints must be distinct".to_string(),
            ));
        }

        for grant in &self.allowed_grant_types {
            if !SUPPORTED_GRANT_TYPES.contains(&grant.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "Invalid grant type: '{grant}'. Must be one of {SUPPORTED_GRANT_TYPES:?}"
                )));
            }
        }

        Ok(())
    }
}

/// Browser session cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the session cookie.
    pub cookie_name: String,

    /// Cookie path attribute.
    pub path: String,

    /// Cookie domain attribute. Host-only when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// How long a session stays valid after its last save.
    #[serde(with = "humantime_serde")]
    pub max_age: Duration,

    /// Only send the cookie over HTTPS.
    pub secure: bool,

    /// Hide the cookie from scripts.
    pub http_only: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "_hero".to_string(),
            path: "/".to_string(),
            domain: None,
            max_age: Duration::from_secs(2_592_000), // 30 days
            secure: false,
            http_only: true,
        }
    }
}

impl SessionConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the cookie name is empty and
    /// `ConfigError::InvalidValue` if `max_age` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cookie_name.is_empty() {
            return Err(ConfigError::Missing("session.cookie_name".to_string()));
        }
        if self.max_age.is_zero() {
            return Err(ConfigError::InvalidValue(
                "session.max_age must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn duration_secs(duration: Duration) -> i64 {
    i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}
