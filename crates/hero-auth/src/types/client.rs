use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::oauth::redirect::first_uri;

/// A registered OAuth 2.0 client application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Storage-assigned identifier.
    #[serde(default)]
    pub id: i64,

    /// Public client identifier presented as `client_id`.
    pub uuid: String,

    /// User who registered the client.
    pub user_id: i64,

    /// Human readable name.
    pub name: String,

    /// Argon2 PHC hash of the client secret.
    #[serde(skip_serializing)]
    pub secret_hash: String,

    /// One or more registered redirect URIs joined by the configured
    /// separator.
    #[serde(default)]
    pub redirect_url: String,

    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Client {
    /// Creates an unpersisted client from an already hashed secret.
    pub fn new(
        uuid: impl Into<String>,
        user_id: i64,
        name: impl Into<String>,
        secret_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            uuid: uuid.into(),
            user_id,
            name: name.into(),
            secret_hash: secret_hash.into(),
            redirect_url: String::new(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Sets the registered redirect URI(s).
    #[must_use]
    pub fn with_redirect_url(mut self, redirect_url: impl Into<String>) -> Self {
        self.redirect_url = redirect_url.into();
        self
    }

    /// First registered redirect URI.
    pub fn first_redirect<'a>(&'a self, separator: &str) -> &'a str {
        first_uri(&self.redirect_url, separator)
    }
}
