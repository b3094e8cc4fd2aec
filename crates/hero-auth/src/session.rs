//! Cookie-backed browser sessions.
//!
//! The cookie carries only an opaque random key. Session values live in
//! [`SessionStorage`] as JSON-serialized [`SessionData`], which records the
//! signed-in resource owner and queued flash messages.

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::config::SessionConfig;
use crate::storage::SessionStorage;
use crate::token_gen::{RandomTokenGenerator, TokenGenerator};
use crate::types::Session;
use crate::{AuthError, AuthResult};

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

impl FlashKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

/// One-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub text: String,
}

/// Values stored in a browser session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flashes: Vec<FlashMessage>,
}

/// Session of the current request.
#[derive(Debug, Clone, Default)]
pub struct BrowserSession {
    /// Storage key, `None` until first saved.
    pub key: Option<String>,
    pub data: SessionData,
}

impl BrowserSession {
    pub fn user_id(&self) -> Option<i64> {
        self.data.user_id
    }

    pub fn sign_in(&mut self, user_id: i64) {
        self.data.user_id = Some(user_id);
    }

    pub fn push_flash(&mut self, kind: FlashKind, text: impl Into<String>) {
        self.data.flashes.push(FlashMessage {
            kind,
            text: text.into(),
        });
    }

    /// Removes and returns all queued flash messages.
    pub fn take_flashes(&mut self) -> Vec<FlashMessage> {
        std::mem::take(&mut self.data.flashes)
    }
}

/// Loads and persists [`BrowserSession`]s through a cookie.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    config: SessionConfig,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>, config: SessionConfig) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Loads the session named by the request cookie.
    ///
    /// A missing cookie, an unknown or expired key, and unreadable data all
    /// yield a fresh session.
    ///
    /// # Errors
    ///
    /// Returns storage failures.
    pub async fn load(&self, jar: &CookieJar) -> AuthResult<BrowserSession> {
        let Some(cookie) = jar.get(&self.config.cookie_name) else {
            return Ok(BrowserSession::default());
        };
        let key = cookie.value();

        let Some(record) = self.storage.find(key).await? else {
            return Ok(BrowserSession::default());
        };

        match serde_json::from_str(&record.data) {
            Ok(data) => Ok(BrowserSession {
                key: Some(record.key),
                data,
            }),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable session data");
                Ok(BrowserSession::default())
            }
        }
    }

    /// Persists `session`, assigning a key on first save, and returns the
    /// jar carrying the refreshed cookie.
    ///
    /// # Errors
    ///
    /// Returns serialization and storage failures.
    pub async fn save(&self, jar: CookieJar, session: &mut BrowserSession) -> AuthResult<CookieJar> {
        let key = session
            .key
            .get_or_insert_with(|| RandomTokenGenerator.generate())
            .clone();
        let data = serde_json::to_string(&session.data)
            .map_err(|e| AuthError::internal(format!("session serialization failed: {e}")))?;

        self.storage
            .save(Session {
                key: key.clone(),
                data,
                expires_on: OffsetDateTime::now_utc() + self.max_age(),
            })
            .await?;

        Ok(jar.add(self.cookie(key, self.max_age())))
    }

    /// Deletes the stored session and expires the cookie.
    ///
    /// # Errors
    ///
    /// Returns storage failures.
    pub async fn destroy(&self, jar: CookieJar, session: &BrowserSession) -> AuthResult<CookieJar> {
        if let Some(key) = &session.key {
            self.storage.delete(key).await?;
        }
        Ok(jar.add(self.cookie(String::new(), time::Duration::ZERO)))
    }

    /// Resource owner signed in through the request cookie, if any.
    pub async fn authenticated_user(&self, jar: &CookieJar) -> Option<i64> {
        match self.load(jar).await {
            Ok(session) => session.user_id(),
            Err(e) => {
                tracing::warn!(error = %e, "session lookup failed");
                None
            }
        }
    }

    fn max_age(&self) -> time::Duration {
        time::Duration::seconds(i64::try_from(self.config.max_age.as_secs()).unwrap_or(i64::MAX))
    }

    fn cookie(&self, value: String, max_age: time::Duration) -> Cookie<'static> {
        let mut builder = Cookie::build((self.config.cookie_name.clone(), value))
            .path(self.config.path.clone())
            .http_only(self.config.http_only)
            .secure(self.config.secure)
            .same_site(SameSite::Lax)
            .max_age(max_age);
        if let Some(domain) = &self.config.domain {
            builder = builder.domain(domain.clone());
        }
        builder.build()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
