//! Browser session storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Session;

/// Key/value persistence for browser sessions.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Find a session by key. Expired sessions are reported as absent.
    async fn find(&self, key: &str) -> AuthResult<Option<Session>>;

    /// Insert or replace the session stored under `session.key`.
    async fn save(&self, session: Session) -> AuthResult<()>;

    /// Delete a session. Returns `false` if it did not exist.
    async fn delete(&self, key: &str) -> AuthResult<bool>;
}
