//! Token storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Token;

/// Storage operations for opaque access and refresh tokens.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Persist a new token and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Conflict` if the code already exists.
    async fn create(&self, token: Token) -> AuthResult<Token>;

    async fn find_by_id(&self, id: i64) -> AuthResult<Option<Token>>;

    async fn find_by_code(&self, code: &str) -> AuthResult<Option<Token>>;
}
