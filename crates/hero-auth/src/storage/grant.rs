//! Grant storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Grant;

// =============================================================================
// Grant Storage Trait
// =============================================================================

/// Storage operations for pending codes and finalized access grants.
///
/// # Single use
///
/// [`remove`](GrantStorage::remove) is the redemption gate. It must be an
/// atomic conditional delete: when several callers race to remove the same
/// grant, exactly one observes `true`. A SQL backend would implement it as
///
/// ```sql
/// DELETE FROM grants WHERE id = $1 RETURNING id
/// ```
///
/// and report whether a row came back.
#[async_trait]
pub trait GrantStorage: Send + Sync {
    /// Persist a new grant and return it with its assigned id.
    async fn create(&self, grant: Grant) -> AuthResult<Grant>;

    /// Pending authorization code `code` issued to `client_id`.
    async fn find_by_client_code(&self, client_id: i64, code: &str) -> AuthResult<Option<Grant>>;

    /// Grant linked to the access token with id `token_id`.
    async fn find_by_access_token(&self, token_id: i64) -> AuthResult<Option<Grant>>;

    /// Grant linked to the refresh token with id `token_id`.
    async fn find_by_refresh_token(&self, token_id: i64) -> AuthResult<Option<Grant>>;

    /// Atomically delete a grant.
    ///
    /// Returns `true` only for the caller that actually removed it.
    async fn remove(&self, id: i64) -> AuthResult<bool>;
}
