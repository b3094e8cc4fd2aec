//! Client storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Client;

// =============================================================================
// Client Storage Trait
// =============================================================================

/// Storage operations for OAuth 2.0 clients.
///
/// # Example
///
/// ```ignore
/// use hero_auth::storage::ClientStorage;
///
/// async fn example(storage: &impl ClientStorage) -> hero_auth::AuthResult<()> {
///     if let Some(client) = storage.find_by_uuid("b9c1...").await? {
///         println!("Found client: {}", client.name);
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Persist a new client and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Conflict` if the public UUID is taken.
    async fn create(&self, client: Client) -> AuthResult<Client>;

    async fn find_by_id(&self, id: i64) -> AuthResult<Option<Client>>;

    /// Find a client by the public identifier it presents as `client_id`.
    async fn find_by_uuid(&self, uuid: &str) -> AuthResult<Option<Client>>;

    /// Clients registered by `user_id`, oldest first.
    async fn list_by_owner(&self, user_id: i64) -> AuthResult<Vec<Client>>;

    /// Delete a client. Returns `false` if it did not exist.
    async fn delete(&self, id: i64) -> AuthResult<bool>;
}
