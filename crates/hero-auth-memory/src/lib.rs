//! In-memory storage backend for hero.
//!
//! Implements every `hero-auth` storage trait over `DashMap`s. Data lives
//! only as long as the process, which makes this backend suited to tests,
//! development and single-instance deployments.
//!
//! # Example
//!
//! ```
//! use hero_auth::{OAuthConfig, OAuthService};
//! use hero_auth_memory::create_auth_storage;
//!
//! let service = OAuthService::new(create_auth_storage(), OAuthConfig::default());
//! assert_eq!(service.config().token_endpoint, "/tokens");
//! ```

pub mod storage;

use std::sync::Arc;

use hero_auth::AuthStorage;

pub use storage::MemoryStorage;

/// Creates a fresh in-memory [`AuthStorage`].
pub fn create_auth_storage() -> AuthStorage {
    Arc::new(MemoryStorage::new()).auth_storage()
}
