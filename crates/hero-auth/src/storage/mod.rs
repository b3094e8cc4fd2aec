//! Storage traits for the authorization server.
//!
//! The engines consume persistence only through these capability traits.
//! Every lookup is a fresh query; nothing is cached in-process.
//!
//! # Implementations
//!
//! - `hero-auth-memory` - in-memory backend built on `dashmap`

pub mod client;
pub mod grant;
pub mod session;
pub mod token;
pub mod user;

use std::sync::Arc;

pub use client::ClientStorage;
pub use grant::GrantStorage;
pub use session::SessionStorage;
pub use token::TokenStorage;
pub use user::UserStorage;

// =============================================================================
// Storage Bundle
// =============================================================================

/// All storage collaborators of the authorization server.
///
/// Cheap to clone; every field is a shared trait object.
#[derive(Clone)]
pub struct AuthStorage {
    pub users: Arc<dyn UserStorage>,
    pub clients: Arc<dyn ClientStorage>,
    pub grants: Arc<dyn GrantStorage>,
    pub tokens: Arc<dyn TokenStorage>,
    pub sessions: Arc<dyn SessionStorage>,
}

impl AuthStorage {
    pub fn new(
        users: Arc<dyn UserStorage>,
        clients: Arc<dyn ClientStorage>,
        grants: Arc<dyn GrantStorage>,
        tokens: Arc<dyn TokenStorage>,
        sessions: Arc<dyn SessionStorage>,
    ) -> Self {
        Self {
            users,
            clients,
            grants,
            tokens,
            sessions,
        }
    }
}

impl std::fmt::Debug for AuthStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStorage").finish_non_exhaustive()
    }
}
