//! User storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::{Profile, User};

/// Storage operations for resource owners and their profiles.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Persist a new user and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Conflict` if the username or email is taken.
    async fn create(&self, user: User) -> AuthResult<User>;

    async fn find_by_id(&self, id: i64) -> AuthResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>>;

    /// Profile of `user_id`, if one was saved.
    async fn profile(&self, user_id: i64) -> AuthResult<Option<Profile>>;

    /// Insert or replace the profile of `profile.user_id`.
    async fn save_profile(&self, profile: Profile) -> AuthResult<Profile>;
}
