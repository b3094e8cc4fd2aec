use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A resource owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Storage-assigned identifier.
    #[serde(default)]
    pub id: i64,

    /// Unique login name.
    pub username: String,

    /// Unique email address.
    pub email: String,

    /// Avatar URL, if the user set one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    /// Argon2 PHC hash of the password.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the user registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl User {
    /// Creates an unpersisted user from an already hashed password.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            username: username.into(),
            email: email.into(),
            avatar: None,
            password_hash: password_hash.into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Sets the avatar URL.
    #[must_use]
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }
}

/// Display profile of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Storage-assigned identifier.
    #[serde(default)]
    pub id: i64,

    /// Owning user.
    pub user_id: i64,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Profile {
    /// Profile seeded from the user's own fields.
    pub fn for_user(user: &User) -> Self {
        Self {
            id: 0,
            user_id: user.id,
            first_name: String::new(),
            last_name: String::new(),
            username: user.username.clone(),
            email: user.email.clone(),
            avatar_url: user.avatar.clone(),
        }
    }

    /// First and last name joined, falling back to the username.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}
