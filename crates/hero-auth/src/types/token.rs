use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// An opaque bearer credential, used both for access and refresh tokens.
///
/// Tokens are immutable once created. Their lifetime is carried by the
/// grant that links them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    #[serde(default)]
    pub id: i64,

    /// The opaque value handed to the client.
    pub code: String,

    pub client_id: i64,

    pub user_id: i64,

    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Token {
    pub fn new(code: impl Into<String>, client_id: i64, user_id: i64) -> Self {
        Self {
            id: 0,
            code: code.into(),
            client_id,
            user_id,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}
