use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Server-side record of a browser session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque key carried by the session cookie.
    pub key: String,

    /// Serialized session values.
    pub data: String,

    #[serde(with = "time::serde::rfc3339")]
    pub expires_on: OffsetDateTime,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc())
    }

    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_on
    }
}
