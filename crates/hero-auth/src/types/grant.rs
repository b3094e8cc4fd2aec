use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// What a grant record stands for.
///
/// Only [`GrantKind::Code`] and [`GrantKind::Access`] are ever persisted. The
/// remaining kinds describe the in-memory source grant handed to the
/// finalizer by the flow that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantKind {
    /// Pending authorization code awaiting exchange at the token endpoint.
    Code,
    /// Implicit grant from `response_type=token`.
    Implicit,
    /// Resource owner password credentials.
    Password,
    ClientCredentials,
    Assertion,
    /// Exchange of a refresh token for a new access grant.
    Refresh,
    /// Finalized access grant carrying an access and a refresh token.
    Access,
}

/// One authorization event: a pending code or a finalized access grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Storage-assigned identifier. `0` until persisted.
    #[serde(default)]
    pub id: i64,

    /// Opaque authorization code. Empty for grants that never had one.
    #[serde(default)]
    pub code: String,

    pub kind: GrantKind,

    pub user_id: i64,

    pub client_id: i64,

    /// Linked access token, `0` when none.
    #[serde(default)]
    pub access_token_id: i64,

    /// Linked refresh token, `0` when none.
    #[serde(default)]
    pub refresh_token_id: i64,

    /// Comma separated scope list.
    #[serde(default)]
    pub scope: String,

    #[serde(default)]
    pub state: String,

    #[serde(default)]
    pub redirect_url: String,

    /// Lifetime in seconds counted from `created_at`.
    pub expires_in: i64,

    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Grant {
    /// Creates an unpersisted grant of the given kind.
    pub fn new(kind: GrantKind, client_id: i64, user_id: i64) -> Self {
        Self {
            id: 0,
            code: String::new(),
            kind,
            user_id,
            client_id,
            access_token_id: 0,
            refresh_token_id: 0,
            scope: String::new(),
            state: String::new(),
            redirect_url: String::new(),
            expires_in: 0,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Creates a pending authorization code.
    pub fn pending_code(code: impl Into<String>, client_id: i64, user_id: i64, expires_in: i64) -> Self {
        Self {
            code: code.into(),
            expires_in,
            ..Self::new(GrantKind::Code, client_id, user_id)
        }
    }

    /// Builds the finalized access grant that replaces `source`.
    pub fn access_for(source: &Grant, access_token_id: i64, refresh_token_id: i64, expires_in: i64) -> Self {
        Self {
            access_token_id,
            refresh_token_id,
            scope: source.scope.clone(),
            state: source.state.clone(),
            redirect_url: source.redirect_url.clone(),
            expires_in,
            ..Self::new(GrantKind::Access, source.client_id, source.user_id)
        }
    }

    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    #[must_use]
    pub fn with_redirect_url(mut self, redirect_url: impl Into<String>) -> Self {
        self.redirect_url = redirect_url.into();
        self
    }

    /// Returns `true` while the code still awaits exchange.
    pub fn is_pending_code(&self) -> bool {
        self.kind == GrantKind::Code
    }

    /// Instant at which the grant stops being valid, or `None` when the
    /// lifetime runs past the representable range.
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        self.created_at.checked_add(Duration::seconds(self.expires_in))
    }

    /// Returns `true` once `created_at + expires_in` has been reached.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc())
    }

    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at().is_some_and(|at| now >= at)
    }
}
