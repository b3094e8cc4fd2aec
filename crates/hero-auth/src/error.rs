//! Error types for the authorization engine.
//!
//! Component functions return [`AuthError`] for infrastructure and credential
//! faults. Only the engines translate these into wire-level OAuth error codes.

use std::fmt;

use crate::oauth::OAuthErrorCode;
use crate::oauth::redirect::RedirectError;

/// Errors that can occur while authorizing requests or issuing tokens.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Client credentials could not be extracted from the request.
    #[error("Invalid client authentication: {message}")]
    InvalidClientAuth {
        /// Description of why extraction failed.
        message: String,
    },

    /// The request is malformed.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of why the request is invalid.
        message: String,
    },

    /// The authorization code or refresh grant was already redeemed.
    #[error("Grant {id} was already consumed")]
    GrantConsumed {
        /// Identifier of the consumed grant.
        id: i64,
    },

    /// A redirect URI failed validation.
    #[error(transparent)]
    Redirect(#[from] RedirectError),

    /// The stored redirect target of a response could not be parsed.
    #[error("Malformed redirect target {url}: {source}")]
    MalformedRedirectTarget {
        /// The offending URL.
        url: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },

    /// A uniqueness constraint was violated.
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflicting value.
        message: String,
    },

    /// An error occurred while storing or retrieving data.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// Password or secret hashing failed.
    #[error("Hashing error: {message}")]
    Hashing {
        /// Description of the hashing error.
        message: String,
    },

    /// The configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `InvalidClientAuth` error.
    #[must_use]
    pub fn invalid_client_auth(message: impl Into<String>) -> Self {
        Self::InvalidClientAuth {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `MalformedRedirectTarget` error.
    #[must_use]
    pub fn malformed_redirect(url: impl Into<String>, source: url::ParseError) -> Self {
        Self::MalformedRedirectTarget {
            url: url.into(),
            source,
        }
    }

    /// Creates a new `Conflict` error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Hashing` error.
    #[must_use]
    pub fn hashing(message: impl Into<String>) -> Self {
        Self::Hashing {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if the fault lies with the caller.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidClientAuth { .. }
                | Self::InvalidRequest { .. }
                | Self::GrantConsumed { .. }
                | Self::Redirect(_)
                | Self::Conflict { .. }
        )
    }

    /// Returns `true` if the fault lies with the server or its collaborators.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedRedirectTarget { .. }
                | Self::Storage { .. }
                | Self::Hashing { .. }
                | Self::Configuration { .. }
                | Self::Internal { .. }
        )
    }

    /// Returns the error category for logging.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidClientAuth { .. } => ErrorCategory::Authentication,
            Self::InvalidRequest { .. } => ErrorCategory::Validation,
            Self::GrantConsumed { .. } => ErrorCategory::Grant,
            Self::Redirect(_) => ErrorCategory::Validation,
            Self::MalformedRedirectTarget { .. } => ErrorCategory::Internal,
            Self::Conflict { .. } => ErrorCategory::Validation,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::Hashing { .. } => ErrorCategory::Infrastructure,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the OAuth 2.0 error code this error surfaces as when no
    /// more specific code applies.
    #[must_use]
    pub fn oauth_error_code(&self) -> OAuthErrorCode {
        match self {
            Self::InvalidClientAuth { .. } => OAuthErrorCode::InvalidClient,
            Self::InvalidRequest { .. } => OAuthErrorCode::InvalidRequest,
            Self::GrantConsumed { .. } => OAuthErrorCode::InvalidGrant,
            Self::Redirect(_) => OAuthErrorCode::InvalidRequest,
            Self::MalformedRedirectTarget { .. }
            | Self::Conflict { .. }
            | Self::Storage { .. }
            | Self::Hashing { .. }
            | Self::Configuration { .. }
            | Self::Internal { .. } => OAuthErrorCode::ServerError,
        }
    }
}

/// Categories of errors for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Client identity could not be established.
    Authentication,
    /// Grant lifecycle violations.
    Grant,
    /// Request validation errors.
    Validation,
    /// Infrastructure/storage errors.
    Infrastructure,
    /// Configuration errors.
    Configuration,
    /// Internal server errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::Grant => write!(f, "grant"),
            Self::Validation => write!(f, "validation"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
