//! OAuth 2.0 error taxonomy (RFC 6749 §4.1.2.1, §4.2.2.1, §5.2).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The ten error codes an OAuth 2.0 response may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OAuthErrorCode {
    InvalidRequest,
    UnauthorizedClient,
    AccessDenied,
    UnsupportedResponseType,
    InvalidScope,
    ServerError,
    TemporarilyUnavailable,
    UnsupportedGrantType,
    InvalidGrant,
    InvalidClient,
}

impl OAuthErrorCode {
    /// Every code, in RFC order.
    pub const ALL: [OAuthErrorCode; 10] = [
        Self::InvalidRequest,
        Self::UnauthorizedClient,
        Self::AccessDenied,
        Self::UnsupportedResponseType,
        Self::InvalidScope,
        Self::ServerError,
        Self::TemporarilyUnavailable,
        Self::UnsupportedGrantType,
        Self::InvalidGrant,
        Self::InvalidClient,
    ];

    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::AccessDenied => "access_denied",
            Self::UnsupportedResponseType => "unsupported_response_type",
            Self::InvalidScope => "invalid_scope",
            Self::ServerError => "server_error",
            Self::TemporarilyUnavailable => "temporarily_unavailable",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::InvalidGrant => "invalid_grant",
            Self::InvalidClient => "invalid_client",
        }
    }

    /// Returns the fixed human readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::InvalidRequest => {
                "The request is missing a required parameter, includes an invalid parameter value, includes a parameter more than once, or is otherwise malformed."
            }
            Self::UnauthorizedClient => {
                "The client is not authorized to request a token using this method."
            }
            Self::AccessDenied => "The resource owner or authorization server denied the request.",
            Self::UnsupportedResponseType => {
                "The authorization server does not support obtaining a token using this method."
            }
            Self::InvalidScope => "The requested scope is invalid, unknown, or malformed.",
            Self::ServerError => {
                "The authorization server encountered an unexpected condition that prevented it from fulfilling the request."
            }
            Self::TemporarilyUnavailable => {
                "The authorization server is currently unable to handle the request due to a temporary overloading or maintenance of the server."
            }
            Self::UnsupportedGrantType => {
                "The authorization grant type is not supported by the authorization server."
            }
            Self::InvalidGrant => {
                "The provided authorization grant (e.g., authorization code, resource owner credentials) or refresh token is invalid, expired, revoked, does not match the redirection URI used in the authorization request, or was issued to another client."
            }
            Self::InvalidClient => {
                "Client authentication failed (e.g., unknown client, no client authentication included, or unsupported authentication method)."
            }
        }
    }
}

/// Looks up the description of a wire code; unknown codes describe
/// themselves.
pub fn describe(code: &str) -> &str {
    code.parse::<OAuthErrorCode>()
        .map(|c| c.description())
        .unwrap_or(code)
}

impl fmt::Display for OAuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown error code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown OAuth error code: {0}")]
pub struct UnknownErrorCode(pub String);

impl FromStr for OAuthErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| UnknownErrorCode(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_all_codes() {
        for code in OAuthErrorCode::ALL {
            assert_eq!(code.as_str().parse::<OAuthErrorCode>().unwrap(), code);
            assert_eq!(code.to_string(), code.as_str());
        }
    }

    #[test]
    fn test_serde_matches_wire_names() {
        let json = serde_json::to_string(&OAuthErrorCode::UnsupportedGrantType).unwrap();
        assert_eq!(json, "\"unsupported_grant_type\"");
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(
            describe("access_denied"),
            "The resource owner or authorization server denied the request."
        );
        assert!(describe("invalid_client").starts_with("Client authentication failed"));
        assert!(describe("invalid_grant").contains("refresh token is invalid"));
    }

    #[test]
    fn test_unknown_code_describes_itself() {
        assert_eq!(describe("weird_error"), "weird_error");
        assert!("weird_error".parse::<OAuthErrorCode>().is_err());
    }
}
