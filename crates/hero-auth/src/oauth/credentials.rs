//! Client credential extraction.
//!
//! Two schemes are accepted: HTTP Basic (optionally substituted by
//! `client_id`/`client_secret` form values) and Bearer (header or `code`
//! form value).

use base64::{Engine, engine::general_purpose::STANDARD};

use super::param;
use super::params::OAuthRequest;
use crate::{AuthError, AuthResult};

/// Credentials presented by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCredential {
    /// Public client id and plaintext secret.
    Basic { username: String, password: String },
    /// Opaque access token.
    Bearer { code: String },
}

impl ClientCredential {
    /// Identifier safe to log: the client id for Basic, nothing for Bearer.
    pub fn log_id(&self) -> &str {
        match self {
            Self::Basic { username, .. } => username,
            Self::Bearer { .. } => "<bearer>",
        }
    }
}

/// Extracts Basic client credentials.
///
/// With `allow_params`, non-empty `client_id` and `client_secret` form values
/// are used directly. Otherwise an `Authorization: Basic` header is required.
///
/// # Errors
///
/// Returns `AuthError::InvalidClientAuth` when no usable credentials exist.
pub fn client_auth(request: &OAuthRequest, allow_params: bool) -> AuthResult<ClientCredential> {
    let username = request.param(param::CLIENT_ID);
    let password = request.param(param::CLIENT_SECRET);
    if allow_params && !username.is_empty() && !password.is_empty() {
        return Ok(ClientCredential::Basic {
            username: username.to_string(),
            password: password.to_string(),
        });
    }

    let header = request.authorization.as_deref().unwrap_or("");
    let (username, password) = parse_basic_auth(header).map_err(AuthError::invalid_client_auth)?;
    Ok(ClientCredential::Basic { username, password })
}

/// Parses an `Authorization: Basic` header value into `(username, password)`.
///
/// The password is everything after the first `:` and may itself contain
/// colons.
pub fn parse_basic_auth(header: &str) -> Result<(String, String), String> {
    let (scheme, encoded) = header
        .split_once(' ')
        .ok_or_else(|| "Invalid authorization header".to_string())?;
    if scheme != "Basic" {
        return Err("Invalid authorization header".to_string());
    }

    let decoded = STANDARD
        .decode(encoded)
        .map_err(|e| format!("Invalid base64 encoding: {e}"))?;
    let decoded = String::from_utf8(decoded).map_err(|e| format!("Invalid UTF-8: {e}"))?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or_else(|| "Invalid authorization header".to_string())?;
    Ok((username.to_string(), password.to_string()))
}

/// Extracts a bearer credential.
///
/// Returns `None` when neither an `Authorization` header nor a `code` form
/// value is present. A well-formed `Bearer <code>` header wins; a malformed
/// header falls back to the form value and yields `None` without one.
pub fn bearer_auth(request: &OAuthRequest) -> Option<ClientCredential> {
    let form_code = request.param(param::CODE);
    let header = request.authorization.as_deref().unwrap_or("");

    if header.is_empty() && form_code.is_empty() {
        return None;
    }

    let code = if header.is_empty() {
        form_code
    } else {
        match header.split_once(' ') {
            Some(("Bearer", code)) => code,
            _ if !form_code.is_empty() => form_code,
            _ => return None,
        }
    };

    Some(ClientCredential::Bearer {
        code: code.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    fn request() -> OAuthRequest {
        OAuthRequest::new(Method::POST, "/tokens")
    }

    fn basic(user: &str, pass: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{user}:{pass}")))
    }

    #[test]
    fn test_parse_basic_auth() {
        let (user, pass) = parse_basic_auth(&basic("client", "s3cret")).unwrap();
        assert_eq!(user, "client");
        assert_eq!(pass, "s3cret");
    }

    #[test]
    fn test_parse_basic_auth_password_with_colon() {
        let (user, pass) = parse_basic_auth(&basic("client", "a:b:c")).unwrap();
        assert_eq!(user, "client");
        assert_eq!(pass, "a:b:c");
    }

    #[test]
    fn test_parse_basic_auth_rejects_malformed() {
        assert!(parse_basic_auth("").is_err());
        assert!(parse_basic_auth("Basic").is_err());
        assert!(parse_basic_auth("Bearer abc").is_err());
        assert!(parse_basic_auth("basic Y2xpZW50OnNlY3JldA==").is_err());
        assert!(parse_basic_auth("Basic !!!notbase64").is_err());
        let no_colon = format!("Basic {}", STANDARD.encode("nocolon"));
        assert!(parse_basic_auth(&no_colon).is_err());
    }

    #[test]
    fn test_client_auth_prefers_params_when_allowed() {
        let req = request()
            .with_authorization(basic("header", "pw"))
            .with_param("client_id", "form")
            .with_param("client_secret", "secret");

        assert_eq!(
            client_auth(&req, true).unwrap(),
            ClientCredential::Basic {
                username: "form".into(),
                password: "secret".into()
            }
        );
        assert_eq!(
            client_auth(&req, false).unwrap(),
            ClientCredential::Basic {
                username: "header".into(),
                password: "pw".into()
            }
        );
    }

    #[test]
    fn test_client_auth_needs_both_params() {
        let req = request().with_param("client_id", "form");
        let err = client_auth(&req, true).unwrap_err();
        assert!(matches!(err, AuthError::InvalidClientAuth { .. }));
    }

    #[test]
    fn test_bearer_absent() {
        assert_eq!(bearer_auth(&request()), None);
    }

    #[test]
    fn test_bearer_from_header() {
        let req = request().with_authorization("Bearer tok-1");
        assert_eq!(
            bearer_auth(&req),
            Some(ClientCredential::Bearer {
                code: "tok-1".into()
            })
        );
    }

    #[test]
    fn test_bearer_from_form() {
        let req = request().with_param("code", "tok-2");
        assert_eq!(
            bearer_auth(&req),
            Some(ClientCredential::Bearer {
                code: "tok-2".into()
            })
        );
    }

    #[test]
    fn test_bearer_malformed_header_falls_back_to_form() {
        let req = request()
            .with_authorization("Token tok-3")
            .with_param("code", "tok-4");
        assert_eq!(
            bearer_auth(&req),
            Some(ClientCredential::Bearer {
                code: "tok-4".into()
            })
        );

        let req = request().with_authorization("Bearer");
        assert_eq!(bearer_auth(&req), None);
    }

    #[test]
    fn test_log_id_hides_bearer() {
        let cred = ClientCredential::Bearer {
            code: "secret".into(),
        };
        assert_eq!(cred.log_id(), "<bearer>");
    }
}
