//! Request extraction.

use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::oauth::{OAuthErrorCode, OAuthRequest, Params};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Rejection returned when the request body cannot be read.
#[derive(Debug)]
pub struct OAuthRejection {
    message: String,
}

impl IntoResponse for OAuthRejection {
    fn into_response(self) -> Response {
        let code = OAuthErrorCode::InvalidRequest;
        let body = json!({
            "error": code.as_str(),
            "error_description": self.message,
            "error_uri": "",
        });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// Collects method, target, `Authorization` header and form values.
///
/// The body is parsed only for `application/x-www-form-urlencoded`
/// requests. Body values take precedence over query values.
impl<S> FromRequest<S> for OAuthRequest
where
    S: Send + Sync,
{
    type Rejection = OAuthRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let method = req.method().clone();
        let uri = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| req.uri().path().to_string());
        let query = req.uri().query().map(str::to_string);
        let authorization = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with(FORM_CONTENT_TYPE));

        let body = if is_form {
            Bytes::from_request(req, state)
                .await
                .map_err(|e| OAuthRejection {
                    message: e.body_text(),
                })?
        } else {
            Bytes::new()
        };

        let mut request = OAuthRequest::new(method, uri)
            .with_params(Params::from_urlencoded(query.as_deref(), &body));
        request.authorization = authorization;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Method;

    #[tokio::test]
    async fn test_extracts_form_and_query() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/tokens?grant_type=password&scope=query")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::AUTHORIZATION, "Basic abc")
            .body(Body::from("scope=body&username=alice"))
            .unwrap();

        let request = OAuthRequest::from_request(req, &()).await.unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.uri, "/tokens?grant_type=password&scope=query");
        assert_eq!(request.authorization.as_deref(), Some("Basic abc"));
        assert_eq!(request.param("grant_type"), "password");
        assert_eq!(request.param("scope"), "body");
        assert_eq!(request.param("username"), "alice");
        assert_eq!(request.session_user, None);
    }

    #[tokio::test]
    async fn test_ignores_non_form_body() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/tokens")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"grant_type":"password"}"#))
            .unwrap();

        let request = OAuthRequest::from_request(req, &()).await.unwrap();
        assert!(request.params.is_empty());
    }
}
