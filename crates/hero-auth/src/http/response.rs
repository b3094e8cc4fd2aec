//! Committing a response context to HTTP.

use axum::{
    Json,
    http::{HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::oauth::context::{Committed, NO_CACHE_HEADERS, ResponseContext};
use crate::oauth::OAuthErrorCode;

impl IntoResponse for Committed {
    fn into_response(self) -> Response {
        let mut response = match self {
            Committed::Redirect { location } => match HeaderValue::from_str(&location) {
                Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
                Err(e) => {
                    tracing::warn!(error = %e, "redirect location is not a valid header value");
                    server_error_body().into_response()
                }
            },
            Committed::Data { status, body } => (status, Json(body)).into_response(),
        };

        let headers = response.headers_mut();
        for (name, value) in NO_CACHE_HEADERS {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        response
    }
}

/// Commits `ctx`, answering `server_error` as JSON when that fails.
pub fn commit_response(ctx: &ResponseContext) -> Response {
    match ctx.commit() {
        Ok(committed) => committed.into_response(),
        Err(e) => {
            tracing::warn!(error = %e, category = %e.category(), "failed to commit OAuth response");
            let (status, body) = server_error_body();
            Committed::Data {
                status,
                body: body.0,
            }
            .into_response()
        }
    }
}

fn server_error_body() -> (StatusCode, Json<serde_json::Value>) {
    let code = OAuthErrorCode::ServerError;
    (
        StatusCode::OK,
        Json(json!({
            "error": code.as_str(),
            "error_description": code.description(),
            "error_uri": "",
        })),
    )
}
