//! Per-request response accumulator.
//!
//! Engines write payload values and errors into a [`ResponseContext`] and
//! finish by calling [`ResponseContext::commit`], which decides between a
//! JSON body and a `302` redirect carrying the payload in the query or the
//! fragment.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use serde_json::Value;
use url::{Url, form_urlencoded};

use super::error::OAuthErrorCode;
use super::param;
use crate::{AuthError, AuthResult};

/// Headers attached to every OAuth response.
pub const NO_CACHE_HEADERS: [(&str, &str); 3] = [
    ("cache-control", "no-cache, no-store, max-age=0, must-revalidate"),
    ("pragma", "no-cache"),
    ("expires", "Fri, 01 Jan 1990 00:00:00 GMT"),
];

/// How the response is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseKind {
    /// JSON body.
    #[default]
    Data,
    /// `302 Found` to a target URL carrying the payload.
    Redirect,
}

/// Outcome of [`ResponseContext::commit`].
#[derive(Debug, Clone, PartialEq)]
pub enum Committed {
    Redirect { location: String },
    Data { status: StatusCode, body: Value },
}

/// Mutable accumulator bound to one response.
#[derive(Debug, Default)]
pub struct ResponseContext {
    kind: ResponseKind,
    url: String,
    data: BTreeMap<String, Value>,
    fragment: bool,
    error: Option<OAuthErrorCode>,
    status: Option<StatusCode>,
    internal_error: Option<AuthError>,
}

impl ResponseContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> ResponseKind {
        self.kind
    }

    /// Target URL of a redirect, empty for data responses.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn data(&self) -> &BTreeMap<String, Value> {
        &self.data
    }

    /// Payload value as a string, `""` when absent or not a string.
    pub fn get(&self, key: &str) -> &str {
        self.data.get(key).and_then(Value::as_str).unwrap_or("")
    }

    pub fn is_fragment(&self) -> bool {
        self.fragment
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn error_code(&self) -> Option<OAuthErrorCode> {
        self.error
    }

    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn internal_error(&self) -> Option<&AuthError> {
        self.internal_error.as_ref()
    }

    pub fn set_data(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn clear_data(&mut self) {
        self.data.clear();
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    pub fn set_redirect(&mut self, url: impl Into<String>) {
        self.kind = ResponseKind::Redirect;
        self.url = url.into();
    }

    /// Selects fragment encoding for the eventual redirect.
    pub fn set_redirect_fragment(&mut self, fragment: bool) {
        self.fragment = fragment;
    }

    /// Records an error with the default description and no state.
    pub fn set_error(&mut self, code: OAuthErrorCode) {
        self.set_error_uri(code, None, "", "");
    }

    /// Records an error with the default description, echoing `state`.
    pub fn set_error_state(&mut self, code: OAuthErrorCode, state: &str) {
        self.set_error_uri(code, None, "", state);
    }

    /// Replaces the payload with an error.
    ///
    /// `description` falls back to the code's fixed text. `state` is only
    /// written when non-empty.
    pub fn set_error_uri(
        &mut self,
        code: OAuthErrorCode,
        description: Option<&str>,
        uri: &str,
        state: &str,
    ) {
        self.data.clear();
        self.error = Some(code);
        self.set_data(param::ERROR, code.as_str());
        self.set_data(
            param::ERROR_DESCRIPTION,
            description.unwrap_or_else(|| code.description()),
        );
        self.set_data(param::ERROR_URI, uri);
        if !state.is_empty() {
            self.set_data(param::STATE, state);
        }
    }

    /// Retains an infrastructure fault for operator logging.
    pub fn set_internal_error(&mut self, error: AuthError) {
        self.internal_error = Some(error);
    }

    /// Reports `server_error` to the caller and retains `error`.
    pub fn set_server_error(&mut self, error: AuthError, state: &str) {
        self.set_error_state(OAuthErrorCode::ServerError, state);
        self.set_internal_error(error);
    }

    /// Target URL with the payload merged in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MalformedRedirectTarget` if the stored URL does
    /// not parse.
    pub fn redirect_url(&self) -> AuthResult<String> {
        let mut target =
            Url::parse(&self.url).map_err(|e| AuthError::malformed_redirect(&self.url, e))?;

        let mut merged: BTreeMap<String, String> = target
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        for (key, value) in &self.data {
            merged.insert(key.clone(), value_string(value));
        }

        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(merged.iter())
            .finish();
        let encoded = (!encoded.is_empty()).then_some(encoded.as_str());

        if self.fragment {
            target.set_query(None);
            target.set_fragment(encoded);
        } else {
            target.set_query(encoded);
        }
        Ok(target.into())
    }

    /// Finishes the response.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MalformedRedirectTarget` for a redirect whose
    /// target does not parse.
    pub fn commit(&self) -> AuthResult<Committed> {
        if let Some(error) = &self.internal_error {
            tracing::warn!(
                error = %error,
                category = %error.category(),
                "OAuth response carries an internal error"
            );
        }

        match self.kind {
            ResponseKind::Redirect => Ok(Committed::Redirect {
                location: self.redirect_url()?,
            }),
            ResponseKind::Data => Ok(Committed::Data {
                status: self.status(),
                body: Value::Object(self.data.clone().into_iter().collect()),
            }),
        }
    }
}

fn value_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
