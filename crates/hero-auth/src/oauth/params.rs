//! Request parameters as seen by the engines.
//!
//! The engines are independent of the HTTP framework. Handlers collect the
//! method, request target, `Authorization` header and form values into an
//! [`OAuthRequest`] and hand it over.

use std::collections::HashMap;

use axum::http::Method;
use url::form_urlencoded;

/// Form and query values of a request.
///
/// Body values take precedence over query values, and the first occurrence
/// of a repeated key wins. Absent keys read as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: HashMap<String, String>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an urlencoded body followed by an optional query string.
    pub fn from_urlencoded(query: Option<&str>, body: &[u8]) -> Self {
        let mut params = Self::new();
        for (key, value) in form_urlencoded::parse(body) {
            params.append(key.into_owned(), value.into_owned());
        }
        if let Some(query) = query {
            for (key, value) in form_urlencoded::parse(query.as_bytes()) {
                params.append(key.into_owned(), value.into_owned());
            }
        }
        params
    }

    /// Adds a value unless the key is already present.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_insert_with(|| value.into());
    }

    /// Builder form of [`append`](Self::append).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(key, value);
        self
    }

    /// Value of `key`, or `""` when absent.
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.append(key, value);
        }
        params
    }
}

/// A framework independent view of one inbound request.
#[derive(Debug, Clone)]
pub struct OAuthRequest {
    pub method: Method,

    /// Request target (path and query) as received. Used as the login form
    /// action so the original parameters survive the round trip.
    pub uri: String,

    /// Raw `Authorization` header value.
    pub authorization: Option<String>,

    pub params: Params,

    /// Resource owner already authenticated by a browser session.
    pub session_user: Option<i64>,
}

impl OAuthRequest {
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            authorization: None,
            params: Params::new(),
            session_user: None,
        }
    }

    #[must_use]
    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.append(key, value);
        self
    }

    #[must_use]
    pub fn with_session_user(mut self, user_id: Option<i64>) -> Self {
        self.session_user = user_id;
        self
    }

    /// Shorthand for `self.params.get(key)`.
    pub fn param(&self, key: &str) -> &str {
        self.params.get(key)
    }
}

/// Error returned by [`unescape`] for a malformed escape sequence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnescapeError {
    #[error("invalid escape sequence at byte {0}")]
    InvalidEscape(usize),
    #[error("unescaped value is not valid UTF-8")]
    InvalidUtf8,
}

/// Strict query unescaping: `+` becomes a space and every `%` must be
/// followed by two hex digits.
pub fn unescape(value: &str) -> Result<String, UnescapeError> {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hi = bytes.get(i + 1).and_then(|b| hex_value(*b));
                let lo = bytes.get(i + 2).and_then(|b| hex_value(*b));
                match (hi, lo) {
                    (Some(hi), Some(lo)) => out.push((hi << 4) | lo),
                    _ => return Err(UnescapeError::InvalidEscape(i)),
                }
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).map_err(|_| UnescapeError::InvalidUtf8)
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
