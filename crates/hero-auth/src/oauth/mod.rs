//! OAuth 2.0 protocol state machine.
//!
//! # Flow
//!
//! ```text
//! /authorize ──► client lookup ──► redirect validation ──► owner login
//!                                                           ├─► code  ──► pending grant
//!                                                           └─► token ──► finalize
//! /tokens    ──► client auth ──► grant type dispatch ──► finalize
//! /info      ──► bearer auth ──► access grant ──► owner fields
//! ```
//!
//! Every engine builds a [`ResponseContext`] and the HTTP layer commits it.

mod authorize;
pub mod context;
pub mod credentials;
pub mod error;
mod info;
pub mod params;
pub mod redirect;
pub mod scope;
mod service;
mod token;

pub use authorize::AuthorizeOutcome;
pub use context::{Committed, ResponseContext, ResponseKind};
pub use credentials::ClientCredential;
pub use error::OAuthErrorCode;
pub use params::{OAuthRequest, Params};
pub use service::OAuthService;

/// Grant type names accepted in `grant_type`.
pub mod grant_type {
    pub const AUTHORIZATION_CODE: &str = "authorization_code";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const PASSWORD: &str = "password";
    pub const CLIENT_CREDENTIALS: &str = "client_credentials";
    pub const ASSERTION: &str = "assertion";
}

/// Values accepted in `response_type`.
pub mod response_type {
    pub const CODE: &str = "code";
    pub const TOKEN: &str = "token";
}

/// Request and response parameter names.
pub mod param {
    pub const ERROR: &str = "error";
    pub const ERROR_DESCRIPTION: &str = "error_description";
    pub const ERROR_URI: &str = "error_uri";
    pub const STATE: &str = "state";
    pub const GRANT_TYPE: &str = "grant_type";
    pub const CLIENT_ID: &str = "client_id";
    pub const CLIENT_SECRET: &str = "client_secret";
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const TOKEN_TYPE: &str = "token_type";
    pub const EXPIRES_IN: &str = "expires_in";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const SCOPE: &str = "scope";
    pub const REDIRECT_URL: &str = "redirect_url";
    pub const CODE: &str = "code";
    pub const ASSERTION: &str = "assertion";
    pub const ASSERTION_TYPE: &str = "assertion_type";
    pub const RESPONSE_TYPE: &str = "response_type";
    pub const USERNAME: &str = "username";
    pub const PASSWORD: &str = "password";
    pub const LOGIN_USERNAME: &str = "login_username";
    pub const LOGIN_PASSWORD: &str = "login_password";
}
