//! # hero-auth
//!
//! OAuth 2.0 authorization server engine for hero.
//!
//! This crate provides:
//! - The `/authorize` engine (authorization code and implicit flows)
//! - The `/tokens` engine (authorization_code, refresh_token, password,
//!   client_credentials and assertion grants)
//! - A bearer-protected `/info` endpoint
//! - Storage traits for users, clients, grants, tokens and sessions
//! - A cookie-backed browser session store
//! - Axum handlers wiring the engines to HTTP
//!
//! ## Modules
//!
//! - [`config`] - OAuth and session configuration
//! - [`oauth`] - Protocol state machine (error taxonomy, redirect validation,
//!   response context, engines)
//! - [`storage`] - Persistence capability traits
//! - [`session`] - Browser session store and flash messages
//! - [`http`] - Axum HTTP handlers and server-rendered pages

pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod secret;
pub mod session;
pub mod storage;
pub mod token_gen;
pub mod types;

pub use config::{ConfigError, OAuthConfig, SessionConfig};
pub use error::{AuthError, ErrorCategory};
pub use oauth::{
    AuthorizeOutcome, ClientCredential, OAuthErrorCode, OAuthRequest, OAuthService, Params,
    ResponseContext,
};
pub use session::{BrowserSession, FlashKind, FlashMessage, SessionData, SessionStore};
pub use storage::{
    AuthStorage, ClientStorage, GrantStorage, SessionStorage, TokenStorage, UserStorage,
};
pub use token_gen::{RandomTokenGenerator, TokenGenerator, UuidTokenGenerator};
pub use types::{Client, Grant, GrantKind, Profile, Session, Token, User};

/// Result type for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{OAuthConfig, SessionConfig};
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::oauth::{OAuthErrorCode, OAuthRequest, OAuthService, ResponseContext};
    pub use crate::storage::AuthStorage;
    pub use crate::types::{Client, Grant, Token, User};
    pub use crate::AuthResult;
}
