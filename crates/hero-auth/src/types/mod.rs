//! Persisted entities of the authorization server.
//!
//! Numeric identifiers are assigned by the storage backend on insert and
//! start at 1. An id of `0` marks a value that has not been persisted.

mod client;
mod grant;
mod session;
mod token;
mod user;

pub use client::Client;
pub use grant::{Grant, GrantKind};
pub use session::Session;
pub use token::Token;
pub use user::{Profile, User};
