//! Axum wiring for the OAuth engines.
//!
//! - [`extract`] turns an inbound request into an [`OAuthRequest`](crate::OAuthRequest)
//! - [`response`] turns a committed [`ResponseContext`](crate::ResponseContext) into a response
//! - [`handlers`] holds the endpoint handlers and [`oauth_router`]
//! - [`templates`] renders the HTML pages

pub mod extract;
pub mod handlers;
pub mod response;
pub mod templates;

pub use extract::OAuthRejection;
pub use handlers::{OAuthState, authorize_handler, info_handler, oauth_router, token_handler};
pub use response::commit_response;
