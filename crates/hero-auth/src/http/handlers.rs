//! OAuth endpoint handlers.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    response::{Html, IntoResponse, Response},
    routing::{any, get},
};
use axum_extra::extract::CookieJar;

use super::response::commit_response;
use super::templates::render_login_form;
use crate::oauth::{AuthorizeOutcome, OAuthRequest, OAuthService};
use crate::session::SessionStore;

/// Shared state of the OAuth and account handlers.
#[derive(Clone)]
pub struct OAuthState {
    pub service: Arc<OAuthService>,
    pub sessions: SessionStore,
}

impl OAuthState {
    pub fn new(service: Arc<OAuthService>, sessions: SessionStore) -> Self {
        Self { service, sessions }
    }

    /// Display name used on rendered pages.
    pub fn provider_name(&self) -> &str {
        &self.service.config().provider_name
    }
}

/// `GET/POST /authorize`.
///
/// A resource owner signed in through the session cookie skips the login
/// form.
pub async fn authorize_handler(
    State(state): State<OAuthState>,
    jar: CookieJar,
    request: OAuthRequest,
) -> Response {
    let session_user = state.sessions.authenticated_user(&jar).await;
    let request = request.with_session_user(session_user);

    match state.service.authorize(&request).await {
        AuthorizeOutcome::Respond(ctx) => commit_response(&ctx),
        AuthorizeOutcome::Login { action, failed } => {
            let error = failed.then_some("Invalid username or password");
            Html(render_login_form(state.provider_name(), &action, error)).into_response()
        }
    }
}

/// `/tokens`. Every method reaches the engine, which rejects the ones the
/// configuration does not allow.
pub async fn token_handler(State(state): State<OAuthState>, request: OAuthRequest) -> Response {
    let ctx = state.service.token(&request).await;
    commit_response(&ctx)
}

/// `GET /info`.
pub async fn info_handler(State(state): State<OAuthState>, request: OAuthRequest) -> Response {
    let ctx = state.service.info(&request).await;
    commit_response(&ctx)
}

/// Routes the three OAuth endpoints at their configured paths.
pub fn oauth_router(state: OAuthState) -> Router {
    let config = state.service.config().clone();
    Router::new()
        .route(
            &config.auth_endpoint,
            get(authorize_handler).post(authorize_handler),
        )
        .route(&config.token_endpoint, any(token_handler))
        .route(&config.info_endpoint, get(info_handler))
        .with_state(state)
}
