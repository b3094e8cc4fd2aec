//! Resource-owner web UI: sign in, registration, client management and
//! profile pages.
//!
//! Handlers share [`OAuthState`] with the OAuth endpoints and keep the
//! signed-in user in the cookie-backed browser session.

mod clients;
mod login;

use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use hero_auth::http::OAuthState;
use hero_auth::http::templates::render_error_page;
use hero_auth::{AuthError, AuthResult, BrowserSession, FlashMessage, User};

/// Paths served by the account UI. OAuth endpoints must not reuse them.
pub const ACCOUNT_PATHS: &[&str] = &[
    "/",
    "/login",
    "/logout",
    "/register",
    "/clients",
    "/clients/{id}/delete",
    "/profile",
];

pub fn account_router(state: OAuthState) -> Router {
    Router::new()
        .route("/", get(login::home))
        .route("/login", get(login::login_page).post(login::login_submit))
        .route("/logout", get(login::logout))
        .route(
            "/register",
            get(login::register_page).post(login::register_submit),
        )
        .route(
            "/clients",
            get(clients::clients_page).post(clients::create_client),
        )
        .route("/clients/{id}/delete", post(clients::delete_client))
        .route("/profile", get(clients::profile_page))
        .with_state(state)
}

/// Failure of an account page, rendered as the HTML error page.
#[derive(Debug)]
pub struct AccountError {
    provider: String,
    source: AuthError,
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        let status = match &self.source {
            AuthError::Conflict { .. } => StatusCode::CONFLICT,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::warn!(error = %self.source, category = %self.source.category(), "account page failed");
        }
        let code = self.source.oauth_error_code();
        let html = render_error_page(&self.provider, code.as_str(), code.description());
        (status, Html(html)).into_response()
    }
}

type PageResult<T = Response> = Result<T, AccountError>;

trait OrPage<T> {
    fn or_page(self, state: &OAuthState) -> PageResult<T>;
}

impl<T> OrPage<T> for AuthResult<T> {
    fn or_page(self, state: &OAuthState) -> PageResult<T> {
        self.map_err(|source| AccountError {
            provider: state.provider_name().to_string(),
            source,
        })
    }
}

/// User signed in through `session`, if the account still exists.
async fn current_user(state: &OAuthState, session: &BrowserSession) -> PageResult<Option<User>> {
    match session.user_id() {
        Some(id) => state
            .service
            .storage()
            .users
            .find_by_id(id)
            .await
            .or_page(state),
        None => Ok(None),
    }
}

/// Drains queued flash messages, persisting the session when any were
/// queued.
async fn take_flashes(
    state: &OAuthState,
    jar: CookieJar,
    session: &mut BrowserSession,
) -> PageResult<(CookieJar, Vec<FlashMessage>)> {
    let flashes = session.take_flashes();
    if flashes.is_empty() {
        return Ok((jar, flashes));
    }
    let jar = state.sessions.save(jar, session).await.or_page(state)?;
    Ok((jar, flashes))
}
