//! Home, sign in, sign out and registration.

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use hero_auth::http::OAuthState;
use hero_auth::http::templates::{render_home, render_login_form, render_register_form};
use hero_auth::secret::hash_secret;
use hero_auth::{AuthError, BrowserSession, FlashKind, Profile, User};
use serde::Deserialize;

use super::{OrPage, PageResult, current_user, take_flashes};

const INVALID_LOGIN: &str = "Invalid username or password";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub login_username: String,
    pub login_password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub register_username: String,
    pub register_email: String,
    pub register_password: String,
    pub register_confirm: String,
}

impl RegisterForm {
    fn problem(&self) -> Option<&'static str> {
        let fields = [
            &self.register_username,
            &self.register_email,
            &self.register_password,
            &self.register_confirm,
        ];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Some("All fields are required");
        }
        if self.register_password != self.register_confirm {
            return Some("Passwords do not match");
        }
        None
    }
}

/// `GET /`
pub async fn home(State(state): State<OAuthState>, jar: CookieJar) -> PageResult {
    let mut session = state.sessions.load(&jar).await.or_page(&state)?;
    let user = current_user(&state, &session).await?;
    let (jar, flashes) = take_flashes(&state, jar, &mut session).await?;
    let html = render_home(state.provider_name(), user.as_ref(), &flashes);
    Ok((jar, Html(html)).into_response())
}

/// `GET /login`
pub async fn login_page(State(state): State<OAuthState>, jar: CookieJar) -> Response {
    if state.sessions.authenticated_user(&jar).await.is_some() {
        return Redirect::to("/").into_response();
    }
    Html(render_login_form(state.provider_name(), "/login", None)).into_response()
}

/// `POST /login`
///
/// A successful sign in replaces any previous session with a fresh key.
pub async fn login_submit(
    State(state): State<OAuthState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> PageResult {
    let user = state
        .service
        .authenticate_owner(&form.login_username, &form.login_password)
        .await
        .or_page(&state)?;

    let Some(user) = user else {
        tracing::info!(username = %form.login_username, "sign in rejected");
        let html = render_login_form(state.provider_name(), "/login", Some(INVALID_LOGIN));
        return Ok((StatusCode::UNAUTHORIZED, Html(html)).into_response());
    };

    let previous = state.sessions.load(&jar).await.or_page(&state)?;
    let jar = state
        .sessions
        .destroy(jar, &previous)
        .await
        .or_page(&state)?;

    let mut session = BrowserSession::default();
    session.sign_in(user.id);
    session.push_flash(FlashKind::Success, format!("Signed in as {}", user.username));
    let jar = state
        .sessions
        .save(jar, &mut session)
        .await
        .or_page(&state)?;

    tracing::info!(user_id = user.id, "resource owner signed in");
    Ok((jar, Redirect::to("/")).into_response())
}

/// `GET /logout`
pub async fn logout(State(state): State<OAuthState>, jar: CookieJar) -> PageResult {
    let session = state.sessions.load(&jar).await.or_page(&state)?;
    let jar = state
        .sessions
        .destroy(jar, &session)
        .await
        .or_page(&state)?;
    Ok((jar, Redirect::to("/")).into_response())
}

/// `GET /register`
pub async fn register_page(State(state): State<OAuthState>) -> Html<String> {
    Html(render_register_form(state.provider_name(), "", "", None))
}

/// `POST /register`
pub async fn register_submit(
    State(state): State<OAuthState>,
    Form(form): Form<RegisterForm>,
) -> PageResult {
    let rerender = |status: StatusCode, message: &str| {
        let html = render_register_form(
            state.provider_name(),
            &form.register_username,
            &form.register_email,
            Some(message),
        );
        (status, Html(html)).into_response()
    };

    if let Some(problem) = form.problem() {
        return Ok(rerender(StatusCode::BAD_REQUEST, problem));
    }

    let hash = hash_secret(&form.register_password).or_page(&state)?;
    let user = User::new(
        form.register_username.trim(),
        form.register_email.trim(),
        hash,
    );
    let users = &state.service.storage().users;
    let user = match users.create(user).await {
        Ok(user) => user,
        Err(AuthError::Conflict { message }) => {
            tracing::info!(reason = %message, "registration rejected");
            return Ok(rerender(
                StatusCode::CONFLICT,
                "Username or email is already taken",
            ));
        }
        Err(e) => return Err::<Response, _>(e).or_page(&state),
    };
    users
        .save_profile(Profile::for_user(&user))
        .await
        .or_page(&state)?;

    tracing::info!(user_id = user.id, username = %user.username, "resource owner registered");
    Ok(Redirect::to("/login").into_response())
}
