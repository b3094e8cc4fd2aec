//! Client registration and profile pages. Both require a signed-in owner.

use axum::{
    Form,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect},
};
use axum_extra::extract::CookieJar;
use hero_auth::http::OAuthState;
use hero_auth::http::templates::{render_clients_page, render_profile};
use hero_auth::oauth::redirect::validate_registration;
use hero_auth::secret::{generate_client_secret, hash_secret};
use hero_auth::{Client, FlashKind, Profile};
use serde::Deserialize;
use uuid::Uuid;

use super::{OrPage, PageResult, current_user, take_flashes};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ClientForm {
    pub client_name: String,
    pub redirect_url: String,
    /// Empty to have one generated.
    pub client_secret: String,
}

/// `GET /clients`
pub async fn clients_page(State(state): State<OAuthState>, jar: CookieJar) -> PageResult {
    let mut session = state.sessions.load(&jar).await.or_page(&state)?;
    let Some(user) = current_user(&state, &session).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let clients = state
        .service
        .storage()
        .clients
        .list_by_owner(user.id)
        .await
        .or_page(&state)?;
    let (jar, flashes) = take_flashes(&state, jar, &mut session).await?;
    let html = render_clients_page(state.provider_name(), &clients, &flashes);
    Ok((jar, Html(html)).into_response())
}

/// `POST /clients`
///
/// The plaintext secret is shown once, through a flash message.
pub async fn create_client(
    State(state): State<OAuthState>,
    jar: CookieJar,
    Form(form): Form<ClientForm>,
) -> PageResult {
    let mut session = state.sessions.load(&jar).await.or_page(&state)?;
    let Some(user) = current_user(&state, &session).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let name = form.client_name.trim();
    let redirect_url = form.redirect_url.trim();
    let separator = &state.service.config().redirect_separator;

    if name.is_empty() {
        session.push_flash(FlashKind::Error, "Client name is required");
    } else if let Err(e) = validate_registration(redirect_url, separator) {
        session.push_flash(FlashKind::Error, format!("Invalid redirect URL: {e}"));
    } else {
        let secret = match form.client_secret.trim() {
            "" => generate_client_secret(),
            given => given.to_string(),
        };
        let hash = hash_secret(&secret).or_page(&state)?;
        let client = Client::new(Uuid::new_v4().to_string(), user.id, name, hash)
            .with_redirect_url(redirect_url);
        let client = state
            .service
            .storage()
            .clients
            .create(client)
            .await
            .or_page(&state)?;

        tracing::info!(client_id = %client.uuid, owner = user.id, "client registered");
        session.push_flash(
            FlashKind::Success,
            format!(
                "Client {} created. client_id: {} client_secret: {} (copy the secret now, it is not shown again)",
                client.name, client.uuid, secret
            ),
        );
    }

    let jar = state
        .sessions
        .save(jar, &mut session)
        .await
        .or_page(&state)?;
    Ok((jar, Redirect::to("/clients")).into_response())
}

/// `POST /clients/{id}/delete`. Only the owner may delete a client.
pub async fn delete_client(
    State(state): State<OAuthState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> PageResult {
    let mut session = state.sessions.load(&jar).await.or_page(&state)?;
    let Some(user) = current_user(&state, &session).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let clients = &state.service.storage().clients;
    match clients.find_by_id(id).await.or_page(&state)? {
        Some(client) if client.user_id == user.id => {
            clients.delete(id).await.or_page(&state)?;
            tracing::info!(client_id = %client.uuid, owner = user.id, "client deleted");
            session.push_flash(FlashKind::Success, format!("Client {} deleted", client.name));
        }
        _ => session.push_flash(FlashKind::Error, "Client not found"),
    }

    let jar = state
        .sessions
        .save(jar, &mut session)
        .await
        .or_page(&state)?;
    Ok((jar, Redirect::to("/clients")).into_response())
}

/// `GET /profile`
pub async fn profile_page(State(state): State<OAuthState>, jar: CookieJar) -> PageResult {
    let mut session = state.sessions.load(&jar).await.or_page(&state)?;
    let Some(user) = current_user(&state, &session).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let profile = state
        .service
        .storage()
        .users
        .profile(user.id)
        .await
        .or_page(&state)?
        .unwrap_or_else(|| Profile::for_user(&user));
    let (jar, flashes) = take_flashes(&state, jar, &mut session).await?;
    Ok((jar, Html(render_profile(state.provider_name(), &profile, &flashes))).into_response())
}
