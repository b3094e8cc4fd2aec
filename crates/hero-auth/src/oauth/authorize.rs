//! Authorization endpoint engine (authorization code and implicit flows).

use axum::http::Method;

use super::context::ResponseContext;
use super::error::OAuthErrorCode;
use super::params::{OAuthRequest, unescape};
use super::redirect::{is_single_uri, validate_uri_list};
use super::service::OAuthService;
use super::{param, response_type};
use crate::types::{Client, Grant, GrantKind};

/// Result of an authorization request.
#[derive(Debug)]
pub enum AuthorizeOutcome {
    /// The request is complete; commit the context.
    Respond(ResponseContext),

    /// No resource owner could be established. Render the login form
    /// posting back to `action`.
    Login {
        /// Original request target, so the OAuth parameters survive.
        action: String,
        /// Credentials were submitted and rejected.
        failed: bool,
    },
}

impl OAuthService {
    /// Runs the authorization endpoint.
    pub async fn authorize(&self, request: &OAuthRequest) -> AuthorizeOutcome {
        let mut ctx = ResponseContext::new();

        let redirect_url = match unescape(request.param(param::REDIRECT_URL)) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(error = %e, "redirect_url is not properly escaped");
                ctx.set_error(OAuthErrorCode::InvalidRequest);
                return AuthorizeOutcome::Respond(ctx);
            }
        };
        let state = request.param(param::STATE);
        let scope = request.param(param::SCOPE);
        let client_id = request.param(param::CLIENT_ID);

        let Some(client) = self.authorizing_client(client_id, state, &mut ctx).await else {
            return AuthorizeOutcome::Respond(ctx);
        };

        if client.redirect_url.is_empty() {
            tracing::debug!(client_id = %client_id, "client has no registered redirect uri");
            ctx.set_error_state(OAuthErrorCode::UnauthorizedClient, state);
            return AuthorizeOutcome::Respond(ctx);
        }

        let separator = self.config().redirect_separator.as_str();
        let redirect_url = if redirect_url.is_empty() && is_single_uri(&client.redirect_url, separator) {
            client.redirect_url.clone()
        } else {
            redirect_url
        };

        if let Err(e) = validate_uri_list(&client.redirect_url, &redirect_url, separator) {
            tracing::debug!(client_id = %client_id, error = %e, "redirect uri rejected");
            ctx.set_error_state(OAuthErrorCode::InvalidRequest, state);
            return AuthorizeOutcome::Respond(ctx);
        }

        ctx.set_redirect(redirect_url.as_str());

        let user_id = match request.session_user {
            Some(user_id) => user_id,
            None => {
                let username = request.param(param::LOGIN_USERNAME);
                let password = request.param(param::LOGIN_PASSWORD);
                let submitted = request.method == Method::POST && !username.is_empty();

                let owner = if request.method == Method::POST {
                    match self.authenticate_owner(username, password).await {
                        Ok(owner) => owner,
                        Err(e) => {
                            ctx.set_server_error(e, state);
                            return AuthorizeOutcome::Respond(ctx);
                        }
                    }
                } else {
                    None
                };

                match owner {
                    Some(user) => user.id,
                    None => {
                        return AuthorizeOutcome::Login {
                            action: request.uri.clone(),
                            failed: submitted,
                        };
                    }
                }
            }
        };

        match request.param(param::RESPONSE_TYPE) {
            response_type::CODE => {
                let grant = Grant::pending_code(
                    self.generate_code(),
                    client.id,
                    user_id,
                    self.config().authorization_expire_secs(),
                )
                .with_scope(scope)
                .with_state(state)
                .with_redirect_url(redirect_url.as_str());

                match self.storage().grants.create(grant).await {
                    Ok(grant) => {
                        tracing::info!(
                            client_id = %client_id,
                            user_id,
                            grant_id = grant.id,
                            "authorization code issued"
                        );
                        ctx.set_data(param::CODE, grant.code);
                        if !state.is_empty() {
                            ctx.set_data(param::STATE, state);
                        }
                    }
                    Err(e) => ctx.set_server_error(e, state),
                }
            }
            response_type::TOKEN => {
                ctx.set_redirect_fragment(true);
                let grant = Grant::new(GrantKind::Implicit, client.id, user_id)
                    .with_scope(scope)
                    .with_state(state)
                    .with_redirect_url(redirect_url.as_str());

                match self.finalize(&grant, &mut ctx).await {
                    Ok(_) => {
                        if !state.is_empty() {
                            ctx.set_data(param::STATE, state);
                        }
                    }
                    Err(e) => ctx.set_server_error(e, state),
                }
            }
            other => {
                tracing::debug!(response_type = %other, "unsupported response type");
                ctx.set_error_state(OAuthErrorCode::UnsupportedResponseType, state);
            }
        }

        AuthorizeOutcome::Respond(ctx)
    }

    /// Looks up the client named by `client_id`, recording the error on
    /// `ctx` when there is none.
    async fn authorizing_client(
        &self,
        client_id: &str,
        state: &str,
        ctx: &mut ResponseContext,
    ) -> Option<Client> {
        if client_id.is_empty() {
            tracing::debug!("authorization request without client_id");
            ctx.set_error_state(OAuthErrorCode::ServerError, state);
            return None;
        }

        match self.storage().clients.find_by_uuid(client_id).await {
            Ok(Some(client)) => Some(client),
            Ok(None) => {
                tracing::debug!(client_id = %client_id, "unknown client");
                ctx.set_error_state(OAuthErrorCode::UnauthorizedClient, state);
                None
            }
            Err(e) => {
                ctx.set_server_error(e, state);
                None
            }
        }
    }
}
