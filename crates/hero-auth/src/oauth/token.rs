//! Token endpoint engine.

use axum::http::Method;

use super::context::ResponseContext;
use super::credentials::{ClientCredential, client_auth};
use super::error::OAuthErrorCode;
use super::params::{OAuthRequest, unescape};
use super::redirect::validate_uri_list;
use super::scope::extra_scopes;
use super::service::OAuthService;
use super::{grant_type, param};
use crate::AuthError;
use crate::types::{Client, Grant, GrantKind};

impl OAuthService {
    /// Runs the token endpoint.
    ///
    /// The returned context is always a data response.
    pub async fn token(&self, request: &OAuthRequest) -> ResponseContext {
        let mut ctx = ResponseContext::new();

        let method_allowed = request.method == Method::POST
            || (request.method == Method::GET && self.config().allow_get_access);
        if !method_allowed {
            tracing::debug!(method = %request.method, "token request method not allowed");
            ctx.set_error(OAuthErrorCode::InvalidRequest);
            return ctx;
        }

        let credential = match client_auth(request, true) {
            Ok(credential) => credential,
            Err(e) => {
                tracing::debug!(error = %e, "token request without client credentials");
                ctx.set_error(OAuthErrorCode::InvalidClient);
                return ctx;
            }
        };

        let grant = request.param(param::GRANT_TYPE);
        if !self.config().access_allowed(grant) {
            tracing::debug!(grant_type = %grant, "grant type not allowed");
            ctx.set_error(OAuthErrorCode::UnsupportedGrantType);
            return ctx;
        }

        match grant {
            grant_type::AUTHORIZATION_CODE => self.exchange_code(request, &credential, &mut ctx).await,
            grant_type::REFRESH_TOKEN => self.exchange_refresh(request, &credential, &mut ctx).await,
            grant_type::PASSWORD => self.exchange_password(request, &credential, &mut ctx).await,
            grant_type::CLIENT_CREDENTIALS => {
                self.exchange_client_credentials(request, &credential, &mut ctx)
                    .await
            }
            grant_type::ASSERTION => self.exchange_assertion(request, &credential, &mut ctx).await,
            _ => ctx.set_error(OAuthErrorCode::UnsupportedGrantType),
        }

        if let Some(code) = ctx.error_code() {
            tracing::debug!(
                grant_type = %grant,
                client_id = %credential.log_id(),
                error = %code,
                "token request rejected"
            );
        }
        ctx
    }

    async fn exchange_code(
        &self,
        request: &OAuthRequest,
        credential: &ClientCredential,
        ctx: &mut ResponseContext,
    ) {
        let code = request.param(param::CODE);
        if code.is_empty() {
            ctx.set_error(OAuthErrorCode::InvalidGrant);
            return;
        }

        let Some(client) = self.token_client(credential, ctx).await else {
            return;
        };

        let grant = match self.storage().grants.find_by_client_code(client.id, code).await {
            Ok(Some(grant)) if grant.is_pending_code() => grant,
            Ok(_) => {
                ctx.set_error(OAuthErrorCode::UnauthorizedClient);
                return;
            }
            Err(e) => {
                ctx.set_server_error(e, "");
                return;
            }
        };

        if grant.is_expired() {
            ctx.set_error(OAuthErrorCode::InvalidGrant);
            return;
        }

        let separator = self.config().redirect_separator.as_str();
        let redirect_url = match unescape(request.param(param::REDIRECT_URL)) {
            Ok(url) if url.is_empty() => client.first_redirect(separator).to_string(),
            Ok(url) => url,
            Err(_) => {
                ctx.set_error(OAuthErrorCode::InvalidRequest);
                return;
            }
        };
        if let Err(e) = validate_uri_list(&client.redirect_url, &redirect_url, separator) {
            tracing::debug!(error = %e, "redirect uri rejected at code exchange");
            ctx.set_error(OAuthErrorCode::InvalidRequest);
            return;
        }

        self.finalize_into(&grant, ctx).await;
    }

    async fn exchange_refresh(
        &self,
        request: &OAuthRequest,
        credential: &ClientCredential,
        ctx: &mut ResponseContext,
    ) {
        let code = request.param(param::REFRESH_TOKEN);
        if code.is_empty() {
            ctx.set_error(OAuthErrorCode::InvalidGrant);
            return;
        }

        let Some(client) = self.token_client(credential, ctx).await else {
            return;
        };

        let original = match self.grant_by_refresh_code(code).await {
            Ok(Some(grant)) => grant,
            Ok(None) => {
                ctx.set_error(OAuthErrorCode::InvalidGrant);
                return;
            }
            Err(e) => {
                ctx.set_server_error(e, "");
                return;
            }
        };

        if original.client_id != client.id {
            ctx.set_error(OAuthErrorCode::UnauthorizedClient);
            return;
        }

        let requested = request.param(param::SCOPE);
        let scope = if requested.is_empty() {
            original.scope.as_str()
        } else {
            requested
        };
        if !scope.is_empty() && !extra_scopes(&original.scope, scope) {
            ctx.set_error(OAuthErrorCode::AccessDenied);
            return;
        }

        let source = Grant {
            id: original.id,
            ..Grant::new(GrantKind::Refresh, client.id, original.user_id)
                .with_scope(scope)
                .with_redirect_url(original.redirect_url.as_str())
        };
        self.finalize_into(&source, ctx).await;
    }

    async fn exchange_password(
        &self,
        request: &OAuthRequest,
        credential: &ClientCredential,
        ctx: &mut ResponseContext,
    ) {
        let username = request.param(param::USERNAME);
        let password = request.param(param::PASSWORD);
        if username.is_empty() || password.is_empty() {
            ctx.set_error(OAuthErrorCode::InvalidGrant);
            return;
        }

        let user = match self.authenticate_owner(username, password).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                ctx.set_error(OAuthErrorCode::InvalidGrant);
                return;
            }
            Err(e) => {
                ctx.set_server_error(e, "");
                return;
            }
        };

        let Some(client) = self.token_client(credential, ctx).await else {
            return;
        };

        let source = Grant::new(GrantKind::Password, client.id, user.id)
            .with_scope(request.param(param::SCOPE));
        self.finalize_into(&source, ctx).await;
    }

    async fn exchange_client_credentials(
        &self,
        request: &OAuthRequest,
        credential: &ClientCredential,
        ctx: &mut ResponseContext,
    ) {
        let Some(client) = self.token_client(credential, ctx).await else {
            return;
        };

        let source = Grant::new(GrantKind::ClientCredentials, client.id, client.user_id)
            .with_scope(request.param(param::SCOPE));
        self.finalize_into(&source, ctx).await;
    }

    async fn exchange_assertion(
        &self,
        request: &OAuthRequest,
        credential: &ClientCredential,
        ctx: &mut ResponseContext,
    ) {
        if request.param(param::ASSERTION_TYPE).is_empty() || request.param(param::ASSERTION).is_empty() {
            ctx.set_error(OAuthErrorCode::InvalidGrant);
            return;
        }

        let Some(client) = self.token_client(credential, ctx).await else {
            return;
        };

        let redirect_url = client
            .first_redirect(&self.config().redirect_separator)
            .to_string();
        let source = Grant::new(GrantKind::Assertion, client.id, client.user_id)
            .with_scope(request.param(param::SCOPE))
            .with_redirect_url(redirect_url);
        self.finalize_into(&source, ctx).await;
    }

    /// Resolves the authenticated client or records `invalid_client`.
    async fn token_client(
        &self,
        credential: &ClientCredential,
        ctx: &mut ResponseContext,
    ) -> Option<Client> {
        match self.resolve_client(credential).await {
            Ok(Some(client)) => Some(client),
            Ok(None) => {
                ctx.set_error(OAuthErrorCode::InvalidClient);
                None
            }
            Err(e) => {
                ctx.set_server_error(e, "");
                None
            }
        }
    }

    async fn grant_by_refresh_code(&self, code: &str) -> crate::AuthResult<Option<Grant>> {
        let Some(token) = self.storage().tokens.find_by_code(code).await? else {
            return Ok(None);
        };
        self.storage().grants.find_by_refresh_token(token.id).await
    }

    async fn finalize_into(&self, source: &Grant, ctx: &mut ResponseContext) {
        match self.finalize(source, ctx).await {
            Ok(_) => {}
            Err(AuthError::GrantConsumed { id }) => {
                tracing::warn!(grant_id = id, "grant redeemed more than once");
                ctx.set_error(OAuthErrorCode::InvalidGrant);
            }
            Err(e) => ctx.set_server_error(e, ""),
        }
    }
}
