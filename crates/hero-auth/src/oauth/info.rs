//! Bearer-protected resource owner info.

use super::context::ResponseContext;
use super::credentials::{ClientCredential, bearer_auth};
use super::error::OAuthErrorCode;
use super::params::OAuthRequest;
use super::scope;
use super::service::OAuthService;

/// Scope that grants access to the owner's profile fields.
pub const USER_SCOPE: &str = "user";

/// Avatar reported for owners without one.
const DEFAULT_AVATAR: &str = "avatar";

impl OAuthService {
    /// Answers the info endpoint for the owner behind an access token.
    pub async fn info(&self, request: &OAuthRequest) -> ResponseContext {
        let mut ctx = ResponseContext::new();

        let code = match bearer_auth(request) {
            Some(ClientCredential::Bearer { code }) if !code.is_empty() => code,
            _ => {
                ctx.set_error(OAuthErrorCode::InvalidRequest);
                return ctx;
            }
        };

        let token = match self.resolve_bearer(&code).await {
            Ok(Some((token, _client))) => token,
            Ok(None) => {
                ctx.set_error(OAuthErrorCode::UnauthorizedClient);
                return ctx;
            }
            Err(e) => {
                ctx.set_server_error(e, "");
                return ctx;
            }
        };

        let grant = match self.storage().grants.find_by_access_token(token.id).await {
            Ok(Some(grant)) if !grant.is_expired() => grant,
            Ok(_) => {
                ctx.set_error(OAuthErrorCode::InvalidGrant);
                return ctx;
            }
            Err(e) => {
                ctx.set_server_error(e, "");
                return ctx;
            }
        };

        let user = match self.storage().users.find_by_id(grant.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                ctx.set_error(OAuthErrorCode::InvalidGrant);
                return ctx;
            }
            Err(e) => {
                ctx.set_server_error(e, "");
                return ctx;
            }
        };

        if !scope::split(&grant.scope).any(|s| s == USER_SCOPE) {
            tracing::debug!(grant_id = grant.id, scope = %grant.scope, "info requested without user scope");
            ctx.set_error(OAuthErrorCode::InvalidGrant);
            return ctx;
        }

        ctx.set_data("email", user.email.as_str());
        ctx.set_data("avatar_url", user.avatar.as_deref().unwrap_or(DEFAULT_AVATAR));
        ctx.set_data("name", user.username.as_str());
        ctx
    }
}
