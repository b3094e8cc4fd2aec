//! Shared state and building blocks of the OAuth engines.
//!
//! [`OAuthService`] owns the storage handles, the code generator and the
//! engine configuration. The engines themselves live in sibling modules as
//! further `impl OAuthService` blocks.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::context::ResponseContext;
use super::credentials::ClientCredential;
use super::param;
use crate::config::OAuthConfig;
use crate::secret::verify_secret;
use crate::storage::AuthStorage;
use crate::token_gen::{TokenGenerator, UuidTokenGenerator};
use crate::types::{Client, Grant, Token, User};
use crate::{AuthError, AuthResult};

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid email regex")
});

/// Authorization server core.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct OAuthService {
    storage: AuthStorage,
    generator: Arc<dyn TokenGenerator>,
    config: OAuthConfig,
}

impl OAuthService {
    /// Creates a service issuing UUID codes.
    pub fn new(storage: AuthStorage, config: OAuthConfig) -> Self {
        Self {
            storage,
            generator: Arc::new(UuidTokenGenerator),
            config,
        }
    }

    /// Replaces the code generator.
    #[must_use]
    pub fn with_generator(mut self, generator: Arc<dyn TokenGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    pub fn storage(&self) -> &AuthStorage {
        &self.storage
    }

    pub(super) fn generate_code(&self) -> String {
        self.generator.generate()
    }

    /// Resolves the client a credential belongs to.
    ///
    /// Basic credentials name a client by public UUID and must carry its
    /// secret. Bearer credentials name the client owning the token. Any
    /// mismatch yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns storage failures unchanged.
    pub async fn resolve_client(&self, credential: &ClientCredential) -> AuthResult<Option<Client>> {
        match credential {
            ClientCredential::Basic { username, password } => {
                let Some(client) = self.storage.clients.find_by_uuid(username).await? else {
                    tracing::debug!(client_id = %username, "unknown client");
                    return Ok(None);
                };
                match verify_secret(password, &client.secret_hash) {
                    Ok(true) => Ok(Some(client)),
                    Ok(false) => {
                        tracing::debug!(client_id = %username, "client secret mismatch");
                        Ok(None)
                    }
                    Err(e) => {
                        tracing::warn!(client_id = %username, error = %e, "stored client secret hash is unreadable");
                        Ok(None)
                    }
                }
            }
            ClientCredential::Bearer { code } => {
                Ok(self.resolve_bearer(code).await?.map(|(_, client)| client))
            }
        }
    }

    /// Looks up a token by code together with the client owning it.
    ///
    /// # Errors
    ///
    /// Returns storage failures unchanged.
    pub async fn resolve_bearer(&self, code: &str) -> AuthResult<Option<(Token, Client)>> {
        let Some(token) = self.storage.tokens.find_by_code(code).await? else {
            return Ok(None);
        };
        let client = self.storage.clients.find_by_id(token.client_id).await?;
        Ok(client.map(|client| (token, client)))
    }

    /// Authenticates a resource owner by username or email and password.
    ///
    /// Values that look like an email address are looked up by email,
    /// everything else by username.
    ///
    /// # Errors
    ///
    /// Returns storage failures and unreadable password hashes.
    pub async fn authenticate_owner(&self, username: &str, password: &str) -> AuthResult<Option<User>> {
        if username.is_empty() || password.is_empty() {
            return Ok(None);
        }

        let user = if EMAIL_REGEX.is_match(username) {
            self.storage.users.find_by_email(username).await?
        } else {
            self.storage.users.find_by_username(username).await?
        };
        let Some(user) = user else {
            tracing::debug!(username = %username, "unknown resource owner");
            return Ok(None);
        };

        if verify_secret(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            tracing::debug!(user_id = user.id, "resource owner password mismatch");
            Ok(None)
        }
    }

    /// Mints an access and a refresh token for `source` and persists the
    /// resulting access grant.
    ///
    /// A persisted source (non-zero id) is removed first and only the
    /// caller that removed it proceeds, so a code or refresh token is
    /// redeemed at most once.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::GrantConsumed` if the source was already
    /// redeemed, or the first storage failure. Tokens written before a
    /// failure are not rolled back.
    pub async fn finalize(&self, source: &Grant, ctx: &mut ResponseContext) -> AuthResult<Grant> {
        if source.id != 0 && !self.storage.grants.remove(source.id).await? {
            return Err(AuthError::GrantConsumed { id: source.id });
        }

        let access = self
            .storage
            .tokens
            .create(Token::new(self.generate_code(), source.client_id, source.user_id))
            .await?;
        let refresh = self
            .storage
            .tokens
            .create(Token::new(self.generate_code(), source.client_id, source.user_id))
            .await?;

        let grant = self
            .storage
            .grants
            .create(Grant::access_for(
                source,
                access.id,
                refresh.id,
                self.config.access_expire_secs(),
            ))
            .await?;

        ctx.set_data(param::ACCESS_TOKEN, access.code);
        ctx.set_data(param::TOKEN_TYPE, self.config.token_type.as_str());
        ctx.set_data(param::EXPIRES_IN, grant.expires_in);
        if grant.refresh_token_id != 0 {
            ctx.set_data(param::REFRESH_TOKEN, refresh.code);
        }
        if !grant.scope.is_empty() {
            ctx.set_data(param::SCOPE, grant.scope.as_str());
        }

        tracing::info!(
            grant_id = grant.id,
            source_kind = ?source.kind,
            client_id = grant.client_id,
            user_id = grant.user_id,
            "access grant issued"
        );
        Ok(grant)
    }
}

impl std::fmt::Debug for OAuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
