//! Engine-level flows against the in-memory backend.

use std::sync::Arc;

use axum::http::Method;
use base64::{Engine, engine::general_purpose::STANDARD};
use hero_auth::oauth::context::{Committed, ResponseKind};
use hero_auth::secret::hash_secret;
use hero_auth::types::{Client, Grant, User};
use hero_auth::{AuthorizeOutcome, OAuthConfig, OAuthRequest, OAuthService, ResponseContext};
use hero_auth_memory::MemoryStorage;
use time::{Duration, OffsetDateTime};

const CLIENT_ID: &str = "client-1";
const CLIENT_SECRET: &str = "s3cret";
const REDIRECT: &str = "http://example.com";

struct Fixture {
    service: Arc<OAuthService>,
    memory: Arc<MemoryStorage>,
    user: User,
    client: Client,
}

async fn fixture() -> Fixture {
    fixture_with(OAuthConfig::default()).await
}

async fn fixture_with(config: OAuthConfig) -> Fixture {
    let memory = Arc::new(MemoryStorage::new());
    let storage = memory.clone().auth_storage();

    let user = storage
        .users
        .create(User::new(
            "owner",
            "owner@example.com",
            hash_secret("password").unwrap(),
        ))
        .await
        .unwrap();
    let client = storage
        .clients
        .create(
            Client::new(CLIENT_ID, user.id, "app", hash_secret(CLIENT_SECRET).unwrap())
                .with_redirect_url(REDIRECT),
        )
        .await
        .unwrap();

    Fixture {
        service: Arc::new(OAuthService::new(storage, config)),
        memory,
        user,
        client,
    }
}

fn basic(id: &str, secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{id}:{secret}")))
}

fn token_request() -> OAuthRequest {
    OAuthRequest::new(Method::POST, "/tokens").with_authorization(basic(CLIENT_ID, CLIENT_SECRET))
}

fn respond(outcome: AuthorizeOutcome) -> ResponseContext {
    match outcome {
        AuthorizeOutcome::Respond(ctx) => ctx,
        AuthorizeOutcome::Login { action, .. } => panic!("unexpected login form for {action}"),
    }
}

fn location(ctx: &ResponseContext) -> url::Url {
    match ctx.commit().unwrap() {
        Committed::Redirect { location } => url::Url::parse(&location).unwrap(),
        other => panic!("expected redirect, got {other:?}"),
    }
}

fn query_value(url: &url::Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

fn fragment_value(url: &url::Url, key: &str) -> Option<String> {
    url::form_urlencoded::parse(url.fragment().unwrap_or("").as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

async fn issue_code(fx: &Fixture, scope: &str) -> String {
    let request = OAuthRequest::new(Method::POST, "/authorize")
        .with_param("client_id", CLIENT_ID)
        .with_param("response_type", "code")
        .with_param("state", "xyz")
        .with_param("scope", scope)
        .with_param("login_username", "owner")
        .with_param("login_password", "password");

    let ctx = respond(fx.service.authorize(&request).await);
    query_value(&location(&ctx), "code").expect("code in redirect")
}

fn exchange_request(code: &str) -> OAuthRequest {
    token_request()
        .with_param("grant_type", "authorization_code")
        .with_param("code", code)
}

#[tokio::test]
async fn test_code_flow_redirects_with_code_and_state() {
    let fx = fixture().await;
    let request = OAuthRequest::new(Method::POST, "/authorize")
        .with_param("client_id", CLIENT_ID)
        .with_param("response_type", "code")
        .with_param("state", "xyz")
        .with_param("login_username", "owner")
        .with_param("login_password", "password");

    let ctx = respond(fx.service.authorize(&request).await);
    assert_eq!(ctx.kind(), ResponseKind::Redirect);

    let url = location(&ctx);
    assert_eq!(url.host_str(), Some("example.com"));
    assert!(query_value(&url, "code").is_some_and(|c| !c.is_empty()));
    assert_eq!(query_value(&url, "state").as_deref(), Some("xyz"));
}

#[tokio::test]
async fn test_login_by_email() {
    let fx = fixture().await;
    let request = OAuthRequest::new(Method::POST, "/authorize")
        .with_param("client_id", CLIENT_ID)
        .with_param("response_type", "code")
        .with_param("login_username", "owner@example.com")
        .with_param("login_password", "password");

    let ctx = respond(fx.service.authorize(&request).await);
    assert!(!ctx.has_error());
}

#[tokio::test]
async fn test_code_exchange_issues_tokens() {
    let fx = fixture().await;
    let code = issue_code(&fx, "").await;

    let ctx = fx.service.token(&exchange_request(&code)).await;
    assert!(!ctx.has_error(), "{:?}", ctx.data());
    assert!(!ctx.get("access_token").is_empty());
    assert!(!ctx.get("refresh_token").is_empty());
    assert_eq!(ctx.get("token_type"), "Bearer");
    assert_eq!(ctx.data()["expires_in"], 200);
    assert!(!ctx.data().contains_key("scope"));
}

#[tokio::test]
async fn test_code_is_single_use() {
    let fx = fixture().await;
    let code = issue_code(&fx, "").await;

    let first = fx.service.token(&exchange_request(&code)).await;
    assert!(!first.has_error());

    let second = fx.service.token(&exchange_request(&code)).await;
    assert!(
        matches!(second.get("error"), "invalid_grant" | "unauthorized_client"),
        "{:?}",
        second.data()
    );
}

#[tokio::test]
async fn test_concurrent_redemption_has_one_winner() {
    let fx = fixture().await;
    let code = issue_code(&fx, "").await;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = fx.service.clone();
            let request = exchange_request(&code);
            tokio::spawn(async move { service.token(&request).await })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        let ctx = handle.await.unwrap();
        if ctx.has_error() {
            assert!(matches!(
                ctx.get("error"),
                "invalid_grant" | "unauthorized_client"
            ));
        } else {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn test_expired_code_is_rejected() {
    let fx = fixture().await;
    let mut grant = Grant::pending_code("old-code", fx.client.id, fx.user.id, 200);
    grant.created_at = OffsetDateTime::now_utc() - Duration::seconds(200);
    fx.service.storage().grants.create(grant).await.unwrap();

    let ctx = fx.service.token(&exchange_request("old-code")).await;
    assert_eq!(ctx.get("error"), "invalid_grant");
}

#[tokio::test]
async fn test_code_exchange_checks_redirect() {
    let fx = fixture().await;
    let code = issue_code(&fx, "").await;

    let ctx = fx
        .service
        .token(&exchange_request(&code).with_param("redirect_url", "http://evil.example.com"))
        .await;
    assert_eq!(ctx.get("error"), "invalid_request");
}

#[tokio::test]
async fn test_missing_code_is_invalid_grant() {
    let fx = fixture().await;
    let ctx = fx.service.token(&exchange_request("")).await;
    assert_eq!(ctx.get("error"), "invalid_grant");
}

#[tokio::test]
async fn test_unknown_grant_type() {
    let fx = fixture().await;
    let ctx = fx
        .service
        .token(&token_request().with_param("grant_type", "device_code"))
        .await;
    assert_eq!(ctx.get("error"), "unsupported_grant_type");
    assert!(matches!(ctx.commit().unwrap(), Committed::Data { .. }));
}

#[tokio::test]
async fn test_authorize_without_parameters() {
    let fx = fixture().await;
    let ctx = respond(
        fx.service
            .authorize(&OAuthRequest::new(Method::GET, "/authorize"))
            .await,
    );
    assert_eq!(ctx.kind(), ResponseKind::Data);
    assert_eq!(ctx.get("error"), "server_error");
    assert!(!ctx.data().contains_key("state"));
}

#[tokio::test]
async fn test_authorize_unknown_client() {
    let fx = fixture().await;
    let request = OAuthRequest::new(Method::GET, "/authorize")
        .with_param("client_id", "nope")
        .with_param("state", "abc");
    let ctx = respond(fx.service.authorize(&request).await);
    assert_eq!(ctx.get("error"), "unauthorized_client");
    assert_eq!(ctx.get("state"), "abc");
}

#[tokio::test]
async fn test_authorize_rejects_foreign_redirect() {
    let fx = fixture().await;
    let request = OAuthRequest::new(Method::GET, "/authorize")
        .with_param("client_id", CLIENT_ID)
        .with_param("redirect_url", "http%3A%2F%2Fevil.com%2Fcb");
    let ctx = respond(fx.service.authorize(&request).await);
    assert_eq!(ctx.kind(), ResponseKind::Data);
    assert_eq!(ctx.get("error"), "invalid_request");
}

#[tokio::test]
async fn test_authorize_accepts_registered_subpath() {
    let fx = fixture().await;
    let request = OAuthRequest::new(Method::POST, "/authorize")
        .with_param("client_id", CLIENT_ID)
        .with_param("response_type", "code")
        .with_param("redirect_url", "http://example.com/cb")
        .with_session_user(Some(fx.user.id));
    let ctx = respond(fx.service.authorize(&request).await);
    assert_eq!(location(&ctx).path(), "/cb");
}

#[tokio::test]
async fn test_authorize_requires_login() {
    let fx = fixture().await;
    let request = OAuthRequest::new(Method::GET, "/authorize?client_id=client-1&response_type=code")
        .with_param("client_id", CLIENT_ID)
        .with_param("response_type", "code");

    match fx.service.authorize(&request).await {
        AuthorizeOutcome::Login { action, failed } => {
            assert_eq!(action, "/authorize?client_id=client-1&response_type=code");
            assert!(!failed);
        }
        AuthorizeOutcome::Respond(ctx) => panic!("unexpected response {:?}", ctx.data()),
    }

    let request = OAuthRequest::new(Method::POST, "/authorize")
        .with_param("client_id", CLIENT_ID)
        .with_param("response_type", "code")
        .with_param("login_username", "owner")
        .with_param("login_password", "wrong");
    assert!(matches!(
        fx.service.authorize(&request).await,
        AuthorizeOutcome::Login { failed: true, .. }
    ));
}

#[tokio::test]
async fn test_session_user_skips_login() {
    let fx = fixture().await;
    let request = OAuthRequest::new(Method::GET, "/authorize")
        .with_param("client_id", CLIENT_ID)
        .with_param("response_type", "code")
        .with_session_user(Some(fx.user.id));
    let ctx = respond(fx.service.authorize(&request).await);
    assert!(query_value(&location(&ctx), "code").is_some());
}

#[tokio::test]
async fn test_implicit_flow_uses_fragment() {
    let fx = fixture().await;
    let request = OAuthRequest::new(Method::GET, "/authorize")
        .with_param("client_id", CLIENT_ID)
        .with_param("response_type", "token")
        .with_param("state", "st")
        .with_session_user(Some(fx.user.id));
    let ctx = respond(fx.service.authorize(&request).await);

    let url = location(&ctx);
    assert_eq!(url.query(), None);
    assert!(fragment_value(&url, "access_token").is_some());
    assert_eq!(fragment_value(&url, "token_type").as_deref(), Some("Bearer"));
    assert_eq!(fragment_value(&url, "state").as_deref(), Some("st"));
}

#[tokio::test]
async fn test_unsupported_response_type_redirects_error() {
    let fx = fixture().await;
    let request = OAuthRequest::new(Method::GET, "/authorize")
        .with_param("client_id", CLIENT_ID)
        .with_param("response_type", "id_token")
        .with_param("state", "st")
        .with_session_user(Some(fx.user.id));
    let ctx = respond(fx.service.authorize(&request).await);

    let url = location(&ctx);
    assert_eq!(query_value(&url, "error").as_deref(), Some("unsupported_response_type"));
    assert_eq!(query_value(&url, "state").as_deref(), Some("st"));
}

#[tokio::test]
async fn test_client_authentication_failures() {
    let fx = fixture().await;

    let ctx = fx
        .service
        .token(&OAuthRequest::new(Method::POST, "/tokens").with_param("grant_type", "client_credentials"))
        .await;
    assert_eq!(ctx.get("error"), "invalid_client");

    let ctx = fx
        .service
        .token(
            &OAuthRequest::new(Method::POST, "/tokens")
                .with_authorization(basic(CLIENT_ID, "wrong"))
                .with_param("grant_type", "client_credentials"),
        )
        .await;
    assert_eq!(ctx.get("error"), "invalid_client");
}

#[tokio::test]
async fn test_client_credentials_via_params() {
    let fx = fixture().await;
    let request = OAuthRequest::new(Method::POST, "/tokens")
        .with_param("grant_type", "client_credentials")
        .with_param("client_id", CLIENT_ID)
        .with_param("client_secret", CLIENT_SECRET)
        .with_param("scope", "user");

    let ctx = fx.service.token(&request).await;
    assert!(!ctx.has_error(), "{:?}", ctx.data());
    assert_eq!(ctx.get("scope"), "user");

    let token = fx
        .service
        .storage()
        .tokens
        .find_by_code(ctx.get("access_token"))
        .await
        .unwrap()
        .unwrap();
    let grant = fx
        .service
        .storage()
        .grants
        .find_by_access_token(token.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(grant.user_id, fx.client.user_id);
}

#[tokio::test]
async fn test_password_grant() {
    let fx = fixture().await;

    let ctx = fx
        .service
        .token(
            &token_request()
                .with_param("grant_type", "password")
                .with_param("username", "owner")
                .with_param("password", "password"),
        )
        .await;
    assert!(!ctx.has_error(), "{:?}", ctx.data());

    let ctx = fx
        .service
        .token(
            &token_request()
                .with_param("grant_type", "password")
                .with_param("username", "owner")
                .with_param("password", "nope"),
        )
        .await;
    assert_eq!(ctx.get("error"), "invalid_grant");

    let ctx = fx
        .service
        .token(&token_request().with_param("grant_type", "password"))
        .await;
    assert_eq!(ctx.get("error"), "invalid_grant");
}

#[tokio::test]
async fn test_assertion_grant() {
    let fx = fixture().await;

    let ctx = fx
        .service
        .token(&token_request().with_param("grant_type", "assertion"))
        .await;
    assert_eq!(ctx.get("error"), "invalid_grant");

    let ctx = fx
        .service
        .token(
            &token_request()
                .with_param("grant_type", "assertion")
                .with_param("assertion_type", "urn:example:saml")
                .with_param("assertion", "PHNhbWw+"),
        )
        .await;
    assert!(!ctx.has_error(), "{:?}", ctx.data());
}

async fn password_tokens(fx: &Fixture, scope: &str) -> ResponseContext {
    let ctx = fx
        .service
        .token(
            &token_request()
                .with_param("grant_type", "password")
                .with_param("username", "owner")
                .with_param("password", "password")
                .with_param("scope", scope),
        )
        .await;
    assert!(!ctx.has_error(), "{:?}", ctx.data());
    ctx
}

fn refresh_request(refresh: &str, scope: &str) -> OAuthRequest {
    token_request()
        .with_param("grant_type", "refresh_token")
        .with_param("refresh_token", refresh)
        .with_param("scope", scope)
}

#[tokio::test]
async fn test_refresh_rotates_tokens() {
    let fx = fixture().await;
    let issued = password_tokens(&fx, "user,repo").await;
    let refresh = issued.get("refresh_token").to_string();

    let ctx = fx.service.token(&refresh_request(&refresh, "user")).await;
    assert!(!ctx.has_error(), "{:?}", ctx.data());
    assert_eq!(ctx.get("scope"), "user");
    assert_ne!(ctx.get("access_token"), issued.get("access_token"));

    let reused = fx.service.token(&refresh_request(&refresh, "user")).await;
    assert_eq!(reused.get("error"), "invalid_grant");
}

#[tokio::test]
async fn test_refresh_keeps_original_scope() {
    let fx = fixture().await;
    let issued = password_tokens(&fx, "user,repo").await;

    let ctx = fx
        .service
        .token(&refresh_request(issued.get("refresh_token"), ""))
        .await;
    assert_eq!(ctx.get("scope"), "user,repo");
}

#[tokio::test]
async fn test_refresh_scope_must_overlap() {
    let fx = fixture().await;
    let issued = password_tokens(&fx, "one,two,three").await;

    let ctx = fx
        .service
        .token(&refresh_request(issued.get("refresh_token"), "none"))
        .await;
    assert_eq!(ctx.get("error"), "access_denied");
}

#[tokio::test]
async fn test_refresh_requires_owning_client() {
    let fx = fixture().await;
    let issued = password_tokens(&fx, "").await;

    fx.service
        .storage()
        .clients
        .create(
            Client::new("client-2", fx.user.id, "other", hash_secret("other").unwrap())
                .with_redirect_url(REDIRECT),
        )
        .await
        .unwrap();

    let request = OAuthRequest::new(Method::POST, "/tokens")
        .with_authorization(basic("client-2", "other"))
        .with_param("grant_type", "refresh_token")
        .with_param("refresh_token", issued.get("refresh_token"));
    let ctx = fx.service.token(&request).await;
    assert_eq!(ctx.get("error"), "unauthorized_client");
}

#[tokio::test]
async fn test_refresh_with_access_token_is_rejected() {
    let fx = fixture().await;
    let issued = password_tokens(&fx, "").await;

    let ctx = fx
        .service
        .token(&refresh_request(issued.get("access_token"), ""))
        .await;
    assert_eq!(ctx.get("error"), "invalid_grant");
}

#[tokio::test]
async fn test_token_method_rules() {
    let fx = fixture().await;
    let get = OAuthRequest::new(Method::GET, "/tokens")
        .with_authorization(basic(CLIENT_ID, CLIENT_SECRET))
        .with_param("grant_type", "client_credentials");

    let ctx = fx.service.token(&get).await;
    assert_eq!(ctx.get("error"), "invalid_request");

    let put = OAuthRequest::new(Method::PUT, "/tokens")
        .with_authorization(basic(CLIENT_ID, CLIENT_SECRET))
        .with_param("grant_type", "client_credentials");
    assert_eq!(fx.service.token(&put).await.get("error"), "invalid_request");

    let fx = fixture_with(OAuthConfig::default().with_get_access(true)).await;
    let ctx = fx.service.token(&get).await;
    assert!(!ctx.has_error(), "{:?}", ctx.data());

    let ctx = fx.service.token(&put).await;
    assert_eq!(ctx.get("error"), "invalid_request");
}

#[tokio::test]
async fn test_grant_allow_list() {
    let fx = fixture_with(OAuthConfig::default().with_allowed_grant_types(["authorization_code"])).await;
    let ctx = fx
        .service
        .token(&token_request().with_param("grant_type", "client_credentials"))
        .await;
    assert_eq!(ctx.get("error"), "unsupported_grant_type");
}

#[tokio::test]
async fn test_info_returns_owner_fields() {
    let fx = fixture().await;
    let issued = password_tokens(&fx, "user").await;

    let request = OAuthRequest::new(Method::GET, "/info")
        .with_authorization(format!("Bearer {}", issued.get("access_token")));
    let ctx = fx.service.info(&request).await;

    assert!(!ctx.has_error(), "{:?}", ctx.data());
    assert_eq!(ctx.get("email"), "owner@example.com");
    assert_eq!(ctx.get("name"), "owner");
    assert_eq!(ctx.get("avatar_url"), "avatar");
}

#[tokio::test]
async fn test_info_failures() {
    let fx = fixture().await;

    let ctx = fx
        .service
        .info(&OAuthRequest::new(Method::GET, "/info"))
        .await;
    assert_eq!(ctx.get("error"), "invalid_request");

    let ctx = fx
        .service
        .info(&OAuthRequest::new(Method::GET, "/info").with_authorization("Bearer unknown"))
        .await;
    assert_eq!(ctx.get("error"), "unauthorized_client");

    let issued = password_tokens(&fx, "repo").await;
    let ctx = fx
        .service
        .info(
            &OAuthRequest::new(Method::GET, "/info")
                .with_param("code", issued.get("access_token")),
        )
        .await;
    assert_eq!(ctx.get("error"), "invalid_grant");
}

#[tokio::test]
async fn test_finalize_persists_tokens_and_grant() {
    let fx = fixture().await;
    let before_grants = fx.memory.grant_count();
    let before_tokens = fx.memory.token_count();

    password_tokens(&fx, "").await;

    assert_eq!(fx.memory.grant_count(), before_grants + 1);
    assert_eq!(fx.memory.token_count(), before_tokens + 2);
}
