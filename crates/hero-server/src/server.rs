use std::{net::SocketAddr, sync::Arc};

use axum::{Router, routing::get};
use hero_auth::http::{OAuthState, oauth_router};
use hero_auth::{AuthStorage, OAuthService, SessionStore};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{account::account_router, bootstrap::bootstrap_seed_data, config::AppConfig, handlers};

pub struct HeroServer {
    addr: SocketAddr,
    app: Router,
}

/// Builds the application over fresh in-memory storage, seeded from the
/// `[bootstrap]` section.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let storage = hero_auth_memory::create_auth_storage();
    let stats = bootstrap_seed_data(&storage, &cfg.bootstrap).await?;
    if stats.users + stats.clients > 0 {
        tracing::info!(users = stats.users, clients = stats.clients, "bootstrap data seeded");
    }
    Ok(build_app_with_storage(cfg, storage))
}

/// Builds the application over the given storage.
pub fn build_app_with_storage(cfg: &AppConfig, storage: AuthStorage) -> Router {
    let sessions = SessionStore::new(storage.sessions.clone(), cfg.session.clone());
    let service = Arc::new(OAuthService::new(storage, cfg.oauth.clone()));
    let state = OAuthState::new(service, sessions);

    let body_limit = cfg.server.body_limit_bytes;
    Router::new()
        // Health endpoints
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        // OAuth endpoints at their configured paths
        .merge(oauth_router(state.clone()))
        // Resource-owner pages
        .merge(account_router(state))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri().path(),
                        http.status_code = tracing::field::Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub async fn build(self) -> anyhow::Result<HeroServer> {
        let app = build_app(&self.config).await?;

        Ok(HeroServer {
            addr: self.addr,
            app,
        })
    }
}

impl HeroServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
