mod backend_client;
mod config;
mod errors;
mod identity;
mod interpret;
mod models;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::backend_client::HttpQueryBackend;
use crate::config::Config;
use crate::identity::HttpIdentityProvider;
use crate::routes::build_router;
use crate::session::store::SessionStore;
use crate::state::AppState;

/// How often idle sessions are swept.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume chat client v{}", env!("CARGO_PKG_VERSION"));

    let backend = HttpQueryBackend::new(config.query_backend_url.clone(), config.request_timeout)?;
    info!("Query backend: {}", config.query_backend_url);

    let identity = HttpIdentityProvider::new(config.identity_url.clone(), config.request_timeout)?;
    info!("Identity provider: {}", config.identity_url);

    let sessions = SessionStore::new(config.session_idle);
    tokio::spawn(sessions.clone().sweep_idle(SESSION_SWEEP_INTERVAL));
    info!("Sessions expire after {}s idle", config.session_idle.as_secs());

    let state = AppState {
        sessions,
        backend: Arc::new(backend),
        identity: Arc::new(identity),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
