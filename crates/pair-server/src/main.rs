//! Pairing site - entry point.

use credential_store::SessionStore;
use pair_server::{
    api::{create_router_with_rate_limit, AccessGate, AppState, RateLimitState},
    config::Config,
    session::PairingSessionManager,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wa_client::WaGatewayClient;

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting pairing site");

    if config.auth.access_key.is_empty() {
        warn!("No access key configured, the pairing pages are open to anyone");
    }

    // Gateway client
    let gateway = match WaGatewayClient::new(&config.gateway.api_url) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create gateway client: {}", e);
            std::process::exit(1);
        }
    };

    // Credential storage; the directory itself is created lazily on the
    // first pairing attempt.
    let store = SessionStore::new(config.session.dir.clone());
    info!(dir = %store.dir().display(), "credential store configured");

    // Session orchestration
    let sessions = Arc::new(PairingSessionManager::new(
        gateway.clone(),
        store,
        config.session.pairing_timeout,
        config.gateway.poll_interval,
    ));

    // Create application state
    let state = AppState::new(sessions, gateway, AccessGate::new(&config.auth.access_key));

    // Create rate limiter from config
    let rate_limit = RateLimitState::new(config.rate_limit.global_per_minute);

    // Create router
    let app = create_router_with_rate_limit(state, rate_limit);

    // Bind to address
    let addr = SocketAddr::new(
        config.server.listen_addr.parse().unwrap_or([0, 0, 0, 0].into()),
        config.server.port,
    );

    info!("Listening on {}", addr);

    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
