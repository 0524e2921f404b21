//! HTTP API for the pairing site.

mod handlers;
mod middleware;
pub(crate) mod pages;

pub use handlers::*;
pub use middleware::{
    logging_middleware, rate_limit_middleware, require_key_middleware, AccessGate, RateLimitState,
};

use crate::session::PairingSessionManager;
use axum::{middleware as axum_middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use wa_client::WaGatewayClient;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Pairing session orchestration
    pub sessions: Arc<PairingSessionManager>,
    /// Gateway client (health checks)
    pub gateway: WaGatewayClient,
    /// Access gate for the pairing pages
    pub gate: AccessGate,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        sessions: Arc<PairingSessionManager>,
        gateway: WaGatewayClient,
        gate: AccessGate,
    ) -> Self {
        Self {
            sessions,
            gateway,
            gate,
        }
    }
}

/// Create the router with the default rate limit.
pub fn create_router(state: AppState) -> Router {
    create_router_with_rate_limit(state, RateLimitState::new(10))
}

/// Create the router with custom rate limiting.
pub fn create_router_with_rate_limit(state: AppState, rate_limit: RateLimitState) -> Router {
    // The pairing pages sit behind the access gate; health does not.
    let gated = Router::new()
        .route("/", get(handlers::index))
        .route("/pair", get(handlers::pair))
        .route_layer(axum_middleware::from_fn_with_state(
            state.gate.clone(),
            require_key_middleware,
        ));

    Router::new()
        .merge(gated)
        .route("/health", get(handlers::health))
        .layer(axum_middleware::from_fn_with_state(
            rate_limit.clone(),
            rate_limit_middleware,
        ))
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
