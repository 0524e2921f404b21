//! HTTP request handlers.

use super::pages;
use super::AppState;
use crate::error::PairError;
use crate::session::{validate_number, SessionInfo};
use axum::extract::{Query, State};
use axum::response::Html;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Query parameters for `/pair`. The access key travels alongside but is
/// consumed by the gate middleware, never here.
#[derive(Debug, Deserialize)]
pub struct PairQuery {
    #[serde(default)]
    pub number: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub gateway_healthy: bool,
    pub active_sessions: Vec<SessionInfo>,
}

/// Landing page: the pairing form. No state change.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(pages::form_page(state.gate.enabled()))
}

/// Issue a pairing code for the requested number.
pub async fn pair(
    State(state): State<AppState>,
    Query(query): Query<PairQuery>,
) -> Result<Html<String>, PairError> {
    let number = validate_number(&query.number)?;
    info!(number = %number, "pairing code requested");

    match state.sessions.start(number).await {
        Ok(code) => {
            info!(number = %number, code = %code, "pairing code issued");
            Ok(Html(pages::code_page(number, &code)))
        }
        Err(e) => {
            warn!(number = %number, error = %e, "pairing attempt failed");
            Err(e)
        }
    }
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let gateway_healthy = state.gateway.health_check().await;
    let active_sessions = state.sessions.active_sessions().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        gateway_healthy,
        active_sessions,
    })
}
