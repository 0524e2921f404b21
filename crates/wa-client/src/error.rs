//! Gateway client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WaError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version negotiation failed: {0}")]
    VersionNegotiation(String),

    #[error("Socket open failed: {0}")]
    SocketOpen(String),

    #[error("Pairing rejected: {0}")]
    PairingRejected(String),

    #[error("Session no longer exists on the gateway")]
    SessionGone,

    #[error("API error: {0}")]
    Api(String),
}
