//! Error taxonomy for the pairing site.

use crate::api::pages;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

/// Failures a pairing attempt can surface to the caller.
///
/// Everything here happens before the code is issued; failures after that
/// point are logged only, since the response has already been sent.
#[derive(Debug, Error)]
pub enum PairError {
    #[error("Invalid phone number. Example: 94771234567")]
    InvalidPhoneNumber,

    #[error("Unauthorized - provide key")]
    AccessDenied,

    #[error("A pairing attempt is already in progress for this account")]
    SessionBusy,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Pairing service unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Pairing rejected: {0}")]
    PairingRejected(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for PairError {
    fn into_response(self) -> Response {
        let (status, title, hint) = match &self {
            PairError::InvalidPhoneNumber => (
                StatusCode::BAD_REQUEST,
                "Invalid phone number",
                "Use the country code and digits only, no + sign.",
            ),
            PairError::AccessDenied => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                "Supply the access key via ?key= or as the Basic auth password.",
            ),
            PairError::SessionBusy => (
                StatusCode::CONFLICT,
                "Pairing already in progress",
                "Wait for the current attempt to finish or time out.",
            ),
            PairError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error",
                "Credential storage failed; check the server logs.",
            ),
            PairError::ProviderUnavailable(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Pairing service unavailable",
                "Temporary problem reaching WhatsApp; try again in a moment.",
            ),
            PairError::PairingRejected(_) => (
                StatusCode::BAD_REQUEST,
                "Pairing rejected",
                "Check the number and try again.",
            ),
            PairError::RateLimitExceeded => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests",
                "Slow down and try again shortly.",
            ),
            PairError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error",
                "Unexpected failure; check the server logs.",
            ),
        };

        let body = Html(pages::error_page(title, &self.to_string(), hint));
        let mut response = (status, body).into_response();

        if matches!(self, PairError::AccessDenied) {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"pairing\""),
            );
        }

        response
    }
}

impl From<credential_store::StoreError> for PairError {
    fn from(e: credential_store::StoreError) -> Self {
        PairError::Storage(e.to_string())
    }
}

impl From<wa_client::WaError> for PairError {
    fn from(e: wa_client::WaError) -> Self {
        use wa_client::WaError;
        match e {
            WaError::PairingRejected(msg) => PairError::PairingRejected(msg),
            WaError::VersionNegotiation(msg) => PairError::ProviderUnavailable(msg),
            WaError::SocketOpen(msg) => PairError::ProviderUnavailable(msg),
            WaError::SessionGone => {
                PairError::ProviderUnavailable("session expired on the gateway".into())
            }
            WaError::Api(msg) => PairError::ProviderUnavailable(msg),
            WaError::Http(e) => PairError::ProviderUnavailable(e.to_string()),
            WaError::Json(e) => PairError::Internal(e.to_string()),
        }
    }
}
