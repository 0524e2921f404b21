//! Access gate, rate limiting and request logging middleware.

use crate::error::PairError;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use base64::Engine as _;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{num::NonZeroU32, sync::Arc};
use tracing::{debug, warn};

/// Shared-secret gate protecting the pairing pages.
///
/// An empty configured key disables the gate, leaving the site open. The
/// key value itself is never logged and never echoed back to the caller.
#[derive(Clone)]
pub struct AccessGate {
    access_key: Arc<str>,
}

impl AccessGate {
    /// Create a gate for the configured key. Empty means open access.
    pub fn new(access_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into().into(),
        }
    }

    /// Whether a key is required at all.
    pub fn enabled(&self) -> bool {
        !self.access_key.is_empty()
    }

    /// Allow when the gate is disabled, or when either accepted channel
    /// (query parameter or Basic-auth password) carries the exact key.
    pub fn check(&self, query_key: Option<&str>, basic_password: Option<&str>) -> bool {
        if !self.enabled() {
            return true;
        }
        let key: &str = &self.access_key;
        query_key == Some(key) || basic_password == Some(key)
    }
}

/// Extract the `key` parameter from a raw query string.
fn query_key(query: &str) -> Option<String> {
    for pair in query.split('&') {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        if name == "key" {
            return Some(
                urlencoding::decode(value)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| value.to_string()),
            );
        }
    }
    None
}

/// Extract the password field of a Basic `Authorization` header.
/// The username is ignored.
fn basic_password(header_value: &str) -> Option<String> {
    let (scheme, payload) = header_value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (_user, password) = decoded.split_once(':')?;
    Some(password.to_string())
}

/// Access gate middleware.
///
/// Denial produces a 401 with a `WWW-Authenticate` challenge and no other
/// side effect: no session is created and the secret is not logged.
pub async fn require_key_middleware(
    State(gate): State<AccessGate>,
    request: Request,
    next: Next,
) -> Result<Response, PairError> {
    let supplied_query = request.uri().query().and_then(query_key);
    let supplied_basic = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(basic_password);

    if !gate.check(supplied_query.as_deref(), supplied_basic.as_deref()) {
        warn!(path = %request.uri().path(), "access key missing or wrong");
        return Err(PairError::AccessDenied);
    }

    Ok(next.run(request).await)
}

/// Global rate limiter (not keyed by IP).
pub type GlobalLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiter state shared across requests.
#[derive(Clone)]
pub struct RateLimitState {
    /// Global rate limiter for all requests
    pub global: Arc<GlobalLimiter>,
}

impl RateLimitState {
    /// Create a new rate limit state with the specified limit.
    pub fn new(requests_per_minute: u32) -> Self {
        let quota = Quota::per_minute(
            NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::new(10).unwrap()),
        );

        Self {
            global: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Create a permissive rate limiter for testing.
    pub fn permissive() -> Self {
        Self::new(1000)
    }
}

/// Rate limiting middleware. Returns 429 once the global quota is spent.
pub async fn rate_limit_middleware(
    State(rate_limit): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Result<Response, PairError> {
    if rate_limit.global.check().is_err() {
        warn!("global rate limit exceeded");
        return Err(PairError::RateLimitExceeded);
    }

    Ok(next.run(request).await)
}

/// Logging middleware for requests.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri_path = request.uri().path().to_string();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    if status.is_success() {
        debug!(%method, path = %uri_path, %status, ?duration, "request completed");
    } else {
        warn!(%method, path = %uri_path, %status, ?duration, "request failed");
    }

    response
}
