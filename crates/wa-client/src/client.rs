//! HTTP client for the WhatsApp multi-device gateway.

use crate::error::WaError;
use crate::types::*;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use urlencoding::encode;

/// Client for the multi-device gateway REST API.
///
/// The gateway owns the cryptographic handshake; this client only drives
/// session lifecycle: version negotiation, socket open, pairing code
/// request, event polling and logout.
#[derive(Clone)]
pub struct WaGatewayClient {
    client: Client,
    base_url: String,
}

impl WaGatewayClient {
    /// Create a new gateway client.
    pub fn new(base_url: impl Into<String>) -> Result<Self, WaError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Check if the gateway is healthy.
    pub async fn health_check(&self) -> bool {
        self.client
            .get(format!("{}/v1/health", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    /// Negotiate the current protocol version with the gateway.
    #[instrument(skip(self))]
    pub async fn fetch_latest_version(&self) -> Result<WaVersion, WaError> {
        let response = self
            .client
            .get(format!("{}/v1/version", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "version negotiation failed");
            return Err(WaError::VersionNegotiation(format!("{} - {}", status, body)));
        }

        let version: WaVersion = response.json().await?;
        debug!(version = %version.version, "negotiated protocol version");
        Ok(version)
    }

    /// Open a multi-device socket bound to the given credential state.
    #[instrument(skip(self, options))]
    pub async fn open_socket(&self, options: SocketOptions) -> Result<WaSocket, WaError> {
        let response = self
            .client
            .post(format!("{}/v1/sessions", self.base_url))
            .json(&options)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "socket open failed");
            return Err(WaError::SocketOpen(format!("{} - {}", status, body)));
        }

        let opened: SessionOpened = response.json().await?;
        debug!(session_id = %opened.session_id, "socket opened");

        Ok(WaSocket {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            session_id: opened.session_id,
        })
    }
}

/// Handle to one open multi-device session on the gateway.
#[derive(Clone)]
pub struct WaSocket {
    client: Client,
    base_url: String,
    session_id: String,
}

impl WaSocket {
    /// The gateway-assigned session id.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Request a pairing code for the given phone number.
    ///
    /// Blocking network round trip; a 4xx from the gateway means the
    /// provider refused to issue a code for this number.
    #[instrument(skip(self))]
    pub async fn request_pairing_code(&self, number: &str) -> Result<String, WaError> {
        let response = self
            .client
            .post(format!(
                "{}/v1/sessions/{}/pairing-code",
                self.base_url,
                encode(&self.session_id)
            ))
            .json(&serde_json::json!({ "number": number }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "pairing code request failed");
            if status.is_client_error() {
                return Err(WaError::PairingRejected(body));
            }
            return Err(WaError::Api(format!("{} - {}", status, body)));
        }

        let pairing: PairingCodeResponse = response.json().await?;
        Ok(pairing.code)
    }

    /// Poll pending events for this session.
    #[instrument(skip(self))]
    pub async fn events(&self) -> Result<Vec<SocketEvent>, WaError> {
        let response = self
            .client
            .get(format!(
                "{}/v1/sessions/{}/events",
                self.base_url,
                encode(&self.session_id)
            ))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(WaError::SessionGone);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WaError::Api(format!("{} - {}", status, body)));
        }

        Ok(response.json().await?)
    }

    /// End the session on the gateway. Advisory cleanup; a session that is
    /// already gone counts as logged out.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), WaError> {
        let response = self
            .client
            .post(format!(
                "{}/v1/sessions/{}/logout",
                self.base_url,
                encode(&self.session_id)
            ))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Ok(());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WaError::Api(format!("{} - {}", status, body)));
        }

        debug!(session_id = %self.session_id, "logged out");
        Ok(())
    }
}
