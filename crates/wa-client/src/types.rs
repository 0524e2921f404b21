//! Gateway wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Multi-device protocol version advertised by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct WaVersion {
    pub version: String,
}

/// Browser presentation announced when the socket opens.
///
/// WhatsApp shows this triple (platform, browser, release) in the phone's
/// linked-devices list, so it should stay stable across pairing attempts.
#[derive(Debug, Clone, Serialize)]
pub struct Browser([String; 3]);

impl Browser {
    pub fn new(
        platform: impl Into<String>,
        browser: impl Into<String>,
        release: impl Into<String>,
    ) -> Self {
        Self([platform.into(), browser.into(), release.into()])
    }

    /// macOS presentation, e.g. `Browser::mac_os("Safari")`.
    pub fn mac_os(browser: &str) -> Self {
        Self::new("Mac OS", browser, "10.15.7")
    }
}

/// Options for opening a multi-device socket.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketOptions {
    /// Existing credential documents, empty for a fresh account.
    pub auth: BTreeMap<String, Value>,

    /// Client presentation shown on the paired phone.
    pub browser: Browser,

    /// Negotiated protocol version.
    pub version: String,
}

/// Response to a socket open request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOpened {
    pub session_id: String,
}

/// Response to a pairing code request.
#[derive(Debug, Clone, Deserialize)]
pub struct PairingCodeResponse {
    pub code: String,
}

/// Credential material change emitted by the gateway.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CredentialDelta {
    /// Document name to new contents, or `null` when the gateway retired
    /// a document.
    pub files: BTreeMap<String, Option<Value>>,
}

/// Connection state of the underlying socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connecting,
    Open,
    Close,
}

/// Connection status change for one session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionUpdate {
    pub connection: ConnectionState,

    /// Gateway-reported reason for the most recent disconnect, if any.
    #[serde(default)]
    pub last_disconnect: Option<String>,
}

/// Event delivered on a session's event feed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum SocketEvent {
    #[serde(rename = "creds.update")]
    CredsUpdate(CredentialDelta),

    #[serde(rename = "connection.update")]
    ConnectionUpdate(ConnectionUpdate),
}
