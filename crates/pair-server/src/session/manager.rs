//! Orchestration of one pairing attempt end-to-end.

use super::listener::{PhaseConnectionListener, StoreCredentialListener};
use super::SessionPhase;
use crate::error::PairError;
use chrono::{DateTime, Utc};
use credential_store::SessionStore;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};
use wa_client::{Browser, EventPump, SocketOptions, WaGatewayClient, WaSocket};

/// One in-flight pairing attempt.
///
/// Ephemeral: created per `/pair` call, torn down by the deferred timeout,
/// never persisted or reused across requests.
struct PairingSession {
    number: String,
    started_at: DateTime<Utc>,
    phase: Arc<RwLock<SessionPhase>>,
    /// Fire-once scheduled teardown, abortable as the attachment point for
    /// caller-initiated cancellation.
    teardown: Option<JoinHandle<()>>,
}

impl Drop for PairingSession {
    fn drop(&mut self) {
        // A session evicted from the active map takes its pending teardown
        // with it.
        if let Some(teardown) = &self.teardown {
            teardown.abort();
        }
    }
}

/// Snapshot of an active session for the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub number: String,
    pub phase: SessionPhase,
    pub started_at: DateTime<Utc>,
}

/// Drives pairing attempts: opens a gateway socket bound to the stored
/// credential state, requests the code, wires credential and connection
/// notifications, and schedules the forced teardown.
pub struct PairingSessionManager {
    gateway: WaGatewayClient,
    store: SessionStore,
    browser: Browser,
    pairing_timeout: Duration,
    poll_interval: Duration,
    active: Arc<Mutex<HashMap<PathBuf, PairingSession>>>,
}

impl PairingSessionManager {
    /// Create a manager persisting into the given store.
    pub fn new(
        gateway: WaGatewayClient,
        store: SessionStore,
        pairing_timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            gateway,
            store,
            // Stable presentation shown in the phone's linked-devices list.
            browser: Browser::mac_os("Safari"),
            pairing_timeout,
            poll_interval,
            active: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of pairing sessions currently in flight.
    pub async fn active_count(&self) -> usize {
        self.active.lock().await.len()
    }

    /// Snapshots of the sessions currently in flight.
    pub async fn active_sessions(&self) -> Vec<SessionInfo> {
        let active = self.active.lock().await;
        let mut sessions = Vec::with_capacity(active.len());
        for session in active.values() {
            sessions.push(SessionInfo {
                number: session.number.clone(),
                phase: *session.phase.read().await,
                started_at: session.started_at,
            });
        }
        sessions
    }

    /// Start a pairing attempt and return the issued code.
    ///
    /// The code is returned as soon as the provider issues it; credential
    /// persistence and the deferred teardown continue asynchronously.
    #[instrument(skip(self))]
    pub async fn start(&self, number: &str) -> Result<String, PairError> {
        let dir = self.store.dir().to_path_buf();
        let phase = Arc::new(RwLock::new(SessionPhase::Created));

        // One pairing attempt per session directory at a time; a second
        // concurrent attempt is rejected outright rather than queued.
        {
            let mut active = self.active.lock().await;
            if active.contains_key(&dir) {
                return Err(PairError::SessionBusy);
            }
            active.insert(
                dir.clone(),
                PairingSession {
                    number: number.to_string(),
                    started_at: Utc::now(),
                    phase: phase.clone(),
                    teardown: None,
                },
            );
        }

        match self.open_and_request(number, phase.clone()).await {
            Ok((code, socket, pump)) => {
                *phase.write().await = SessionPhase::CodeIssued;
                let teardown =
                    self.schedule_teardown(number.to_string(), dir.clone(), socket, pump, phase);
                if let Some(session) = self.active.lock().await.get_mut(&dir) {
                    session.teardown = Some(teardown);
                }
                Ok(code)
            }
            Err(e) => {
                *phase.write().await = SessionPhase::Errored;
                self.active.lock().await.remove(&dir);
                Err(e)
            }
        }
    }

    /// Resolve credential state, negotiate the protocol version, open the
    /// socket, wire the observers, and request the pairing code.
    async fn open_and_request(
        &self,
        number: &str,
        phase: Arc<RwLock<SessionPhase>>,
    ) -> Result<(String, WaSocket, JoinHandle<()>), PairError> {
        self.store.ensure().await?;

        let version = self.gateway.fetch_latest_version().await?;
        let state = self.store.load().await?;

        let socket = self
            .gateway
            .open_socket(SocketOptions {
                auth: state.files,
                browser: self.browser.clone(),
                version: version.version,
            })
            .await?;

        let pump = EventPump::new(socket.clone(), self.poll_interval)
            .with_credential_listener(Arc::new(StoreCredentialListener::new(self.store.clone())))
            .with_connection_listener(Arc::new(PhaseConnectionListener::new(
                number,
                phase.clone(),
            )));
        let pump_handle = tokio::spawn(pump.run());

        *phase.write().await = SessionPhase::CodeRequested;
        match socket.request_pairing_code(number).await {
            Ok(code) => Ok((code, socket, pump_handle)),
            Err(e) => {
                // The socket was already open; tear it down right away.
                if let Err(err) = socket.logout().await {
                    debug!(error = %err, "logout after failed code request also failed");
                }
                pump_handle.abort();
                Err(e.into())
            }
        }
    }

    /// Schedule the forced teardown at the end of the pairing window.
    ///
    /// Fires at most once per session; the logout is advisory cleanup and
    /// any error is logged and ignored.
    fn schedule_teardown(
        &self,
        number: String,
        dir: PathBuf,
        socket: WaSocket,
        pump: JoinHandle<()>,
        phase: Arc<RwLock<SessionPhase>>,
    ) -> JoinHandle<()> {
        let active = Arc::clone(&self.active);
        let timeout = self.pairing_timeout;

        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;

            if let Err(e) = socket.logout().await {
                debug!(error = %e, "logout at end of pairing window failed");
            }
            pump.abort();
            *phase.write().await = SessionPhase::Expired;

            info!(number = %number, "pairing session closed after pairing window");
            active.lock().await.remove(&dir);
        })
    }
}
