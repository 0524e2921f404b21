//! Observers wired between the gateway socket and local state.

use super::SessionPhase;
use async_trait::async_trait;
use credential_store::SessionStore;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use wa_client::{ConnectionListener, ConnectionState, ConnectionUpdate, CredentialDelta, CredentialListener};

/// Persists credential deltas into the session store as they arrive.
///
/// A failed persist is logged and swallowed: the code was already returned
/// to the caller, and a later update may still succeed.
pub struct StoreCredentialListener {
    store: SessionStore,
}

impl StoreCredentialListener {
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CredentialListener for StoreCredentialListener {
    async fn on_credential_update(&self, delta: &CredentialDelta) {
        match self.store.apply_update(&delta.files).await {
            Ok(()) => {
                debug!(documents = delta.files.len(), "credential update persisted");
            }
            Err(e) => {
                warn!(error = %e, "failed to persist credential update, session continues");
            }
        }
    }
}

/// Tracks the session phase from connection updates; log-only otherwise.
pub struct PhaseConnectionListener {
    number: String,
    phase: Arc<RwLock<SessionPhase>>,
}

impl PhaseConnectionListener {
    pub fn new(number: impl Into<String>, phase: Arc<RwLock<SessionPhase>>) -> Self {
        Self {
            number: number.into(),
            phase,
        }
    }
}

#[async_trait]
impl ConnectionListener for PhaseConnectionListener {
    async fn on_connection_update(&self, update: &ConnectionUpdate) {
        match update.connection {
            ConnectionState::Open => {
                let mut phase = self.phase.write().await;
                if matches!(*phase, SessionPhase::CodeRequested | SessionPhase::CodeIssued) {
                    *phase = SessionPhase::Linked;
                    info!(number = %self.number, "device linked");
                }
            }
            ConnectionState::Connecting => {
                debug!(number = %self.number, "connecting");
            }
            ConnectionState::Close => {
                info!(
                    number = %self.number,
                    reason = ?update.last_disconnect,
                    "connection closed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(connection: ConnectionState) -> ConnectionUpdate {
        ConnectionUpdate {
            connection,
            last_disconnect: None,
        }
    }

    #[tokio::test]
    async fn test_open_marks_session_linked() {
        let phase = Arc::new(RwLock::new(SessionPhase::CodeIssued));
        let listener = PhaseConnectionListener::new("94771234567", phase.clone());

        listener.on_connection_update(&update(ConnectionState::Open)).await;

        assert_eq!(*phase.read().await, SessionPhase::Linked);
    }

    #[tokio::test]
    async fn test_open_after_expiry_is_ignored() {
        let phase = Arc::new(RwLock::new(SessionPhase::Expired));
        let listener = PhaseConnectionListener::new("94771234567", phase.clone());

        listener.on_connection_update(&update(ConnectionState::Open)).await;

        assert_eq!(*phase.read().await, SessionPhase::Expired);
    }

    #[tokio::test]
    async fn test_close_leaves_phase_alone() {
        let phase = Arc::new(RwLock::new(SessionPhase::CodeIssued));
        let listener = PhaseConnectionListener::new("94771234567", phase.clone());

        listener.on_connection_update(&update(ConnectionState::Close)).await;

        assert_eq!(*phase.read().await, SessionPhase::CodeIssued);
    }

    #[tokio::test]
    async fn test_store_listener_persists_delta() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        let listener = StoreCredentialListener::new(store.clone());

        let delta: CredentialDelta = serde_json::from_value(serde_json::json!({
            "files": {"creds": {"registered": true}}
        }))
        .unwrap();

        listener.on_credential_update(&delta).await;

        let state = store.load().await.unwrap();
        assert_eq!(
            state.get("creds"),
            Some(&serde_json::json!({"registered": true}))
        );
    }
}
