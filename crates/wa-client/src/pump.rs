//! Session event pump with ordered listener dispatch.

use crate::client::WaSocket;
use crate::error::WaError;
use crate::types::{ConnectionUpdate, CredentialDelta, SocketEvent};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, error, info};

/// Observer for credential material changes emitted by the gateway.
///
/// Called once per `creds.update` event, in emission order. Implementations
/// own their failure handling; a failed persist must not stop the session.
#[async_trait]
pub trait CredentialListener: Send + Sync {
    async fn on_credential_update(&self, delta: &CredentialDelta);
}

/// Observer for connection status changes.
#[async_trait]
pub trait ConnectionListener: Send + Sync {
    async fn on_connection_update(&self, update: &ConnectionUpdate);
}

/// Polls a session's event feed and dispatches to registered listeners.
///
/// Dispatch happens from a single task, one event at a time, so listeners
/// observe updates in the order the gateway emitted them. The pump stops
/// when the gateway reports the session gone (after logout or expiry).
pub struct EventPump {
    socket: WaSocket,
    poll_interval: Duration,
    credential_listener: Option<Arc<dyn CredentialListener>>,
    connection_listener: Option<Arc<dyn ConnectionListener>>,
}

impl EventPump {
    /// Create a pump for the given socket.
    pub fn new(socket: WaSocket, poll_interval: Duration) -> Self {
        Self {
            socket,
            poll_interval,
            credential_listener: None,
            connection_listener: None,
        }
    }

    /// Register the credential update listener.
    pub fn with_credential_listener(mut self, listener: Arc<dyn CredentialListener>) -> Self {
        self.credential_listener = Some(listener);
        self
    }

    /// Register the connection status listener.
    pub fn with_connection_listener(mut self, listener: Arc<dyn ConnectionListener>) -> Self {
        self.connection_listener = Some(listener);
        self
    }

    /// Run until the session is gone, dispatching events in order.
    pub async fn run(self) {
        let Self {
            socket,
            poll_interval,
            credential_listener,
            connection_listener,
        } = self;

        let session_id = socket.session_id().to_string();
        let stream = event_stream(socket, poll_interval);
        tokio::pin!(stream);

        while let Some(event) = stream.next().await {
            match &event {
                SocketEvent::CredsUpdate(delta) => {
                    debug!(documents = delta.files.len(), "credential update received");
                    if let Some(listener) = &credential_listener {
                        listener.on_credential_update(delta).await;
                    }
                }
                SocketEvent::ConnectionUpdate(update) => {
                    info!(
                        connection = ?update.connection,
                        last_disconnect = ?update.last_disconnect,
                        "connection update"
                    );
                    if let Some(listener) = &connection_listener {
                        listener.on_connection_update(update).await;
                    }
                }
            }
        }

        debug!(session_id = %session_id, "event pump stopped");
    }
}

/// Poll the session's events as an async stream.
fn event_stream(socket: WaSocket, poll_interval: Duration) -> impl Stream<Item = SocketEvent> {
    async_stream::stream! {
        loop {
            match socket.events().await {
                Ok(events) => {
                    for event in events {
                        yield event;
                    }
                }
                Err(WaError::SessionGone) => {
                    debug!("session gone, stopping event stream");
                    break;
                }
                Err(e) => {
                    error!("event poll error: {}", e);
                    // Back off on error
                    sleep(Duration::from_secs(5)).await;
                    continue;
                }
            }

            sleep(poll_interval).await;
        }
    }
}
