//! WhatsApp multi-device gateway client.
//!
//! The gateway sidecar owns the multi-device cryptographic handshake; this
//! crate exposes a typed client for the slice of its REST API the pairing
//! flow needs, plus an event pump that delivers credential and connection
//! notifications to registered observers in emission order.

mod client;
mod error;
mod pump;
mod types;

pub use client::{WaGatewayClient, WaSocket};
pub use error::WaError;
pub use pump::{ConnectionListener, CredentialListener, EventPump};
pub use types::*;
