//! WhatsApp pairing-code web service.
//!
//! Serves a small pairing site that:
//! - issues a short-lived pairing code for linking a bot account, via the
//!   multi-device gateway
//! - persists credential material to the session directory as the gateway
//!   reports it, so the linked session survives restarts
//! - gates the pages behind an optional shared access key
//! - force-closes each pairing session after a bounded window

pub mod api;
pub mod config;
pub mod error;
pub mod session;

pub use config::Config;
pub use error::PairError;
pub use session::PairingSessionManager;
