//! Pairing session lifecycle.

mod listener;
mod manager;

pub use listener::{PhaseConnectionListener, StoreCredentialListener};
pub use manager::{PairingSessionManager, SessionInfo};

use crate::error::PairError;
use serde::Serialize;

/// Lifecycle of one pairing attempt.
///
/// `Linked` is only ever observed from the gateway's connection updates;
/// the deferred teardown enters `Expired` regardless of link status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Created,
    CodeRequested,
    CodeIssued,
    Linked,
    Expired,
    Errored,
}

/// Validate a country-code-prefixed phone number: 6 to 15 ASCII digits,
/// no leading `+`. Returns the trimmed number.
pub fn validate_number(raw: &str) -> Result<&str, PairError> {
    let number = raw.trim();
    if (6..=15).contains(&number.len()) && number.bytes().all(|b| b.is_ascii_digit()) {
        Ok(number)
    } else {
        Err(PairError::InvalidPhoneNumber)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_number_accepts_plain_digits() {
        assert_eq!(validate_number("94771234567").unwrap(), "94771234567");
        assert_eq!(validate_number("  94771234567  ").unwrap(), "94771234567");
        assert_eq!(validate_number("123456").unwrap(), "123456");
        assert_eq!(validate_number("123456789012345").unwrap(), "123456789012345");
    }

    #[test]
    fn test_validate_number_rejects_bad_input() {
        for raw in [
            "",
            "abc123",
            "12345",
            "1234567890123456",
            "+94771234567",
            "9477 1234567",
            "94-771234567",
        ] {
            assert!(
                matches!(validate_number(raw), Err(PairError::InvalidPhoneNumber)),
                "{:?} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_session_phase_serialization() {
        let json = serde_json::to_string(&SessionPhase::CodeIssued).unwrap();
        assert_eq!(json, "\"codeissued\"");

        let json = serde_json::to_string(&SessionPhase::Linked).unwrap();
        assert_eq!(json, "\"linked\"");
    }
}
