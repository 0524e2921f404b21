//! Credential material types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Full credential material for one linked account.
///
/// Documents are opaque JSON blobs whose schema belongs to the multi-device
/// gateway. Only document existence and atomic replacement matter here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialState {
    /// Documents indexed by name. Each is stored as `<name>.json` inside
    /// the session directory.
    pub files: BTreeMap<String, Value>,
}

impl CredentialState {
    /// Create empty credential state (no account linked yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any credential material exists.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Look up a document by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.files.get(name)
    }

    /// Insert or replace a document.
    pub fn upsert(&mut self, name: impl Into<String>, doc: Value) {
        self.files.insert(name.into(), doc);
    }

    /// Remove a document.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.files.remove(name)
    }
}
