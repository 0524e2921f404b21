//! Durable storage for one account's multi-device credential material.
//!
//! Credential documents arrive as opaque JSON from the protocol gateway
//! and must survive process restarts so a paired session can be reused.

mod error;
mod store;
mod types;

pub use error::StoreError;
pub use store::SessionStore;
pub use types::CredentialState;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_credential_state_upsert_and_get() {
        let mut state = CredentialState::new();
        assert!(state.is_empty());

        state.upsert("creds", json!({"registered": true}));
        assert_eq!(state.len(), 1);
        assert_eq!(state.get("creds"), Some(&json!({"registered": true})));

        state.upsert("creds", json!({"registered": false}));
        assert_eq!(state.len(), 1);
        assert_eq!(state.get("creds"), Some(&json!({"registered": false})));
    }

    #[test]
    fn test_credential_state_remove() {
        let mut state = CredentialState::new();
        state.upsert("creds", json!({}));

        assert_eq!(state.remove("creds"), Some(json!({})));
        assert!(state.is_empty());
        assert_eq!(state.remove("creds"), None);
    }

    #[test]
    fn test_credential_state_serialization() {
        let mut state = CredentialState::new();
        state.upsert("creds", json!({"me": {"id": "94771234567@s.whatsapp.net"}}));

        let json = serde_json::to_string(&state).unwrap();
        let restored: CredentialState = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, state);
    }

    #[tokio::test]
    async fn test_ensure_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session"));

        store.ensure().await.unwrap();
        assert!(store.dir().is_dir());

        // Second call on an existing directory must not error.
        store.ensure().await.unwrap();
        assert!(store.dir().is_dir());
    }

    #[tokio::test]
    async fn test_load_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("never-created"));

        let state = store.load().await.unwrap();
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn test_persist_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());

        store.persist("creds", &json!({"noiseKey": "abc"})).await.unwrap();
        store.persist("app-state-sync-key-1", &json!({"keyData": "xyz"})).await.unwrap();

        let state = store.load().await.unwrap();
        assert_eq!(state.len(), 2);
        assert_eq!(state.get("creds"), Some(&json!({"noiseKey": "abc"})));
        assert_eq!(
            state.get("app-state-sync-key-1"),
            Some(&json!({"keyData": "xyz"}))
        );
    }

    #[tokio::test]
    async fn test_persist_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());

        store.persist("creds", &json!({"a": 1})).await.unwrap();

        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir.path()).unwrap() {
            names.push(entry.unwrap().file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["creds.json"]);
    }

    #[tokio::test]
    async fn test_apply_update_final_state_is_last_update() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());

        // A rotation sequence: each update replaces the whole creds document.
        for i in 0..5 {
            let mut files = BTreeMap::new();
            files.insert("creds".to_string(), Some(json!({"generation": i})));
            store.apply_update(&files).await.unwrap();
        }

        let state = store.load().await.unwrap();
        assert_eq!(state.get("creds"), Some(&json!({"generation": 4})));
    }

    #[tokio::test]
    async fn test_apply_update_removes_retired_documents() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());

        store.persist("app-state-sync-key-1", &json!({"keyData": "old"})).await.unwrap();

        let mut files = BTreeMap::new();
        files.insert("creds".to_string(), Some(json!({"registered": true})));
        files.insert("app-state-sync-key-1".to_string(), None);
        store.apply_update(&files).await.unwrap();

        let state = store.load().await.unwrap();
        assert_eq!(state.len(), 1);
        assert!(state.get("app-state-sync-key-1").is_none());
    }

    #[tokio::test]
    async fn test_remove_missing_document_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        store.ensure().await.unwrap();

        store.remove("never-written").await.unwrap();
    }

    #[tokio::test]
    async fn test_document_name_cannot_escape_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());

        for name in ["", "../creds", "a/b", "a\\b", ".."] {
            let result = store.persist(name, &json!({})).await;
            assert!(
                matches!(result, Err(StoreError::InvalidName(_))),
                "name {:?} should be rejected",
                name
            );
        }
    }
}
