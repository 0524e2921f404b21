//! File-backed session store with atomic document replacement.

use crate::error::StoreError;
use crate::types::CredentialState;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument};

/// Durable store for one account's credential material.
///
/// Each document lives in its own `<name>.json` file under the session
/// directory. Writes go through a temp file + rename so a crash between
/// two updates never leaves a half-written document behind.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Create a store rooted at the given session directory.
    ///
    /// The directory is not touched until [`SessionStore::ensure`] runs.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The session directory this store persists into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the session directory if it does not exist yet.
    ///
    /// Idempotent and safe to call concurrently for the same directory.
    pub async fn ensure(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).await?;
        debug!(dir = %self.dir.display(), "session directory ready");
        Ok(())
    }

    /// Load all persisted documents, or empty state if nothing exists yet.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<CredentialState, StoreError> {
        let mut state = CredentialState::new();

        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(state),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let bytes = fs::read(&path).await?;
            let doc: Value = serde_json::from_slice(&bytes)?;
            state.upsert(name, doc);
        }

        debug!(documents = state.len(), "loaded credential state");
        Ok(state)
    }

    /// Durably write one document, replacing any previous version atomically.
    pub async fn persist(&self, name: &str, doc: &Value) -> Result<(), StoreError> {
        let path = self.document_path(name)?;
        let data = serde_json::to_vec(doc)?;

        // Atomic replace: write to a temp file in the same directory, then
        // rename over the final path.
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &data).await?;
        fs::rename(&temp_path, &path).await?;

        debug!(document = name, bytes = data.len(), "persisted credential document");
        Ok(())
    }

    /// Remove one document. Removing a document that does not exist is a no-op.
    pub async fn remove(&self, name: &str) -> Result<(), StoreError> {
        let path = self.document_path(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(document = name, "removed credential document");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply one credential update, persisting every changed document in
    /// iteration order before returning. `Some` upserts a document, `None`
    /// deletes one.
    #[instrument(skip(self, files))]
    pub async fn apply_update(
        &self,
        files: &BTreeMap<String, Option<Value>>,
    ) -> Result<(), StoreError> {
        for (name, doc) in files {
            match doc {
                Some(doc) => self.persist(name, doc).await?,
                None => self.remove(name).await?,
            }
        }
        Ok(())
    }

    /// Resolve a document name to its path, rejecting names that would
    /// escape the session directory.
    fn document_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        if name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name.contains("..")
        {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", name)))
    }
}
