//! JSON-file state store so previous-cycle state survives restarts.
//!
//! All keys live in one file, a map from `UNDERLYING:kind` to
//! [`PreviousState`]. A missing or corrupt file loads as empty.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::state::{PreviousState, StateKey, StateStore};

/// Errors from state store operations.
#[derive(Error, Debug)]
pub enum StateStoreError {
    /// IO error reading/writing file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

type StateFile = BTreeMap<String, PreviousState>;

#[derive(Debug)]
pub struct FileStateStore {
    path: PathBuf,
    /// Serialises read-modify-write of the file within this process.
    lock: Mutex<()>,
}

impl FileStateStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(&self) -> StateFile {
        match self.read_internal().await {
            Ok(states) => states,
            Err(StateStoreError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No state file found, starting fresh");
                StateFile::new()
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read state file, starting fresh"
                );
                StateFile::new()
            }
        }
    }

    async fn read_internal(&self) -> Result<StateFile, StateStoreError> {
        let raw = fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&raw)?)
    }

    async fn write_file(&self, states: &StateFile) -> Result<(), StateStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_vec_pretty(states)?;
        fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Removes the state file if it exists.
    pub async fn clear(&self) -> Result<(), StateStoreError> {
        let _guard = self.lock.lock().await;
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                info!(path = %self.path.display(), "Cleared state file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self, key: &StateKey) -> Result<Option<PreviousState>, StateStoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_file().await.remove(&key.to_string()))
    }

    async fn save(&self, key: &StateKey, state: &PreviousState) -> Result<(), StateStoreError> {
        let _guard = self.lock.lock().await;
        let mut states = self.read_file().await;
        states.insert(key.to_string(), state.clone());
        self.write_file(&states).await?;

        debug!(
            path = %self.path.display(),
            %key,
            alerts = state.alerts.len(),
            "Saved previous state"
        );
        Ok(())
    }
}
