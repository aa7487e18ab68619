//! File-backed conversation history store.
//!
//! One JSON record per session key, holding the full ordered history. Reads
//! and writes replace whole records; there is no expiry, size cap, or
//! locking. Callers are serialized by the dispatch loop, so two calls can
//! never race on the same key within one process.
//!
//! Failures never reach the tool caller: a missing or corrupt record loads
//! as an empty history, and a failed write is logged and dropped.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::record_path::record_path;
use crate::models::conversation::ConversationHistory;
use crate::{AppError, Result};

/// Durable history store rooted at a single directory.
#[derive(Debug, Clone)]
pub struct ContextStore {
    dir: PathBuf,
}

impl ContextStore {
    /// Create a store that keeps records in `dir`.
    ///
    /// The directory is created lazily on first write.
    #[must_use]
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Directory holding the records.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load the history for `key`, or an empty history when there is none.
    ///
    /// Absent or blank keys, missing records, and unreadable or corrupt
    /// records all yield an empty history. Problems are logged only.
    pub async fn load(&self, key: Option<&str>) -> ConversationHistory {
        let Some(key) = key.filter(|k| !k.is_empty()) else {
            return ConversationHistory::new();
        };

        match self.try_load(key).await {
            Ok(Some(history)) => {
                debug!(session_key = key, turns = history.len(), "history loaded");
                history
            }
            Ok(None) => ConversationHistory::new(),
            Err(err) => {
                warn!(session_key = key, %err, "history unreadable, starting fresh");
                ConversationHistory::new()
            }
        }
    }

    /// Replace the stored history for `key`.
    ///
    /// No-op for an empty key. Write failures are logged and swallowed.
    pub async fn save(&self, key: &str, history: &ConversationHistory) {
        if key.is_empty() {
            return;
        }

        match self.try_save(key, history).await {
            Ok(()) => debug!(session_key = key, turns = history.len(), "history saved"),
            Err(err) => warn!(session_key = key, %err, "failed to save history"),
        }
    }

    /// Read the record for `key`, surfacing failures.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the record exists but cannot be read or
    /// does not parse as a history.
    pub async fn try_load(&self, key: &str) -> Result<Option<ConversationHistory>> {
        let path = record_path(&self.dir, key);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(AppError::Store(format!(
                    "failed to read {}: {err}",
                    path.display()
                )))
            }
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| AppError::Store(format!("corrupt record {}: {err}", path.display())))
    }

    /// Atomically replace the record for `key`, surfacing failures.
    ///
    /// The history is written to a temporary file in the same directory and
    /// renamed over the record, so readers never observe a partial write.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the directory cannot be created or the
    /// record cannot be written.
    pub async fn try_save(&self, key: &str, history: &ConversationHistory) -> Result<()> {
        let body = serde_json::to_vec_pretty(history)
            .map_err(|err| AppError::Store(format!("failed to serialize history: {err}")))?;
        let dir = self.dir.clone();
        let path = record_path(&dir, key);

        tokio::task::spawn_blocking(move || write_atomically(&dir, &path, &body))
            .await
            .map_err(|err| AppError::Store(format!("history writer task failed: {err}")))?
    }
}

fn write_atomically(dir: &Path, path: &Path, body: &[u8]) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|err| {
        AppError::Store(format!("failed to create {}: {err}", dir.display()))
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|err| AppError::Store(format!("failed to create temp record: {err}")))?;
    temp.write_all(body)
        .and_then(|()| temp.flush())
        .map_err(|err| AppError::Store(format!("failed to write temp record: {err}")))?;
    temp.persist(path).map_err(|err| {
        AppError::Store(format!("failed to replace {}: {}", path.display(), err.error))
    })?;
    Ok(())
}
