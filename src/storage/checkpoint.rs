//! Frontier checkpoint
//!
//! A single JSON file holding the ordered list of publications still waiting
//! to be expanded. Absence of the file means there is no pending work.

use crate::model::Publication;
use crate::storage::files::sync_dir;
use crate::storage::traits::{StorageError, StorageResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Current on-disk checkpoint format
const CHECKPOINT_VERSION: u32 = 1;

#[derive(Serialize)]
struct CheckpointOut<'a> {
    version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    fingerprint: Option<&'a str>,
    saved_at: DateTime<Utc>,
    pending: Vec<&'a Publication>,
}

#[derive(Deserialize)]
struct CheckpointIn {
    version: u32,
    #[serde(default)]
    fingerprint: Option<String>,
    saved_at: DateTime<Utc>,
    pending: Vec<Publication>,
}

/// The durable resume point of a crawl
#[derive(Debug, Clone)]
pub struct FrontierCheckpoint {
    path: PathBuf,
    fingerprint: Option<String>,
}

impl FrontierCheckpoint {
    /// Creates a checkpoint handle for the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fingerprint: None,
        }
    }

    /// Stamps saved checkpoints with a configuration fingerprint
    ///
    /// Loading a checkpoint stamped with a different fingerprint only logs a
    /// warning; the pending list is still returned.
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> StorageResult<bool> {
        self.path
            .try_exists()
            .map_err(|e| StorageError::io(&self.path, e))
    }

    /// Atomically replaces the checkpoint with `pending`
    pub fn save<'a, I>(&self, pending: I) -> StorageResult<()>
    where
        I: IntoIterator<Item = &'a Publication>,
    {
        let snapshot = CheckpointOut {
            version: CHECKPOINT_VERSION,
            fingerprint: self.fingerprint.as_deref(),
            saved_at: Utc::now(),
            pending: pending.into_iter().collect(),
        };
        let bytes =
            serde_json::to_vec(&snapshot).map_err(|e| StorageError::serialization(&self.path, e))?;

        let dir = self.parent_dir();
        fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StorageError::io(dir, e))?;
        tmp.write_all(&bytes)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| StorageError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| StorageError::io(&self.path, e.error))?;
        sync_dir(dir)?;

        tracing::trace!(
            "Checkpointed {} pending publications to {}",
            snapshot.pending.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Returns the last saved frontier, or an empty one if none exists
    pub fn load(&self) -> StorageResult<Vec<Publication>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        let checkpoint: CheckpointIn =
            serde_json::from_slice(&bytes).map_err(|e| StorageError::serialization(&self.path, e))?;

        if checkpoint.version != CHECKPOINT_VERSION {
            return Err(StorageError::Corrupt {
                path: self.path.clone(),
                reason: format!(
                    "unsupported checkpoint version {} (expected {})",
                    checkpoint.version, CHECKPOINT_VERSION
                ),
            });
        }

        if let (Some(expected), Some(found)) = (&self.fingerprint, &checkpoint.fingerprint) {
            if expected != found {
                tracing::warn!(
                    "Checkpoint {} was written under a different configuration; resuming anyway",
                    self.path.display()
                );
            }
        }

        tracing::debug!(
            "Loaded {} pending publications saved at {}",
            checkpoint.pending.len(),
            checkpoint.saved_at.to_rfc3339()
        );
        Ok(checkpoint.pending)
    }

    /// Removes the checkpoint; a missing file is not an error
    pub fn clear(&self) -> StorageResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(&self.path, e)),
        }
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}
