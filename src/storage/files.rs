//! File-per-record entity store
//!
//! Layout: `<authors_dir>/<author_id>.json` and
//! `<publications_dir>/<publication_id>.json`. The presence of the file is
//! the existence check.

use crate::config::StorageConfig;
use crate::model::{is_storable_id, EntityKind};
use crate::storage::traits::{EntityStore, PutOutcome, Record, StorageError, StorageResult};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File extension of record files
pub const RECORD_EXTENSION: &str = "json";

/// Entity store keeping one JSON file per record
#[derive(Debug, Clone)]
pub struct FileStore {
    authors_dir: PathBuf,
    publications_dir: PathBuf,
}

impl FileStore {
    /// Creates a store over the given directories
    ///
    /// Directories are created lazily on the first write.
    pub fn new(authors_dir: impl Into<PathBuf>, publications_dir: impl Into<PathBuf>) -> Self {
        Self {
            authors_dir: authors_dir.into(),
            publications_dir: publications_dir.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.authors_dir, &config.publications_dir)
    }

    fn dir(&self, kind: EntityKind) -> &Path {
        match kind {
            EntityKind::Author => &self.authors_dir,
            EntityKind::Publication => &self.publications_dir,
        }
    }

    /// Returns the file a record of `kind` with `id` is stored in
    pub fn record_path(&self, kind: EntityKind, id: &str) -> PathBuf {
        self.dir(kind).join(format!("{}.{}", id, RECORD_EXTENSION))
    }
}

impl EntityStore for FileStore {
    fn exists(&self, kind: EntityKind, id: &str) -> StorageResult<bool> {
        if !is_storable_id(id) {
            return Ok(false);
        }
        let path = self.record_path(kind, id);
        path.try_exists().map_err(|e| StorageError::io(&path, e))
    }

    fn put<R: Record>(&self, record: R) -> StorageResult<PutOutcome> {
        let id = match record.record_id() {
            Some(id) if is_storable_id(id) => id.to_string(),
            _ => return Ok(PutOutcome::NoIdentifier),
        };

        if self.exists(R::KIND, &id)? {
            return Ok(PutOutcome::AlreadyPresent);
        }

        let dir = self.dir(R::KIND);
        fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;

        let path = self.record_path(R::KIND, &id);
        let bytes = serde_json::to_vec_pretty(&record.sanitized())
            .map_err(|e| StorageError::serialization(&path, e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StorageError::io(dir, e))?;
        tmp.write_all(&bytes)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| StorageError::io(tmp.path(), e))?;

        // No-clobber persist is the check-and-set: whoever links first wins
        match tmp.persist_noclobber(&path) {
            Ok(_) => {
                sync_dir(dir)?;
                tracing::trace!("Wrote {} record {}", R::KIND, id);
                Ok(PutOutcome::Written)
            }
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(PutOutcome::AlreadyPresent),
            Err(e) => Err(StorageError::io(&path, e.error)),
        }
    }

    fn get<R: Record>(&self, id: &str) -> StorageResult<Option<R>> {
        if !is_storable_id(id) {
            return Ok(None);
        }
        let path = self.record_path(R::KIND, id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(&path, e)),
        };
        let record = serde_json::from_slice(&bytes).map_err(|e| StorageError::serialization(&path, e))?;
        Ok(Some(record))
    }

    fn ids(&self, kind: EntityKind) -> StorageResult<Vec<String>> {
        let dir = self.dir(kind);
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(dir, e)),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StorageError::io(dir, e))?.path();
            // Skips leftover temp files, which carry no extension
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// Flushes directory metadata so a completed rename survives power loss
#[cfg(unix)]
pub(crate) fn sync_dir(dir: &Path) -> StorageResult<()> {
    fs::File::open(dir)
        .and_then(|handle| handle.sync_all())
        .map_err(|e| StorageError::io(dir, e))
}

#[cfg(not(unix))]
pub(crate) fn sync_dir(_dir: &Path) -> StorageResult<()> {
    Ok(())
}
