//! Storage traits and error types
//!
//! This module defines the trait interface for entity store backends and
//! the associated error types.

use crate::model::{Author, EntityKind, Publication};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error at {}: {source}", path.display())]
    Serialization {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Corrupt file at {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn serialization(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Serialization {
            path: path.into(),
            source,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// What a `put` actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// The record was new and has been durably written
    Written,
    /// A record with this identifier already existed; nothing was changed
    AlreadyPresent,
    /// The record has no stable identifier to key by; nothing was written
    NoIdentifier,
}

impl PutOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written)
    }
}

/// An entity that can be kept in an `EntityStore`
pub trait Record: Serialize + DeserializeOwned {
    /// Which keyspace the record belongs to
    const KIND: EntityKind;

    /// The stable identifier, if the record has one
    fn record_id(&self) -> Option<&str>;

    /// Reduces the record to its persisted form
    fn sanitized(self) -> Self;
}

impl Record for Author {
    const KIND: EntityKind = EntityKind::Author;

    fn record_id(&self) -> Option<&str> {
        Some(self.id.as_str())
    }

    fn sanitized(self) -> Self {
        Author::sanitized(self)
    }
}

impl Record for Publication {
    const KIND: EntityKind = EntityKind::Publication;

    fn record_id(&self) -> Option<&str> {
        self.id().map(|id| id.as_str())
    }

    fn sanitized(self) -> Self {
        Publication::sanitized(self)
    }
}

/// Trait for entity store implementations
///
/// The store doubles as the crawl's visited set: a publication whose record
/// exists has already been expanded and must not be expanded again.
pub trait EntityStore {
    /// Returns true iff a record for `kind` and `id` has been durably written
    fn exists(&self, kind: EntityKind, id: &str) -> StorageResult<bool>;

    /// Writes the sanitized record iff none exists for its identifier
    ///
    /// An existing record is never overwritten. The existence check and the
    /// write form a single atomic step, so concurrent writers cannot both
    /// observe `Written` for the same identifier.
    fn put<R: Record>(&self, record: R) -> StorageResult<PutOutcome>;

    /// Reads a stored record back
    fn get<R: Record>(&self, id: &str) -> StorageResult<Option<R>>;

    /// Lists the identifiers stored for `kind`, sorted
    fn ids(&self, kind: EntityKind) -> StorageResult<Vec<String>>;

    /// Counts the records stored for `kind`
    fn count(&self, kind: EntityKind) -> StorageResult<usize> {
        Ok(self.ids(kind)?.len())
    }
}
