//! Record types for the citation graph
//!
//! This module defines the entities the crawler discovers and persists:
//!
//! - `Author`: a researcher resolved from the data source
//! - `Publication`: a two-state record, either a `Stub` (identifier-less or
//!   detail-less) or `Filled` (stable identifier plus bibliographic fields)
//!
//! Across the Author/Publication boundary only identifiers are stored, so the
//! persisted form never contains a reference cycle.

mod author;
mod publication;

pub use author::{Author, AuthorId};
pub use publication::{Bibliography, FilledPublication, Publication, PublicationId, PublicationStub};

use std::fmt;

/// The kinds of entity kept in the entity store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Author,
    Publication,
}

impl EntityKind {
    /// Returns a short lowercase label, used in logs and stats output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Publication => "publication",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true if `id` can safely be used as a record file stem
///
/// Identifiers come from an external provider, so anything that could escape
/// the record directory is rejected.
pub fn is_storable_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\', '\0'])
}
