use crate::model::Publication;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable provider identifier for an author
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorId(pub String);

impl AuthorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A researcher as known to the data source
///
/// A search candidate carries only `id` and `name`; enrichment fills in
/// `interests` and the full `publications` list. The list is never written to
/// the entity store, since publications are persisted on their own and
/// relinked by identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affiliations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interests: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub publications: Vec<Publication>,
}

impl Author {
    /// Creates a search-candidate author with no detail
    pub fn candidate(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: AuthorId::new(id),
            name: name.into(),
            affiliations: Vec::new(),
            interests: Vec::new(),
            publications: Vec::new(),
        }
    }

    /// Returns the persisted form of this author (publication list dropped)
    pub fn sanitized(mut self) -> Self {
        self.publications.clear();
        self
    }

    /// Takes the publication list, tagging every entry with this author as owner
    pub fn take_owned_publications(&mut self) -> Vec<Publication> {
        let owner = self.id.clone();
        std::mem::take(&mut self.publications)
            .into_iter()
            .map(|mut publication| {
                publication.set_author(owner.clone());
                publication
            })
            .collect()
    }
}
