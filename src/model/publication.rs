use crate::model::AuthorId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable provider identifier for a publication
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicationId(pub String);

impl PublicationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bibliographic detail, present only once a publication has been filled
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bibliography {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Author names as printed on the publication
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
}

/// A publication known only from a listing (author page, citing works)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublicationStub {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PublicationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cited_in: Vec<PublicationId>,
}

impl PublicationStub {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(PublicationId::new(id)),
            ..Self::default()
        }
    }

    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

/// A publication enriched with a stable identifier and bibliographic detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilledPublication {
    pub id: PublicationId,
    pub bib: Bibliography,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorId>,
    /// Identifiers of works citing this one, collected during the crawl
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cited_in: Vec<PublicationId>,
}

impl FilledPublication {
    pub fn new(id: impl Into<String>, bib: Bibliography) -> Self {
        Self {
            id: PublicationId::new(id),
            bib,
            author: None,
            cited_in: Vec::new(),
        }
    }

    /// Returns the persisted form: bibliography dropped, filled state reset
    ///
    /// Any stored publication can be refilled from the data source, so only
    /// the identifier, owner, and collected citation edges are kept.
    pub fn into_stored(self) -> PublicationStub {
        PublicationStub {
            id: Some(self.id),
            title: None,
            author: self.author,
            cited_in: self.cited_in,
        }
    }
}

/// A publication in one of its two fill states
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Publication {
    Stub(PublicationStub),
    Filled(FilledPublication),
}

impl Publication {
    pub fn id(&self) -> Option<&PublicationId> {
        match self {
            Self::Stub(stub) => stub.id.as_ref(),
            Self::Filled(filled) => Some(&filled.id),
        }
    }

    pub fn author(&self) -> Option<&AuthorId> {
        match self {
            Self::Stub(stub) => stub.author.as_ref(),
            Self::Filled(filled) => filled.author.as_ref(),
        }
    }

    pub fn set_author(&mut self, author: AuthorId) {
        match self {
            Self::Stub(stub) => stub.author = Some(author),
            Self::Filled(filled) => filled.author = Some(author),
        }
    }

    /// Best available title, used for logging
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Stub(stub) => stub.title.as_deref(),
            Self::Filled(filled) => Some(filled.bib.title.as_str()),
        }
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Self::Filled(_))
    }

    /// Returns the persisted form of this publication
    pub fn sanitized(self) -> Self {
        match self {
            Self::Stub(mut stub) => {
                stub.title = None;
                Self::Stub(stub)
            }
            Self::Filled(filled) => Self::Stub(filled.into_stored()),
        }
    }
}

impl From<PublicationStub> for Publication {
    fn from(stub: PublicationStub) -> Self {
        Self::Stub(stub)
    }
}

impl From<FilledPublication> for Publication {
    fn from(filled: FilledPublication) -> Self {
        Self::Filled(filled)
    }
}
