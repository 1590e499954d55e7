//! Gateway trait and error types

use crate::gateway::paging::author_candidates;
use crate::model::{Author, FilledPublication, Publication, PublicationId};
use async_trait::async_trait;
use thiserror::Error;

/// Errors returned by the data source
///
/// All of these abort the current crawl step. Because the frontier is
/// checkpointed after every publication, rerunning after any of them loses
/// no discovered state.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Rate limited by provider at {url}")]
    RateLimited { url: String },

    #[error("Unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("Request throttle closed")]
    ThrottleClosed,
}

impl FetchError {
    /// Returns true if retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { source, .. } => !source.is_builder() && !source.is_decode(),
            Self::Timeout { .. } | Self::RateLimited { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Decode { .. } | Self::InvalidUrl(_) | Self::NotFound { .. } => false,
            Self::ThrottleClosed => false,
        }
    }
}

/// Result type for gateway operations
pub type FetchResult<T> = Result<T, FetchError>;

/// One page of a listing endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Offset of the following page, `None` on the last page
    pub next_offset: Option<usize>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_offset: Option<usize>) -> Self {
        Self { items, next_offset }
    }

    /// A page with nothing after it
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }
}

/// Interface to the external data source
///
/// Implementations should treat the source as unreliable and rate-limited:
/// bound request concurrency, impose timeouts, and surface hangs as
/// `FetchError::Timeout` rather than blocking.
#[async_trait]
pub trait FetchGateway: Send + Sync {
    /// Returns one page of author candidates matching `name`
    async fn search_authors(&self, name: &str, offset: usize) -> FetchResult<Page<Author>>;

    /// Fills in interests and the full publication list
    async fn enrich_author(&self, author: Author) -> FetchResult<Author>;

    /// Fills in bibliographic fields and the stable identifier
    ///
    /// Returns a `Filled` publication on success. A publication the source
    /// cannot resolve comes back as the original `Stub`. Already-filled
    /// publications are returned unchanged.
    async fn enrich_publication(&self, publication: Publication) -> FetchResult<Publication>;

    /// Returns one page of works citing `id`, in provider order
    async fn citing_works(&self, id: &PublicationId, offset: usize) -> FetchResult<Page<Publication>>;

    /// Best-effort owner lookup for a publication found via citation-following
    ///
    /// Takes the first candidate matching the first bibliographic author
    /// name and enriches it. Common names may resolve to the wrong person;
    /// no disambiguation is attempted.
    async fn resolve_author_for_publication(
        &self,
        publication: &FilledPublication,
    ) -> FetchResult<Option<Author>> {
        let name = match publication.bib.authors.first() {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => return Ok(None),
        };

        let mut candidates = author_candidates(self, &name);
        match candidates.next().await? {
            Some(candidate) => Ok(Some(self.enrich_author(candidate).await?)),
            None => Ok(None),
        }
    }
}
