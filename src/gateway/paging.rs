//! Lazy sequences over paginated listing endpoints
//!
//! A `Paginated` cursor fetches a page only once its buffer is drained, so a
//! caller that stops early (first author candidate, capped citation list)
//! never pays for pages it does not read.

use crate::gateway::traits::{FetchGateway, FetchResult, Page};
use crate::model::{Author, Publication, PublicationId};
use async_trait::async_trait;
use std::collections::VecDeque;

/// A listing that can be read one page at a time
#[async_trait]
pub trait PageSource: Send {
    type Item: Send;

    async fn fetch_page(&self, offset: usize) -> FetchResult<Page<Self::Item>>;
}

/// Lazy, possibly unbounded cursor over a `PageSource`
pub struct Paginated<S: PageSource> {
    source: S,
    buffer: VecDeque<S::Item>,
    next_offset: Option<usize>,
    pages_fetched: usize,
}

impl<S: PageSource> Paginated<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            buffer: VecDeque::new(),
            next_offset: Some(0),
            pages_fetched: 0,
        }
    }

    /// Returns the next item, fetching another page when needed
    pub async fn next(&mut self) -> FetchResult<Option<S::Item>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }

            let offset = match self.next_offset {
                Some(offset) => offset,
                None => return Ok(None),
            };

            let page = self.source.fetch_page(offset).await?;
            self.pages_fetched += 1;

            // A next offset that does not advance would refetch forever
            self.next_offset = match page.next_offset {
                Some(next) if next > offset && !page.items.is_empty() => Some(next),
                _ => None,
            };
            self.buffer.extend(page.items);
        }
    }

    /// Number of pages requested from the source so far
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }
}

/// Author candidates for a name query
pub struct AuthorSearch<'g, G: FetchGateway + ?Sized> {
    gateway: &'g G,
    name: String,
}

#[async_trait]
impl<'g, G: FetchGateway + ?Sized> PageSource for AuthorSearch<'g, G> {
    type Item = Author;

    async fn fetch_page(&self, offset: usize) -> FetchResult<Page<Author>> {
        self.gateway.search_authors(&self.name, offset).await
    }
}

/// Works citing a publication
pub struct CitedBy<'g, G: FetchGateway + ?Sized> {
    gateway: &'g G,
    id: PublicationId,
}

#[async_trait]
impl<'g, G: FetchGateway + ?Sized> PageSource for CitedBy<'g, G> {
    type Item = Publication;

    async fn fetch_page(&self, offset: usize) -> FetchResult<Page<Publication>> {
        self.gateway.citing_works(&self.id, offset).await
    }
}

/// Lazy sequence of author candidates matching `name`
pub fn author_candidates<'g, G: FetchGateway + ?Sized>(
    gateway: &'g G,
    name: &str,
) -> Paginated<AuthorSearch<'g, G>> {
    Paginated::new(AuthorSearch {
        gateway,
        name: name.to_string(),
    })
}

/// Lazy, unbounded sequence of works citing `id`
///
/// The sequence does not cap itself; the caller decides how much to read.
pub fn cited_by<'g, G: FetchGateway + ?Sized>(
    gateway: &'g G,
    id: &PublicationId,
) -> Paginated<CitedBy<'g, G>> {
    Paginated::new(CitedBy {
        gateway,
        id: id.clone(),
    })
}
