//! Crawler coordinator - citation-graph expansion
//!
//! This module contains the main crawl loop, which:
//! - Resolves and persists the seed author
//! - Merges the seed author's publications with any checkpointed frontier
//! - Expands publications one at a time, layer by layer
//! - Checkpoints the pending frontier after every publication
//! - Clears the checkpoint once the frontier drains

use crate::config::CrawlerConfig;
use crate::crawler::frontier::Frontier;
use crate::gateway::{author_candidates, cited_by, FetchGateway};
use crate::model::{is_storable_id, Author, EntityKind, FilledPublication, Publication};
use crate::storage::{EntityStore, FrontierCheckpoint};
use crate::CiteError;
use std::fmt;
use std::time::Instant;

/// Traversal settings, resolved from configuration at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlerSettings {
    /// Maximum citing works consumed per publication; 0 means uncapped
    pub citations_per_publication_limit: usize,
}

impl From<&CrawlerConfig> for CrawlerSettings {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            citations_per_publication_limit: config.citations_per_publication_limit,
        }
    }
}

/// Counters describing one crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Layers that had at least one publication to look at
    pub layers: usize,
    /// Publications whose citing works were fetched and which were persisted
    pub expanded: usize,
    /// Publications skipped because they were already in the store
    pub already_known: usize,
    /// Publications dropped because they never gained a stable identifier
    pub unidentified: usize,
    /// Citing works appended to the frontier
    pub enqueued: usize,
    /// Author records newly written
    pub authors_written: usize,
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} layers, {} expanded, {} already known, {} unidentified, {} enqueued, {} new authors",
            self.layers,
            self.expanded,
            self.already_known,
            self.unidentified,
            self.enqueued,
            self.authors_written
        )
    }
}

/// Main crawler structure
pub struct Crawler<G, S> {
    gateway: G,
    store: S,
    checkpoint: FrontierCheckpoint,
    settings: CrawlerSettings,
}

impl<G: FetchGateway, S: EntityStore> Crawler<G, S> {
    /// Creates a new crawler
    ///
    /// # Arguments
    ///
    /// * `gateway` - The data source
    /// * `store` - Entity store, also used as the visited set
    /// * `checkpoint` - Durable slot for the pending frontier
    /// * `settings` - Traversal settings
    pub fn new(gateway: G, store: S, checkpoint: FrontierCheckpoint, settings: CrawlerSettings) -> Self {
        Self {
            gateway,
            store,
            checkpoint,
            settings,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn checkpoint(&self) -> &FrontierCheckpoint {
        &self.checkpoint
    }

    /// Crawls the citation graph rooted at the author best matching `seed_name`
    ///
    /// The author is resolved (first candidate), enriched, and persisted;
    /// their publications then seed the frontier, merged with any frontier
    /// left behind by an interrupted run.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSummary)` - The frontier drained and the checkpoint was removed
    /// * `Err(CiteError)` - A fetch or storage step failed; the checkpoint is
    ///   left as of the last completed publication
    pub async fn run(&self, seed_name: &str) -> Result<CrawlSummary, CiteError> {
        let mut author = self.seed_author(seed_name).await?;

        tracing::info!("Author: {} ({})", author.name, author.id);
        if !author.interests.is_empty() {
            tracing::info!("Interests: {}", author.interests.join(", "));
        }
        tracing::info!("Publications: {}", author.publications.len());

        let seeds = author.take_owned_publications();
        let author_written = self.store.put(author)?.is_written();

        let mut summary = self.crawl_frontier(seeds).await?;
        if author_written {
            summary.authors_written += 1;
        }
        Ok(summary)
    }

    /// Resolves the first author candidate for `name` and enriches it
    pub async fn seed_author(&self, name: &str) -> Result<Author, CiteError> {
        let mut candidates = author_candidates(&self.gateway, name);
        let candidate = candidates
            .next()
            .await?
            .ok_or_else(|| CiteError::AuthorNotFound {
                name: name.to_string(),
            })?;
        Ok(self.gateway.enrich_author(candidate).await?)
    }

    /// Expands `seeds` plus any checkpointed frontier until nothing is left
    ///
    /// Seeds are expected to carry their owning author already.
    pub async fn crawl_frontier(&self, seeds: Vec<Publication>) -> Result<CrawlSummary, CiteError> {
        let resumed = self.checkpoint.load()?;
        if !resumed.is_empty() {
            tracing::info!(
                "Resuming {} pending publications from {}",
                resumed.len(),
                self.checkpoint.path().display()
            );
        }

        let mut frontier = Frontier::seeded(seeds, resumed);
        let mut summary = CrawlSummary::default();
        let start_time = Instant::now();

        while frontier.advance() {
            summary.layers += 1;
            tracing::info!(
                "Layer {}: {} publications to examine",
                frontier.layer(),
                frontier.current_len()
            );

            while let Some(publication) = frontier.pop() {
                // Skipped items leave the frontier as the last save describes it
                if self.expand(publication, &mut frontier, &mut summary).await? {
                    self.checkpoint.save(frontier.pending())?;
                }
            }
        }

        self.checkpoint.clear()?;
        tracing::info!(
            "Crawl completed in {:?}: {}",
            start_time.elapsed(),
            summary
        );
        Ok(summary)
    }

    /// Expands a single publication
    ///
    /// 1. Skips it if already stored
    /// 2. Fills it if it is a stub, dropping it if it stays unidentified
    /// 3. Resolves its owning author if unknown
    /// 4. Skips it if filling revealed an already-stored identifier
    /// 5. Queues at most `limit` identified citing works
    /// 6. Persists it (write-once)
    ///
    /// Returns true if the publication was expanded, false if it was skipped.
    async fn expand(
        &self,
        publication: Publication,
        frontier: &mut Frontier,
        summary: &mut CrawlSummary,
    ) -> Result<bool, CiteError> {
        if let Some(id) = publication.id() {
            if self.store.exists(EntityKind::Publication, id.as_str())? {
                tracing::debug!("Already stored, skipping {}", id);
                summary.already_known += 1;
                return Ok(false);
            }
        }

        let mut filled = match self.fill(publication).await? {
            Some(filled) => filled,
            None => {
                summary.unidentified += 1;
                return Ok(false);
            }
        };

        if filled.author.is_none() {
            match self.gateway.resolve_author_for_publication(&filled).await? {
                Some(author) => {
                    filled.author = Some(author.id.clone());
                    if self.store.put(author)?.is_written() {
                        summary.authors_written += 1;
                    }
                }
                None => tracing::debug!("No author resolved for {}", filled.id),
            }
        }

        if self.store.exists(EntityKind::Publication, filled.id.as_str())? {
            tracing::debug!("Already stored, skipping {}", filled.id);
            summary.already_known += 1;
            return Ok(false);
        }

        tracing::info!("----- {} -----", filled.bib.title);

        let limit = self.settings.citations_per_publication_limit;
        let mut citing = cited_by(&self.gateway, &filled.id);
        let mut consumed = 0;
        while limit == 0 || consumed < limit {
            let work = match citing.next().await? {
                Some(work) => work,
                None => break,
            };
            consumed += 1;

            if let Some(id) = work.id().filter(|id| is_storable_id(id.as_str())).cloned() {
                tracing::debug!("Cited by {} ({})", work.title().unwrap_or("untitled"), id);
                filled.cited_in.push(id);
                frontier.push_next(work);
                summary.enqueued += 1;
            }
        }
        tracing::debug!(
            "{} citing works consumed, {} queued for {}",
            consumed,
            filled.cited_in.len(),
            filled.id
        );

        self.store.put(Publication::Filled(filled))?;
        summary.expanded += 1;
        Ok(true)
    }

    /// Returns the filled form of `publication`, or None if it has no
    /// identifier the store can key by
    async fn fill(&self, publication: Publication) -> Result<Option<FilledPublication>, CiteError> {
        let publication = match publication {
            filled @ Publication::Filled(_) => filled,
            stub => self.gateway.enrich_publication(stub).await?,
        };

        match publication {
            Publication::Filled(filled) if is_storable_id(filled.id.as_str()) => Ok(Some(filled)),
            Publication::Filled(filled) => {
                tracing::debug!("Dropping publication with unstorable identifier: {}", filled.id);
                Ok(None)
            }
            Publication::Stub(stub) => {
                tracing::debug!(
                    "Dropping publication without stable identifier: {}",
                    stub.title.as_deref().unwrap_or("untitled")
                );
                Ok(None)
            }
        }
    }
}
