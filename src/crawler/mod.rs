//! Crawler module for citation-graph expansion
//!
//! This module contains the core crawling logic:
//! - The frontier work queue (current layer plus next layer)
//! - The coordinator that expands publications and checkpoints progress

mod coordinator;
mod frontier;

pub use coordinator::{CrawlSummary, Crawler, CrawlerSettings};
pub use frontier::Frontier;

use crate::config::Config;
use crate::gateway::SemanticScholarGateway;
use crate::storage::{open_storage, FileStore};
use crate::CiteError;

/// Builds a crawler over the Semantic Scholar gateway and file storage
///
/// # Arguments
///
/// * `config` - Validated configuration
///
/// # Returns
///
/// * `Ok(Crawler)` - Ready to run
/// * `Err(CiteError)` - The gateway or fingerprint could not be built
pub fn build_crawler(config: &Config) -> Result<Crawler<SemanticScholarGateway, FileStore>, CiteError> {
    let fingerprint = config.fingerprint()?;
    let (store, checkpoint) = open_storage(&config.storage, &fingerprint);
    let gateway = SemanticScholarGateway::new(&config.provider)?;
    Ok(Crawler::new(
        gateway,
        store,
        checkpoint,
        CrawlerSettings::from(&config.crawler),
    ))
}

/// Runs a complete crawl rooted at `seed_name`
///
/// This is the main entry point. It will:
/// 1. Resolve, enrich, and persist the seed author
/// 2. Merge the author's publications with any checkpointed frontier
/// 3. Expand publications layer by layer until the frontier drains
/// 4. Remove the checkpoint
///
/// # Example
///
/// ```no_run
/// use citegraph::config::load_config_or_default;
/// use citegraph::crawler::crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config_or_default(None)?;
/// let summary = crawl(&config, "Christopher D Manning").await?;
/// println!("{}", summary);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: &Config, seed_name: &str) -> Result<CrawlSummary, CiteError> {
    build_crawler(config)?.run(seed_name).await
}
