//! Statistics over the entity store and checkpoint
//!
//! This module provides functionality for summarizing what a crawl has
//! persisted so far, without contacting the data source.

use crate::model::{EntityKind, Publication};
use crate::storage::{EntityStore, FrontierCheckpoint};
use crate::CiteError;

/// Store statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStatistics {
    /// Number of stored author records
    pub authors: usize,

    /// Number of stored publication records
    pub publications: usize,

    /// Stored publications with a known owning author
    pub attributed: usize,

    /// Total "cited by" edges recorded across stored publications
    pub citation_edges: usize,

    /// Publications waiting in the checkpoint, if any
    pub pending: usize,
}

/// Loads statistics from the store and checkpoint
///
/// # Arguments
///
/// * `store` - The entity store to scan
/// * `checkpoint` - The checkpoint to count pending work from
///
/// # Returns
///
/// * `Ok(StoreStatistics)` - Successfully loaded statistics
/// * `Err(CiteError)` - A record or the checkpoint could not be read
pub fn load_statistics<S: EntityStore>(
    store: &S,
    checkpoint: &FrontierCheckpoint,
) -> Result<StoreStatistics, CiteError> {
    let mut stats = StoreStatistics {
        authors: store.count(EntityKind::Author)?,
        ..StoreStatistics::default()
    };

    for id in store.ids(EntityKind::Publication)? {
        let publication: Publication = match store.get(&id)? {
            Some(publication) => publication,
            None => continue,
        };
        stats.publications += 1;
        if publication.author().is_some() {
            stats.attributed += 1;
        }
        stats.citation_edges += match &publication {
            Publication::Stub(stub) => stub.cited_in.len(),
            Publication::Filled(filled) => filled.cited_in.len(),
        };
    }

    stats.pending = checkpoint.load()?.len();
    Ok(stats)
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Store Statistics ===\n");

    println!("Overview:");
    println!("  Authors stored: {}", stats.authors);
    println!("  Publications stored: {}", stats.publications);
    println!("  Citation edges recorded: {}", stats.citation_edges);
    println!();

    let attributed_rate = if stats.publications > 0 {
        (stats.attributed as f64 / stats.publications as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Attributed: {:.1}% ({} / {} publications with a known author)",
        attributed_rate, stats.attributed, stats.publications
    );

    if stats.pending > 0 {
        println!(
            "Pending: {} publications in checkpoint (crawl can be resumed)",
            stats.pending
        );
    } else {
        println!("Pending: none");
    }
}
