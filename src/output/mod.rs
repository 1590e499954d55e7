//! Output module for inspecting persisted crawl data
//!
//! This module handles:
//! - Summarizing the entity store and checkpoint (`--stats`)
//! - Dumping stored publication records as JSON lines (`--dump`)

pub mod stats;

pub use stats::{load_statistics, print_statistics, StoreStatistics};

use crate::model::{EntityKind, Publication};
use crate::storage::EntityStore;
use crate::CiteError;
use std::io::Write;

/// Writes every stored publication as one JSON document per line
///
/// Records are written in identifier order.
///
/// # Arguments
///
/// * `store` - The entity store to read from
/// * `out` - Destination for the JSON lines
///
/// # Returns
///
/// * `Ok(usize)` - Number of records written
/// * `Err(CiteError)` - A record could not be read or written
pub fn dump_publications<S: EntityStore, W: Write>(store: &S, out: &mut W) -> Result<usize, CiteError> {
    let mut written = 0;
    for id in store.ids(EntityKind::Publication)? {
        if let Some(publication) = store.get::<Publication>(&id)? {
            serde_json::to_writer(&mut *out, &publication)?;
            out.write_all(b"\n")?;
            written += 1;
        }
    }
    out.flush()?;
    Ok(written)
}
