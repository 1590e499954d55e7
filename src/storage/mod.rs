//! Storage module for persisting crawl data
//!
//! This module handles everything the crawler writes to disk:
//! - The entity store: one record file per author and per publication,
//!   written at most once per identifier
//! - The frontier checkpoint: the single file holding pending work, which
//!   lets an interrupted crawl resume
//!
//! Both write through a temp file in the destination directory followed by
//! an atomic rename, so a crash never leaves a half-written record or
//! checkpoint under its final name.

mod checkpoint;
mod files;
mod traits;

pub use checkpoint::FrontierCheckpoint;
pub use files::{FileStore, RECORD_EXTENSION};
pub use traits::{EntityStore, PutOutcome, Record, StorageError, StorageResult};

use crate::config::StorageConfig;

/// Opens the entity store and checkpoint described by `config`
///
/// # Arguments
///
/// * `config` - Storage locations
/// * `fingerprint` - Fingerprint stamped into checkpoints written from here on
pub fn open_storage(config: &StorageConfig, fingerprint: &str) -> (FileStore, FrontierCheckpoint) {
    let store = FileStore::from_config(config);
    let checkpoint = FrontierCheckpoint::new(&config.checkpoint_path).with_fingerprint(fingerprint);
    (store, checkpoint)
}
