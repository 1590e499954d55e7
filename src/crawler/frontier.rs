//! In-memory work queue for layer-by-layer expansion
//!
//! The frontier is a flat sequence, not a set: duplicates are allowed and
//! resolved when dequeued, by the entity store's existence check.

use crate::model::Publication;
use std::collections::VecDeque;

/// Current layer plus the next layer being collected
#[derive(Debug, Default)]
pub struct Frontier {
    current: VecDeque<Publication>,
    next: Vec<Publication>,
    /// The seed layer is re-derived from the seed author on every start,
    /// so it is never written to the checkpoint
    seed_layer: bool,
    layer: usize,
}

impl Frontier {
    /// Starts a crawl: `seeds` form the first layer, `resumed` (a loaded
    /// checkpoint) is queued behind them for the second
    pub fn seeded(seeds: Vec<Publication>, resumed: Vec<Publication>) -> Self {
        Self {
            current: seeds.into(),
            next: resumed,
            seed_layer: true,
            layer: 1,
        }
    }

    /// Takes the next publication of the current layer
    pub fn pop(&mut self) -> Option<Publication> {
        self.current.pop_front()
    }

    /// Queues a publication for the next layer
    pub fn push_next(&mut self, publication: Publication) {
        self.next.push(publication);
    }

    /// Promotes the next layer to current
    ///
    /// Returns false when there is nothing left to expand.
    pub fn advance(&mut self) -> bool {
        if !self.current.is_empty() {
            return true;
        }
        if self.next.is_empty() {
            return false;
        }
        self.current = std::mem::take(&mut self.next).into();
        self.seed_layer = false;
        self.layer += 1;
        true
    }

    /// Everything that must survive a restart, in processing order
    pub fn pending(&self) -> impl Iterator<Item = &Publication> {
        let skip = if self.seed_layer { self.current.len() } else { 0 };
        self.current.iter().skip(skip).chain(self.next.iter())
    }

    /// One-based index of the current layer
    pub fn layer(&self) -> usize {
        self.layer
    }

    pub fn current_len(&self) -> usize {
        self.current.len()
    }

    #[cfg(test)]
    fn next_len(&self) -> usize {
        self.next.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.current.is_empty() && self.next.is_empty()
    }
}
