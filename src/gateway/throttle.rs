//! Request throttle
//!
//! Bounds how many requests are in flight at once and enforces a minimum
//! spacing between request starts. The crawler itself is sequential; the
//! throttle keeps the provider protected regardless of caller parallelism.

use crate::gateway::traits::{FetchError, FetchResult};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

/// Held for the duration of one request
pub struct ThrottlePermit {
    _permit: OwnedSemaphorePermit,
}

/// Concurrency and rate limiter shared by all requests to one provider
pub struct Throttle {
    permits: Arc<Semaphore>,
    min_interval: Duration,
    next_start: Mutex<Option<Instant>>,
}

impl Throttle {
    /// Creates a throttle
    ///
    /// # Arguments
    ///
    /// * `max_concurrent` - Maximum requests in flight (at least 1)
    /// * `min_interval` - Minimum time between two request starts
    pub fn new(max_concurrent: usize, min_interval: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            min_interval,
            next_start: Mutex::new(None),
        }
    }

    /// Waits until a request may start
    pub async fn acquire(&self) -> FetchResult<ThrottlePermit> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| FetchError::ThrottleClosed)?;

        let wait = self.reserve_slot(Instant::now());
        if !wait.is_zero() {
            tracing::trace!("Throttling request for {:?}", wait);
            tokio::time::sleep(wait).await;
        }

        Ok(ThrottlePermit { _permit: permit })
    }

    /// Claims the next start slot and returns how long until it opens
    fn reserve_slot(&self, now: Instant) -> Duration {
        let mut next_start = self
            .next_start
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let start = match *next_start {
            Some(slot) if slot > now => slot,
            _ => now,
        };
        *next_start = Some(start + self.min_interval);
        start - now
    }

    #[cfg(test)]
    fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }
}
