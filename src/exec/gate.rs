// src/exec/gate.rs

//! Bounded-parallelism gate.
//!
//! A thin wrapper around `tokio::sync::Semaphore` that refuses a capacity
//! of zero (which could never hand out a permit) and keeps in-flight / peak
//! counters for diagnostics.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::trace;

use crate::errors::{GcmdError, Result};

#[derive(Debug, Default)]
struct Counters {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

/// Counting gate with a fixed number of slots.
#[derive(Debug)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    counters: Arc<Counters>,
}

impl ConcurrencyGate {
    /// Create a gate with `capacity` slots. `capacity` must be at least 1.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(GcmdError::ConfigError(
                "concurrency gate capacity must be >= 1 (got 0)".to_string(),
            ));
        }
        if capacity > Semaphore::MAX_PERMITS {
            return Err(GcmdError::ConfigError(format!(
                "concurrency gate capacity {} exceeds the maximum of {}",
                capacity,
                Semaphore::MAX_PERMITS
            )));
        }

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            counters: Arc::new(Counters::default()),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of permits currently held.
    pub fn in_flight(&self) -> usize {
        self.counters.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of permits held at the same time so far.
    pub fn peak(&self) -> usize {
        self.counters.peak.load(Ordering::SeqCst)
    }

    /// Wait for a free slot.
    ///
    /// The slot is released when the returned permit is dropped.
    pub async fn acquire(&self) -> Result<GatePermit> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| GcmdError::Other(e.into()))?;

        let now = self.counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.peak.fetch_max(now, Ordering::SeqCst);
        trace!(in_flight = now, capacity = self.capacity, "gate slot acquired");

        Ok(GatePermit {
            _permit: permit,
            counters: Arc::clone(&self.counters),
        })
    }
}

/// One held slot of a [`ConcurrencyGate`].
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
    counters: Arc<Counters>,
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        // Decrement before the semaphore permit is returned (fields drop
        // after this body) so `in_flight` never exceeds capacity.
        self.counters.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
