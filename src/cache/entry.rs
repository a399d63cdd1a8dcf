//! Cache Entry Module
//!
//! Defines the per-key bookkeeping kept next to each cached value.

use std::time::{Duration, Instant};

use tokio::task::AbortHandle;

/// Longest key rendering written to the logs.
const MAX_LOGGED_KEY_LENGTH: usize = 100;

// == Cache Entry ==
/// A cached value plus its recency slot and expiry bookkeeping.
#[derive(Debug)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Slot of the key in the recency list
    pub slot: usize,
    /// Sequence number of the `put` that created this entry
    pub generation: u64,
    /// When the scheduled expiry removes the entry
    pub expires_at: Instant,
    /// Handle of the scheduled expiry task, None once the scheduler stopped
    expiry: Option<AbortHandle>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry living for `max_age` from now.
    pub fn new(
        value: V,
        slot: usize,
        generation: u64,
        max_age: Duration,
        expiry: Option<AbortHandle>,
    ) -> Self {
        Self {
            value,
            slot,
            generation,
            expires_at: Instant::now() + max_age,
            expiry,
        }
    }

    // == Cancel Expiry ==
    /// Aborts the scheduled expiry of this entry.
    ///
    /// Called whenever the entry leaves the map by any other path, so its
    /// timer never fires for a key that has moved on.
    pub fn cancel_expiry(&self) {
        if let Some(handle) = &self.expiry {
            handle.abort();
        }
    }

    // == Time To Live ==
    /// Returns the time left before the entry expires.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

// == Utility Functions ==
/// Renders a key for logging, truncating long representations.
pub fn key_label<K: std::fmt::Debug>(key: &K) -> String {
    let rendered = format!("{:?}", key);
    let total = rendered.chars().count();
    if total <= MAX_LOGGED_KEY_LENGTH {
        return rendered;
    }
    let head: String = rendered.chars().take(MAX_LOGGED_KEY_LENGTH).collect();
    format!("{}... [truncated, total length: {}]", head, total)
}
