//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, puts and removals.

use serde::Serialize;

// == Cache Stats ==
/// Monotonic counters of one cache instance.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of `get` calls that found a live entry
    pub hits: u64,
    /// Number of `get` calls that found nothing
    pub misses: u64,
    /// Number of `put` calls
    pub puts: u64,
    /// Entries that left the map: removes, evictions, expiries and clears
    pub removals: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Ratio ==
    /// Percentage of gets that were hits, rounded to a whole percent.
    ///
    /// Returns 0 if no gets have been made.
    pub fn hit_ratio(&self) -> u64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0
        } else {
            (self.hits as f64 / total as f64 * 100.0).round() as u64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Put ==
    /// Increments the put counter.
    pub fn record_put(&mut self) {
        self.puts += 1;
    }

    // == Record Removals ==
    /// Adds `count` entries to the removal counter.
    pub fn record_removals(&mut self, count: u64) {
        self.removals += count;
    }
}

// == Stats Snapshot ==
/// Point-in-time statistics report of a named cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStatsSnapshot {
    pub name: String,
    pub size: usize,
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
    pub puts: u64,
    pub removals: u64,
    /// Whole percent
    pub hit_ratio: u64,
}

impl CacheStatsSnapshot {
    /// Captures `stats` together with the cache's name and occupancy.
    pub fn capture(name: &str, size: usize, max_size: usize, stats: &CacheStats) -> Self {
        Self {
            name: name.to_string(),
            size,
            max_size,
            hits: stats.hits,
            misses: stats.misses,
            puts: stats.puts,
            removals: stats.removals,
            hit_ratio: stats.hit_ratio(),
        }
    }
}
