//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking and
//! scheduled per-entry TTL expiration.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::cache::entry::key_label;
use crate::cache::{CacheEntry, CacheStats, CacheStatsSnapshot, RecencyList};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::tasks::CacheScheduler;

// == Cache State ==
/// Everything guarded by the cache's single lock.
#[derive(Debug)]
struct CacheState<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    recency: RecencyList<K>,
    stats: CacheStats,
    next_generation: u64,
}

impl<K, V> CacheState<K, V>
where
    K: Eq + Hash + Clone + Debug,
{
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            recency: RecencyList::new(),
            stats: CacheStats::new(),
            next_generation: 0,
        }
    }

    /// The map and the recency list always track the same keys.
    fn debug_check(&self) {
        debug_assert_eq!(self.entries.len(), self.recency.len());
    }

    /// Evicts the least recently used entry.
    fn evict_oldest(&mut self, name: &str) {
        if let Some(evicted_key) = self.recency.pop_back() {
            if let Some(entry) = self.entries.remove(&evicted_key) {
                entry.cancel_expiry();
                self.stats.record_removals(1);
                debug!(
                    "[{}] Removing eldest entry due to capacity limit: {} (Cache size: {})",
                    name,
                    key_label(&evicted_key),
                    self.entries.len()
                );
            }
        }
    }
}

// == Shared ==
/// State reachable from scheduled callbacks.
#[derive(Debug)]
struct Shared<K, V> {
    name: String,
    max_size: usize,
    state: Mutex<CacheState<K, V>>,
}

impl<K, V> Shared<K, V>
where
    K: Eq + Hash + Clone + Debug,
{
    /// Removes `key` if it is still mapped to the entry from `generation`.
    fn expire(&self, key: &K, generation: u64) {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let is_current = state
            .entries
            .get(key)
            .is_some_and(|entry| entry.generation == generation);
        if !is_current {
            return;
        }

        if let Some(entry) = state.entries.remove(key) {
            state.recency.remove(entry.slot);
            state.stats.record_removals(1);
            debug!(
                "[{}] Auto-removed entry: {} after TTL expired (Cache size: {})",
                self.name,
                key_label(key),
                state.entries.len()
            );
        }
        state.debug_check();
    }

    fn snapshot(&self) -> CacheStatsSnapshot {
        let state = self.state.lock();
        CacheStatsSnapshot::capture(&self.name, state.entries.len(), self.max_size, &state.stats)
    }

    fn report_statistics(&self) {
        let s = self.snapshot();
        info!(
            "[{}] Cache stats: size={}/{}, hits={}, misses={}, puts={}, removals={}, hit ratio={}%",
            s.name, s.size, s.max_size, s.hits, s.misses, s.puts, s.removals, s.hit_ratio
        );
    }
}

// == Bounded Expiring Cache ==
/// Thread-safe cache with LRU eviction and per-entry TTL expiry.
///
/// Every operation takes one internal lock, so each is atomic with respect
/// to the others. Each `put` schedules an expiry on the cache's own
/// background scheduler; re-inserting a key supersedes the old one.
///
/// The owner must call [`shutdown`](Self::shutdown) at teardown; dropping
/// the cache does the same if it was not called.
#[derive(Debug)]
pub struct BoundedExpiringCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
    V: Clone + Send + 'static,
{
    shared: Arc<Shared<K, V>>,
    scheduler: CacheScheduler,
    max_age: Duration,
    shutdown_grace: Duration,
}

impl<K, V> BoundedExpiringCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
    V: Clone + Send + 'static,
{
    // == Constructor ==
    /// Creates a new cache and starts its background scheduler.
    ///
    /// # Arguments
    /// * `max_age_millis` - Lifetime of an entry after its last `put`
    /// * `max_size` - Maximum number of live entries
    /// * `name` - Name used in logs and statistics
    ///
    /// # Errors
    /// `InvalidConfig` if either bound is zero.
    pub fn new(max_age_millis: u64, max_size: u32, name: impl Into<String>) -> Result<Self> {
        Self::with_config(CacheConfig::new(name, max_age_millis, max_size as usize))
    }

    /// Creates a cache with a 60 s TTL, 1000 entries and the name `DefaultCache`.
    pub fn with_defaults() -> Result<Self> {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a cache from a full configuration.
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        config.validate()?;

        let scheduler = CacheScheduler::start(&config.name)?;
        let shared = Arc::new(Shared {
            name: config.name.clone(),
            max_size: config.max_size,
            state: Mutex::new(CacheState::new()),
        });

        let reporter = Arc::clone(&shared);
        scheduler.schedule_at_fixed_rate(config.report_delay, config.report_interval, move || {
            reporter.report_statistics()
        });

        info!(
            "[{}] Cache initialized with TTL: {} ms, max size: {}",
            config.name,
            config.max_age.as_millis(),
            config.max_size
        );

        Ok(Self {
            shared,
            scheduler,
            max_age: config.max_age,
            shutdown_grace: config.shutdown_grace,
        })
    }

    // == Put ==
    /// Inserts or replaces the value for `key`.
    ///
    /// The entry becomes the most recently used one and gets a fresh TTL.
    /// A new key in a full cache first evicts the least recently used entry.
    pub fn put(&self, key: K, value: V) {
        let mut guard = self.shared.state.lock();
        let state = &mut *guard;

        state.next_generation += 1;
        let generation = state.next_generation;

        let slot = match state.entries.remove(&key) {
            Some(previous) => {
                previous.cancel_expiry();
                state.recency.move_to_front(previous.slot);
                previous.slot
            }
            None => {
                if state.entries.len() >= self.shared.max_size {
                    state.evict_oldest(&self.shared.name);
                }
                state.recency.push_front(key.clone())
            }
        };

        let expiry = {
            let shared = Arc::clone(&self.shared);
            let key = key.clone();
            self.scheduler
                .schedule(self.max_age, move || shared.expire(&key, generation))
        };
        if expiry.is_none() {
            warn!(
                "[{}] Scheduler stopped, entry {} will not expire",
                self.shared.name,
                key_label(&key)
            );
        }

        debug!(
            "[{}] Added entry: {} (Cache size: {})",
            self.shared.name,
            key_label(&key),
            state.entries.len() + 1
        );
        state.entries.insert(
            key,
            CacheEntry::new(value, slot, generation, self.max_age, expiry),
        );
        state.stats.record_put();
        state.debug_check();
    }

    // == Get ==
    /// Returns a clone of the value for `key`, promoting it to most recently used.
    ///
    /// Does not extend the entry's lifetime.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut guard = self.shared.state.lock();
        let state = &mut *guard;

        match state.entries.get(key) {
            Some(entry) => {
                state.recency.move_to_front(entry.slot);
                state.stats.record_hit();
                debug!(
                    "[{}] Cache HIT: {} (Cache size: {}, expires in {} ms)",
                    self.shared.name,
                    key_label(key),
                    state.entries.len(),
                    entry.ttl_remaining().as_millis()
                );
                Some(entry.value.clone())
            }
            None => {
                state.stats.record_miss();
                debug!(
                    "[{}] Cache MISS: {} (Cache size: {})",
                    self.shared.name,
                    key_label(key),
                    state.entries.len()
                );
                None
            }
        }
    }

    // == Remove ==
    /// Removes the entry for `key`, if any.
    pub fn remove(&self, key: &K) {
        let mut guard = self.shared.state.lock();
        let state = &mut *guard;

        if let Some(entry) = state.entries.remove(key) {
            entry.cancel_expiry();
            state.recency.remove(entry.slot);
            state.stats.record_removals(1);
            debug!(
                "[{}] Manually removed entry: {} (Cache size: {})",
                self.shared.name,
                key_label(key),
                state.entries.len()
            );
        }
        state.debug_check();
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&self) {
        let mut guard = self.shared.state.lock();
        let state = &mut *guard;

        let size = state.entries.len();
        for (_, entry) in state.entries.drain() {
            entry.cancel_expiry();
        }
        state.recency.clear();
        debug_assert!(state.recency.is_empty());
        state.stats.record_removals(size as u64);
        info!("[{}] Cache cleared: {} entries removed", self.shared.name, size);
    }

    // == Size ==
    /// Returns the current number of entries.
    pub fn size(&self) -> usize {
        self.shared.state.lock().entries.len()
    }

    // == Contains Key ==
    /// Checks for `key` without touching statistics or recency.
    pub fn contains_key(&self, key: &K) -> bool {
        self.shared.state.lock().entries.contains_key(key)
    }

    /// Returns the cache name.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Returns the capacity.
    pub fn max_size(&self) -> usize {
        self.shared.max_size
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.shared.snapshot()
    }

    /// Returns the keys ordered from most to least recently used.
    pub fn keys_by_recency(&self) -> Vec<K> {
        let state = self.shared.state.lock();
        let mut keys = Vec::with_capacity(state.recency.len());
        keys.extend(state.recency.iter().cloned());
        keys
    }

    /// Logs the current statistics at info level.
    pub fn report_statistics(&self) {
        self.shared.report_statistics();
    }

    // == Shutdown ==
    /// Reports statistics one last time and stops the background scheduler.
    ///
    /// Waits up to the configured grace period (5 s by default) for running
    /// callbacks. Safe to call more than once.
    pub fn shutdown(&self) {
        if self.scheduler.is_stopped() {
            return;
        }
        info!("[{}] Shutting down cache executor...", self.shared.name);
        self.report_statistics();
        self.scheduler.shutdown(self.shutdown_grace);
    }
}

impl<K, V> Drop for BoundedExpiringCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
    V: Clone + Send + 'static,
{
    fn drop(&mut self) {
        self.shutdown();
    }
}
