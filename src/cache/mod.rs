//! Cache Module
//!
//! Provides the in-memory query cache with LRU eviction and scheduled TTL
//! expiration.

mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::RecencyList;
pub use stats::{CacheStats, CacheStatsSnapshot};
pub use store::BoundedExpiringCache;
