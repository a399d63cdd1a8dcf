//! Gamelib - A game catalog service
//!
//! Serves games and reviews over HTTP, with rating and review lookups
//! memoized in bounded, time-expiring LRU caches.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::BoundedExpiringCache;
pub use config::{CacheConfig, Config};
pub use error::{CatalogError, Result};
