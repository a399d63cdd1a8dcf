//! Configuration Module
//!
//! Handles loading and managing service and cache configuration from
//! environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CatalogError, Result};

// == Cache Defaults ==
/// TTL used by `CacheConfig::default()`
pub const DEFAULT_MAX_AGE_MS: u64 = 60_000;
/// Capacity used by `CacheConfig::default()`
pub const DEFAULT_MAX_SIZE: usize = 1000;
/// Name used by `CacheConfig::default()`
pub const DEFAULT_CACHE_NAME: &str = "DefaultCache";

const DEFAULT_REPORT_DELAY_SECS: u64 = 60;
const DEFAULT_REPORT_INTERVAL_SECS: u64 = 300;
const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 5;

/// Configuration of a single cache instance.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Name used in every log line of this cache
    pub name: String,
    /// Lifetime of an entry after its last insertion
    pub max_age: Duration,
    /// Maximum number of live entries
    pub max_size: usize,
    /// Delay before the first statistics report
    pub report_delay: Duration,
    /// Period between statistics reports
    pub report_interval: Duration,
    /// How long shutdown waits for in-flight background work
    pub shutdown_grace: Duration,
}

impl CacheConfig {
    /// Creates a config with the given bounds and default report timing.
    pub fn new(name: impl Into<String>, max_age_millis: u64, max_size: usize) -> Self {
        Self {
            name: name.into(),
            max_age: Duration::from_millis(max_age_millis),
            max_size,
            ..Self::default()
        }
    }

    /// Rejects bounds that leave the cache without sane semantics.
    pub fn validate(&self) -> Result<()> {
        if self.max_age.is_zero() {
            return Err(CatalogError::InvalidConfig(format!(
                "[{}] max age must be positive",
                self.name
            )));
        }
        if self.max_size == 0 {
            return Err(CatalogError::InvalidConfig(format!(
                "[{}] max size must be positive",
                self.name
            )));
        }
        if self.report_interval.is_zero() {
            return Err(CatalogError::InvalidConfig(format!(
                "[{}] report interval must be positive",
                self.name
            )));
        }
        if self.shutdown_grace.is_zero() {
            return Err(CatalogError::InvalidConfig(format!(
                "[{}] shutdown grace period must be positive",
                self.name
            )));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_CACHE_NAME.to_string(),
            max_age: Duration::from_millis(DEFAULT_MAX_AGE_MS),
            max_size: DEFAULT_MAX_SIZE,
            report_delay: Duration::from_secs(DEFAULT_REPORT_DELAY_SECS),
            report_interval: Duration::from_secs(DEFAULT_REPORT_INTERVAL_SECS),
            shutdown_grace: Duration::from_secs(DEFAULT_SHUTDOWN_GRACE_SECS),
        }
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// TTL of cached game rating queries in milliseconds
    pub game_cache_ttl_ms: u64,
    /// Capacity of the game query cache
    pub game_cache_max_size: usize,
    /// TTL of cached reviews in milliseconds
    pub review_cache_ttl_ms: u64,
    /// Capacity of the review cache
    pub review_cache_max_size: usize,
    /// Delay before the first statistics report in seconds
    pub cache_report_delay: u64,
    /// Statistics report period in seconds
    pub cache_report_interval: u64,
    /// Grace period for cache shutdown in seconds
    pub cache_shutdown_grace: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `GAME_CACHE_TTL_MS` - Game query cache TTL (default: 5000)
    /// - `GAME_CACHE_MAX_SIZE` - Game query cache capacity (default: 100)
    /// - `REVIEW_CACHE_TTL_MS` - Review cache TTL (default: 50000)
    /// - `REVIEW_CACHE_MAX_SIZE` - Review cache capacity (default: 100)
    /// - `CACHE_REPORT_DELAY_SECS` - First statistics report delay (default: 60)
    /// - `CACHE_REPORT_INTERVAL_SECS` - Statistics report period (default: 300)
    /// - `CACHE_SHUTDOWN_GRACE_SECS` - Cache shutdown grace period (default: 5)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            game_cache_ttl_ms: env_or("GAME_CACHE_TTL_MS", defaults.game_cache_ttl_ms),
            game_cache_max_size: env_or("GAME_CACHE_MAX_SIZE", defaults.game_cache_max_size),
            review_cache_ttl_ms: env_or("REVIEW_CACHE_TTL_MS", defaults.review_cache_ttl_ms),
            review_cache_max_size: env_or("REVIEW_CACHE_MAX_SIZE", defaults.review_cache_max_size),
            cache_report_delay: env_or("CACHE_REPORT_DELAY_SECS", defaults.cache_report_delay),
            cache_report_interval: env_or(
                "CACHE_REPORT_INTERVAL_SECS",
                defaults.cache_report_interval,
            ),
            cache_shutdown_grace: env_or("CACHE_SHUTDOWN_GRACE_SECS", defaults.cache_shutdown_grace),
        }
    }

    /// Cache configuration for game rating queries.
    pub fn game_cache(&self) -> CacheConfig {
        self.cache_config("GameCache", self.game_cache_ttl_ms, self.game_cache_max_size)
    }

    /// Cache configuration for per-id review lookups.
    pub fn review_cache(&self) -> CacheConfig {
        self.cache_config(
            "ReviewCache",
            self.review_cache_ttl_ms,
            self.review_cache_max_size,
        )
    }

    fn cache_config(&self, name: &str, ttl_ms: u64, max_size: usize) -> CacheConfig {
        CacheConfig {
            name: name.to_string(),
            max_age: Duration::from_millis(ttl_ms),
            max_size,
            report_delay: Duration::from_secs(self.cache_report_delay),
            report_interval: Duration::from_secs(self.cache_report_interval),
            shutdown_grace: Duration::from_secs(self.cache_shutdown_grace),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            game_cache_ttl_ms: 5000,
            game_cache_max_size: 100,
            review_cache_ttl_ms: 50_000,
            review_cache_max_size: 100,
            cache_report_delay: DEFAULT_REPORT_DELAY_SECS,
            cache_report_interval: DEFAULT_REPORT_INTERVAL_SECS,
            cache_shutdown_grace: DEFAULT_SHUTDOWN_GRACE_SECS,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
