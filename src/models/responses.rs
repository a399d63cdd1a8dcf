//! Response DTOs for the catalog API
//!
//! Defines the structure of outgoing HTTP response bodies. Games and
//! reviews serialize directly from the catalog entities.

use serde::Serialize;

use crate::cache::CacheStatsSnapshot;

/// Response body for the DELETE endpoints
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse for the named resource
    pub fn new(resource: impl std::fmt::Display) -> Self {
        Self {
            message: format!("{} deleted successfully", resource),
        }
    }
}

/// Response body for the cache stats endpoint (GET /cache/stats)
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub caches: Vec<CacheStatsSnapshot>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
