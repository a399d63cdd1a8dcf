//! Error types for the catalog service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Catalog Error Enum ==
/// Unified error type for the catalog service.
///
/// The cache itself only ever produces `InvalidConfig` (at construction) and
/// `Internal` (when its scheduler cannot be started). Misses, evictions and
/// expiry are normal control flow and never surface as errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Requested game or review does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Entity with the same identity already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid cache or service configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CatalogError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            CatalogError::AlreadyExists(msg) => (StatusCode::CONFLICT, msg.clone()),
            CatalogError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CatalogError::InvalidConfig(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            CatalogError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the catalog service.
pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let test_cases = vec![
            (CatalogError::NotFound("game".to_string()), StatusCode::NOT_FOUND),
            (CatalogError::AlreadyExists("game".to_string()), StatusCode::CONFLICT),
            (CatalogError::InvalidRequest("bad".to_string()), StatusCode::BAD_REQUEST),
            (
                CatalogError::InvalidConfig("max_size".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (CatalogError::Internal("error".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected_status) in test_cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected_status);
        }
    }

    #[test]
    fn test_error_display() {
        let err = CatalogError::NotFound("Game not found with id: 7".to_string());
        assert_eq!(err.to_string(), "Not found: Game not found with id: 7");
    }
}
