//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Errors raised by the cache registry and its namespace stores.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Operation targeted a namespace that was never registered
    #[error("Unknown namespace: {0}")]
    UnknownNamespace(String),

    /// Namespace re-registered with a different configuration
    #[error("Conflicting configuration for namespace '{namespace}': {reason}")]
    ConfigConflict { namespace: String, reason: String },

    /// Configuration values out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Value could not be sized for budget accounting
    #[error("Size estimation failed: {0}")]
    SizeEstimation(String),

    /// Invalidation pattern is not a valid regular expression
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::UnknownNamespace(_) => StatusCode::NOT_FOUND,
            CacheError::ConfigConflict { .. } => StatusCode::CONFLICT,
            CacheError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            CacheError::SizeEstimation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::InvalidPattern(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
