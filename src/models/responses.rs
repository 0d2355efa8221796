//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::cache::{EntryInfo, NamespaceStats};

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Statistics per namespace, sorted by name
    pub namespaces: BTreeMap<String, NamespaceStats>,
}

impl StatsResponse {
    pub fn new(stats: HashMap<String, NamespaceStats>) -> Self {
        Self {
            namespaces: stats.into_iter().collect(),
        }
    }
}

/// Response body for entry listing (GET /cache/:namespace/entries)
#[derive(Debug, Clone, Serialize)]
pub struct EntriesResponse {
    pub namespace: String,
    pub entries: Vec<EntryInfo>,
}

impl EntriesResponse {
    pub fn new(namespace: impl Into<String>, entries: Vec<EntryInfo>) -> Self {
        Self {
            namespace: namespace.into(),
            entries,
        }
    }
}

/// Response body for the DELETE operation (DELETE /cache/:namespace/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Outcome message
    pub message: String,
    pub namespace: String,
    /// The key that was targeted
    pub key: String,
    /// Whether the key was present
    pub deleted: bool,
}

impl DeleteResponse {
    pub fn new(namespace: impl Into<String>, key: impl Into<String>, deleted: bool) -> Self {
        let key = key.into();
        let message = if deleted {
            format!("Key '{}' deleted successfully", key)
        } else {
            format!("Key '{}' was not cached", key)
        };
        Self {
            message,
            namespace: namespace.into(),
            key,
            deleted,
        }
    }
}

/// Response body for the clear operation (DELETE /cache/:namespace)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    pub namespace: String,
}

impl ClearResponse {
    pub fn new(namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self {
            message: format!("Namespace '{}' cleared", namespace),
            namespace,
        }
    }
}

/// Response body for pattern invalidation
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub namespace: String,
    pub pattern: String,
    /// Number of keys removed
    pub removed: usize,
}

impl InvalidateResponse {
    pub fn new(namespace: impl Into<String>, pattern: impl Into<String>, removed: usize) -> Self {
        Self {
            namespace: namespace.into(),
            pattern: pattern.into(),
            removed,
        }
    }
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

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_response_sorted_by_namespace() {
        let mut stats = HashMap::new();
        stats.insert("search".to_string(), NamespaceStats::new("search"));
        stats.insert("listings".to_string(), NamespaceStats::new("listings"));

        let json = serde_json::to_string(&StatsResponse::new(stats)).unwrap();
        let listings = json.find("\"listings\"").unwrap();
        let search = json.find("\"search\"").unwrap();
        assert!(listings < search);
    }

    #[test]
    fn test_delete_response_messages() {
        let resp = DeleteResponse::new("listings", "listing:1", true);
        assert!(resp.message.contains("deleted"));

        let resp = DeleteResponse::new("listings", "listing:1", false);
        assert!(!resp.deleted);
        assert!(resp.message.contains("not cached"));
    }

    #[test]
    fn test_invalidate_response_serialize() {
        let resp = InvalidateResponse::new("listings", "listing:.*", 2);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"removed\":2"));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
