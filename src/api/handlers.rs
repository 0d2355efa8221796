//! API Handlers
//!
//! HTTP request handlers for the cache admin endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::{CacheRegistry, NamespaceStats};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, DeleteResponse, EntriesResponse, HealthResponse, InvalidateRequest,
    InvalidateResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// Holds the process-wide registry; handlers never build their own.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<CacheRegistry<Value>>,
}

impl AppState {
    pub fn new(registry: Arc<CacheRegistry<Value>>) -> Self {
        Self { registry }
    }

    /// Creates a registry with every namespace from the configuration
    /// table registered.
    pub fn from_config(config: &Config, registry: CacheRegistry<Value>) -> Result<Self> {
        for namespace in &config.namespaces {
            registry.register_namespace(namespace.clone())?;
        }
        Ok(Self::new(Arc::new(registry)))
    }
}

/// Handler for GET /stats
///
/// Returns statistics of every namespace.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(state.registry.all_stats()))
}

/// Handler for GET /stats/:namespace
pub async fn namespace_stats_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<NamespaceStats>> {
    let stats = state.registry.stats(&namespace)?;
    Ok(Json(stats))
}

/// Handler for GET /cache/:namespace/entries
pub async fn entries_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<EntriesResponse>> {
    let entries = state.registry.entries(&namespace)?;
    Ok(Json(EntriesResponse::new(namespace, entries)))
}

/// Handler for DELETE /cache/:namespace
///
/// Clears the namespace; lifetime hit/miss counters are kept.
pub async fn clear_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<ClearResponse>> {
    state.registry.clear(&namespace)?;
    Ok(Json(ClearResponse::new(namespace)))
}

/// Handler for DELETE /cache/:namespace/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path((namespace, key)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>> {
    delete_key(&state, namespace, key)
}

// Keys named like the static sub-routes are matched by those routes first,
// so their DELETE methods land here instead of on `delete_handler`.

/// Handler for DELETE /cache/:namespace/entries
pub async fn delete_entries_key_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<DeleteResponse>> {
    delete_key(&state, namespace, "entries".to_string())
}

/// Handler for DELETE /cache/:namespace/invalidate
pub async fn delete_invalidate_key_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<DeleteResponse>> {
    delete_key(&state, namespace, "invalidate".to_string())
}

fn delete_key(state: &AppState, namespace: String, key: String) -> Result<Json<DeleteResponse>> {
    let deleted = state.registry.delete(&namespace, &key)?;
    Ok(Json(DeleteResponse::new(namespace, key, deleted)))
}

/// Handler for POST /cache/:namespace/invalidate
///
/// Removes every key matching the posted regular expression.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidPattern(error_msg));
    }

    let removed = state.registry.invalidate_pattern(&namespace, &req.pattern)?;
    Ok(Json(InvalidateResponse::new(namespace, req.pattern, removed)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
