//! API Routes
//!
//! Configures the Axum router with all admin endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, delete_entries_key_handler, delete_handler, delete_invalidate_key_handler,
    entries_handler, health_handler, invalidate_handler, namespace_stats_handler, stats_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET /stats` - Statistics of every namespace
/// - `GET /stats/:namespace` - Statistics of one namespace
/// - `GET /cache/:namespace/entries` - Live entry metadata
/// - `DELETE /cache/:namespace` - Clear a namespace
/// - `DELETE /cache/:namespace/:key` - Delete one key
/// - `POST /cache/:namespace/invalidate` - Remove keys matching a pattern
///
/// Keys literally named `entries` or `invalidate` are still deletable; the
/// static routes carry a DELETE method for them.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/stats/:namespace", get(namespace_stats_handler))
        .route("/cache/:namespace", delete(clear_handler))
        .route(
            "/cache/:namespace/entries",
            get(entries_handler).delete(delete_entries_key_handler),
        )
        .route(
            "/cache/:namespace/invalidate",
            post(invalidate_handler).delete(delete_invalidate_key_handler),
        )
        .route("/cache/:namespace/:key", delete(delete_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
