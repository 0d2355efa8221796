//! API Module
//!
//! HTTP handlers and routing for the cache admin API.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /stats`, `GET /stats/:namespace` - Cache statistics
//! - `GET /cache/:namespace/entries` - Live entry metadata
//! - `DELETE /cache/:namespace` - Clear a namespace
//! - `DELETE /cache/:namespace/:key` - Delete one key
//! - `POST /cache/:namespace/invalidate` - Pattern invalidation

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
