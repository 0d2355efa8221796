//! Market Cache - namespace-aware in-process caching
//!
//! Per-namespace TTLs and byte budgets with LRU, LFU or FIFO eviction, a
//! background expiry reaper, fire-and-forget access tracking, and a
//! cache-aside data service for marketplace resources.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheRegistry, EvictionStrategy, NamespaceStats};
pub use config::{CacheConfig, Config};
pub use error::CacheError;
pub use service::{BackingStore, DataService, Query, ResourceKind, ServiceError, StoreError};
pub use tasks::{spawn_reaper, AccessSink, AccessTracker, LogSink};
