//! Cache-Aside Data Service Module
//!
//! Resource-aware caching in front of the backing data store.

mod backing;
mod data;
mod keys;

pub use backing::{BackingStore, ResourceKind, StoreError};
pub use data::{DataService, ServiceError, ServiceResult, DEFAULT_FETCH_TIMEOUT};
pub use keys::{cache_key, item_key, views_pattern, Query};
