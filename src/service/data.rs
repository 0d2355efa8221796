//! Cache-Aside Data Service
//!
//! Reads check the cache first and fall back to the backing store,
//! populating the cache on the way out. Writes go to the backing store
//! first, then invalidate every cached view they could have changed.
//!
//! The cache is fail-open: any cache-layer error is logged and the
//! operation continues as if there were no cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::{CacheRegistry, NamespaceStats};
use crate::config::Config;
use crate::service::{cache_key, item_key, views_pattern, BackingStore, Query, ResourceKind, StoreError};

/// Fetch timeout used when none is configured.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

// == Service Error ==
/// Errors visible to callers of the data service.
///
/// Cache failures never appear here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Backing store did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Request cancelled")]
    Cancelled,
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

// == Data Service ==
/// Cache-aside facade over a [`BackingStore`].
pub struct DataService<S> {
    registry: Arc<CacheRegistry<Value>>,
    store: S,
    fetch_timeout: Duration,
}

impl<S: BackingStore> DataService<S> {
    /// Wraps `store` with `registry`. The resource namespaces must already
    /// be registered; if they are not, reads simply bypass the cache.
    pub fn new(registry: Arc<CacheRegistry<Value>>, store: S) -> Self {
        Self {
            registry,
            store,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Wraps `store` using the fetch timeout from `config`.
    pub fn from_config(registry: Arc<CacheRegistry<Value>>, store: S, config: &Config) -> Self {
        Self::new(registry, store).with_fetch_timeout(config.fetch_timeout())
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &Arc<CacheRegistry<Value>> {
        &self.registry
    }

    // == Read Path ==
    /// Reads `resource` for `query` through the cache.
    pub async fn fetch(&self, resource: ResourceKind, query: &Query) -> ServiceResult<Value> {
        self.fetch_with_cancel(resource, query, &CancellationToken::new())
            .await
    }

    /// Like [`fetch`](Self::fetch), but gives up when `cancel` fires.
    ///
    /// A cancelled or timed-out fetch caches nothing.
    pub async fn fetch_with_cancel(
        &self,
        resource: ResourceKind,
        query: &Query,
        cancel: &CancellationToken,
    ) -> ServiceResult<Value> {
        let namespace = resource.namespace();
        let key = cache_key(resource, query);

        match self.registry.get(namespace, &key) {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(e) => warn!(namespace, key = %key, error = %e, "Cache read failed, bypassing cache"),
        }

        // A write that lands while the fetch is in flight bumps this, and
        // the pre-write snapshot is then not cached
        let generation = self.registry.generation(namespace).ok();

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ServiceError::Cancelled),
            result = tokio::time::timeout(self.fetch_timeout, self.store.fetch(resource, query)) => result,
        };

        let value = match fetched {
            Ok(result) => result?,
            Err(_) => return Err(ServiceError::Timeout(self.fetch_timeout)),
        };

        self.populate(namespace, key, value.clone(), generation);
        Ok(value)
    }

    pub async fn listing(&self, id: &str) -> ServiceResult<Value> {
        self.fetch(ResourceKind::Listings, &Query::by_id(id)).await
    }

    pub async fn listings(&self, query: &Query) -> ServiceResult<Value> {
        self.fetch(ResourceKind::Listings, query).await
    }

    pub async fn profile(&self, id: &str) -> ServiceResult<Value> {
        self.fetch(ResourceKind::Profiles, &Query::by_id(id)).await
    }

    pub async fn categories(&self, query: &Query) -> ServiceResult<Value> {
        self.fetch(ResourceKind::Categories, query).await
    }

    pub async fn search(&self, query: &Query) -> ServiceResult<Value> {
        self.fetch(ResourceKind::Search, query).await
    }

    // == Write Path ==
    /// Creates a listing. Listing views and search results may now be
    /// incomplete, so both are invalidated.
    pub async fn create_listing(&self, payload: Value) -> ServiceResult<Value> {
        let stored = self
            .store
            .write(ResourceKind::Listings, None, payload)
            .await?;
        self.invalidate_listing(None);
        Ok(stored)
    }

    pub async fn update_listing(&self, id: &str, payload: Value) -> ServiceResult<Value> {
        let stored = self
            .store
            .write(ResourceKind::Listings, Some(id), payload)
            .await?;
        self.invalidate_listing(Some(id));
        Ok(stored)
    }

    pub async fn delete_listing(&self, id: &str) -> ServiceResult<()> {
        self.store.delete(ResourceKind::Listings, id).await?;
        self.invalidate_listing(Some(id));
        Ok(())
    }

    /// Updates a profile and drops its cached record and profile views.
    pub async fn update_profile(&self, id: &str, payload: Value) -> ServiceResult<Value> {
        let stored = self
            .store
            .write(ResourceKind::Profiles, Some(id), payload)
            .await?;
        self.forget(ResourceKind::Profiles.namespace(), &item_key(ResourceKind::Profiles, id));
        self.forget_pattern(
            ResourceKind::Profiles.namespace(),
            &views_pattern(ResourceKind::Profiles),
        );
        Ok(stored)
    }

    /// Creates (`id == None`) or updates a category. The category tree is
    /// small and every view may change, so the namespace is cleared.
    pub async fn upsert_category(&self, id: Option<&str>, payload: Value) -> ServiceResult<Value> {
        let stored = self
            .store
            .write(ResourceKind::Categories, id, payload)
            .await?;
        self.forget_all(ResourceKind::Categories.namespace());
        Ok(stored)
    }

    pub async fn delete_category(&self, id: &str) -> ServiceResult<()> {
        self.store.delete(ResourceKind::Categories, id).await?;
        self.forget_all(ResourceKind::Categories.namespace());
        Ok(())
    }

    /// Per-namespace cache statistics.
    pub fn stats(&self) -> HashMap<String, NamespaceStats> {
        self.registry.all_stats()
    }

    // == Cache Helpers ==
    // Each swallows cache errors; the surrounding operation already
    // succeeded against the backing store.

    fn populate(&self, namespace: &str, key: String, value: Value, generation: Option<u64>) {
        let result = match generation {
            Some(generation) => self
                .registry
                .set_if_generation(namespace, key, value, None, generation)
                .map(|_| ()),
            None => self.registry.set(namespace, key, value, None),
        };
        if let Err(e) = result {
            warn!(namespace, error = %e, "Cache write failed, continuing without cache");
        }
    }

    fn invalidate_listing(&self, id: Option<&str>) {
        let namespace = ResourceKind::Listings.namespace();
        if let Some(id) = id {
            self.forget(namespace, &item_key(ResourceKind::Listings, id));
        }
        self.forget_pattern(namespace, &views_pattern(ResourceKind::Listings));
        // A changed listing can appear in any cached search page
        self.forget_all(ResourceKind::Search.namespace());
    }

    fn forget(&self, namespace: &str, key: &str) {
        if let Err(e) = self.registry.delete(namespace, key) {
            warn!(namespace, key, error = %e, "Cache delete failed");
        }
    }

    fn forget_pattern(&self, namespace: &str, pattern: &str) {
        match self.registry.invalidate_pattern(namespace, pattern) {
            Ok(removed) => debug!(namespace, pattern, removed, "Invalidated cached views"),
            Err(e) => warn!(namespace, pattern, error = %e, "Cache invalidation failed"),
        }
    }

    fn forget_all(&self, namespace: &str) {
        if let Err(e) = self.registry.clear(namespace) {
            warn!(namespace, error = %e, "Cache clear failed");
        }
    }
}
