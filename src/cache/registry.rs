//! Cache Registry Module
//!
//! Owns every namespace store and routes operations to them. Each namespace
//! sits behind its own lock, so work on different namespaces never
//! contends, while operations on one namespace are serialised.

use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::cache::{
    Clock, EntryInfo, JsonSizeEstimator, MonotonicClock, NamespaceStats, NamespaceStore,
    SizeEstimator,
};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::{AccessKind, AccessTracker};

type SharedStore<V> = Arc<RwLock<NamespaceStore<V>>>;

// == Cache Registry ==
/// Process-wide set of namespace stores.
///
/// Construct one at startup and share it by `Arc`.
pub struct CacheRegistry<V> {
    /// Namespace name to store
    namespaces: RwLock<HashMap<String, SharedStore<V>>>,
    /// Sizes values for budget accounting
    estimator: Arc<dyn SizeEstimator<V>>,
    /// TTL time source
    clock: Arc<dyn Clock>,
    /// Optional analytics reporting
    tracker: Option<AccessTracker>,
}

impl<V> fmt::Debug for CacheRegistry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheRegistry")
            .field("namespaces", &self.namespaces())
            .field("clock", &self.clock)
            .field("tracking", &self.tracker.is_some())
            .finish_non_exhaustive()
    }
}

impl<V> CacheRegistry<V>
where
    V: Serialize + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates an empty registry sizing values by their JSON length.
    pub fn new() -> Self {
        Self::with_size_estimator(Arc::new(JsonSizeEstimator::new()))
    }
}

impl<V> Default for CacheRegistry<V>
where
    V: Serialize + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> CacheRegistry<V> {
    /// Creates an empty registry with a custom size function.
    pub fn with_size_estimator(estimator: Arc<dyn SizeEstimator<V>>) -> Self {
        Self {
            namespaces: RwLock::new(HashMap::new()),
            estimator,
            clock: Arc::new(MonotonicClock::new()),
            tracker: None,
        }
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Reports accesses to `tracker`.
    pub fn with_tracker(mut self, tracker: AccessTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    fn store(&self, namespace: &str) -> Result<SharedStore<V>> {
        self.namespaces
            .read()
            .get(namespace)
            .cloned()
            .ok_or_else(|| CacheError::UnknownNamespace(namespace.to_string()))
    }

    fn track(&self, namespace: &str, key: &str, kind: AccessKind) {
        if let Some(tracker) = &self.tracker {
            tracker.record(namespace, key, kind);
        }
    }

    // == Register Namespace ==
    /// Creates an empty store for `config.namespace`.
    ///
    /// Registering the same name again with an identical config is a no-op;
    /// a different config is a [`CacheError::ConfigConflict`].
    pub fn register_namespace(&self, config: CacheConfig) -> Result<()> {
        config.validate()?;

        let mut namespaces = self.namespaces.write();
        if let Some(existing) = namespaces.get(&config.namespace) {
            let existing = existing.read();
            if *existing.config() == config {
                return Ok(());
            }
            return Err(CacheError::ConfigConflict {
                namespace: config.namespace.clone(),
                reason: format!(
                    "registered as {:?}, requested {:?}",
                    existing.config(),
                    config
                ),
            });
        }

        info!(
            namespace = %config.namespace,
            ttl_seconds = config.ttl_seconds,
            max_size_bytes = config.max_size_bytes,
            strategy = %config.strategy,
            "Registered cache namespace"
        );
        let name = config.namespace.clone();
        namespaces.insert(name, Arc::new(RwLock::new(NamespaceStore::new(config))));
        Ok(())
    }

    // == Update Namespace ==
    /// Replaces the configuration of a registered namespace.
    ///
    /// Entries keep their own TTL; a smaller budget evicts immediately.
    pub fn update_namespace(&self, config: CacheConfig) -> Result<()> {
        config.validate()?;
        let store = self.store(&config.namespace)?;
        let now = self.clock.now_ms();

        info!(
            namespace = %config.namespace,
            ttl_seconds = config.ttl_seconds,
            max_size_bytes = config.max_size_bytes,
            strategy = %config.strategy,
            "Reconfigured cache namespace"
        );
        store.write().reconfigure(config, now);
        Ok(())
    }

    // == Unregister Namespace ==
    /// Drops a namespace and all of its entries.
    pub fn unregister_namespace(&self, namespace: &str) -> bool {
        let removed = self.namespaces.write().remove(namespace).is_some();
        if removed {
            info!(namespace = %namespace, "Unregistered cache namespace");
        }
        removed
    }

    /// Registered namespace names, sorted.
    pub fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self.namespaces.read().keys().cloned().collect();
        names.sort();
        names
    }

    // == Get ==
    /// Returns the live value for `key`, or `None` on a miss.
    ///
    /// Hits bump the entry's hit count and recency, so even reads take the
    /// namespace write lock.
    pub fn get(&self, namespace: &str, key: &str) -> Result<Option<V>>
    where
        V: Clone,
    {
        let store = self.store(namespace)?;
        let now = self.clock.now_ms();
        let value = store.write().get(key, now);

        let kind = if value.is_some() {
            AccessKind::Hit
        } else {
            AccessKind::Miss
        };
        self.track(namespace, key, kind);
        Ok(value)
    }

    // == Contains ==
    /// Whether `key` is live, without counting a read.
    pub fn contains(&self, namespace: &str, key: &str) -> Result<bool> {
        let store = self.store(namespace)?;
        let now = self.clock.now_ms();
        let live = store.read().contains(key, now);
        Ok(live)
    }

    // == Set ==
    /// Stores `value` under `key`, with an optional per-entry TTL.
    ///
    /// If the value cannot be sized the write is skipped and any previous
    /// value for the key is dropped, so a stale value is never served in
    /// its place.
    pub fn set(
        &self,
        namespace: &str,
        key: impl Into<String>,
        value: V,
        ttl_override_seconds: Option<u64>,
    ) -> Result<()> {
        self.write_entry(namespace, key.into(), value, ttl_override_seconds, None)?;
        Ok(())
    }

    // == Generation ==
    /// Current invalidation generation of a namespace.
    ///
    /// Capture it before reading from a slower source and pass it to
    /// [`set_if_generation`](Self::set_if_generation) afterwards.
    pub fn generation(&self, namespace: &str) -> Result<u64> {
        let store = self.store(namespace)?;
        let generation = store.read().generation();
        Ok(generation)
    }

    /// Like [`set`](Self::set), but only if nothing in the namespace was
    /// deleted, cleared or invalidated since `generation` was read.
    ///
    /// Returns whether the value was stored.
    pub fn set_if_generation(
        &self,
        namespace: &str,
        key: impl Into<String>,
        value: V,
        ttl_override_seconds: Option<u64>,
        generation: u64,
    ) -> Result<bool> {
        self.write_entry(
            namespace,
            key.into(),
            value,
            ttl_override_seconds,
            Some(generation),
        )
    }

    fn write_entry(
        &self,
        namespace: &str,
        key: String,
        value: V,
        ttl_override_seconds: Option<u64>,
        expected_generation: Option<u64>,
    ) -> Result<bool> {
        let store = self.store(namespace)?;

        let size_bytes = match self.estimator.estimate(&value) {
            Ok(size) => size,
            Err(e) => {
                warn!(namespace = %namespace, key = %key, error = %e, "Skipping cache write");
                store.write().delete(&key);
                return Ok(false);
            }
        };

        let now = self.clock.now_ms();
        {
            let mut guard = store.write();
            if let Some(expected) = expected_generation {
                if guard.generation() != expected {
                    debug!(namespace = %namespace, key = %key, "Skipping cache write invalidated mid-flight");
                    return Ok(false);
                }
            }
            guard.set(key.clone(), value, size_bytes, ttl_override_seconds, now);
        }

        self.track(namespace, &key, AccessKind::Write);
        Ok(true)
    }

    // == Delete ==
    /// Removes `key`. Returns whether it was present.
    pub fn delete(&self, namespace: &str, key: &str) -> Result<bool> {
        let store = self.store(namespace)?;
        let removed = store.write().delete(key);
        Ok(removed)
    }

    // == Clear ==
    /// Removes every entry; lifetime hit/miss counters are kept.
    pub fn clear(&self, namespace: &str) -> Result<()> {
        let store = self.store(namespace)?;
        store.write().clear();
        Ok(())
    }

    // == Invalidate Pattern ==
    /// Removes every key matching the regular expression `pattern`.
    pub fn invalidate_pattern(&self, namespace: &str, pattern: &str) -> Result<usize> {
        let store = self.store(namespace)?;
        let regex =
            Regex::new(pattern).map_err(|e| CacheError::InvalidPattern(e.to_string()))?;
        let removed = store.write().invalidate(&regex);
        Ok(removed)
    }

    // == Stats ==
    /// Statistics for one namespace.
    ///
    /// Expired entries are purged first so size and count reflect live
    /// entries only.
    pub fn stats(&self, namespace: &str) -> Result<NamespaceStats> {
        let store = self.store(namespace)?;
        let now = self.clock.now_ms();
        let mut guard = store.write();
        guard.purge_expired(now);
        Ok(guard.stats())
    }

    /// Statistics for every namespace, keyed by name.
    pub fn all_stats(&self) -> HashMap<String, NamespaceStats> {
        let stores: Vec<(String, SharedStore<V>)> = self
            .namespaces
            .read()
            .iter()
            .map(|(name, store)| (name.clone(), store.clone()))
            .collect();
        let now = self.clock.now_ms();

        stores
            .into_iter()
            .map(|(name, store)| {
                let mut guard = store.write();
                guard.purge_expired(now);
                (name, guard.stats())
            })
            .collect()
    }

    // == Entries ==
    /// Metadata of the live entries in a namespace, sorted by key.
    pub fn entries(&self, namespace: &str) -> Result<Vec<EntryInfo>> {
        let store = self.store(namespace)?;
        let now = self.clock.now_ms();
        let infos = store.read().entries_info(now);
        Ok(infos)
    }

    // == Reap Expired ==
    /// Removes expired entries from every namespace. Returns the total
    /// removed.
    ///
    /// A namespace that panics while being swept is logged and skipped.
    pub fn reap_expired(&self) -> usize {
        let stores: Vec<(String, SharedStore<V>)> = self
            .namespaces
            .read()
            .iter()
            .map(|(name, store)| (name.clone(), store.clone()))
            .collect();

        let mut total = 0;
        for (name, store) in stores {
            let sweep = || {
                let now = self.clock.now_ms();
                store.write().purge_expired(now)
            };
            match catch_unwind(AssertUnwindSafe(sweep)) {
                Ok(removed) => total += removed,
                Err(_) => error!(namespace = %name, "Expiry sweep failed, continuing"),
            }
        }
        total
    }
}
