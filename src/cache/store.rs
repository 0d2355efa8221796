//! Namespace Store Module
//!
//! Keyed entries for a single namespace with TTL expiry and byte-budget
//! eviction. A store is not synchronised on its own; the registry wraps each
//! one in a lock.

use std::collections::HashMap;

use regex::Regex;
use tracing::debug;

use crate::cache::{CacheEntry, EntryInfo, NamespaceStats};
use crate::config::CacheConfig;

// == Namespace Store ==
/// Entries, configuration and running statistics of one namespace.
#[derive(Debug)]
pub struct NamespaceStore<V> {
    /// Namespace configuration
    config: CacheConfig,
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Running counters, including size and entry totals
    stats: NamespaceStats,
    /// Next write/access sequence number
    next_seq: u64,
    /// Bumped by every explicit removal (delete, clear, invalidate)
    generation: u64,
}

impl<V> NamespaceStore<V> {
    // == Constructor ==
    /// Creates an empty store for `config.namespace`.
    pub fn new(config: CacheConfig) -> Self {
        let stats = NamespaceStats::new(config.namespace.clone());
        Self {
            config,
            entries: HashMap::new(),
            stats,
            next_seq: 0,
            generation: 0,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Invalidation generation. Changes whenever entries are explicitly
    /// removed, never on eviction or expiry.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    // == Remove Entry ==
    /// Removes `key` and keeps the size/count totals in step.
    ///
    /// Every removal path goes through here so a removal is accounted once.
    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.stats.total_size_bytes = self.stats.total_size_bytes.saturating_sub(entry.size_bytes);
        self.stats.entry_count = self.entries.len();
        Some(entry)
    }

    // == Get ==
    /// Returns a clone of the live value for `key`.
    ///
    /// An expired entry is removed on the spot and counted as a miss.
    pub fn get(&mut self, key: &str, now_ms: u64) -> Option<V>
    where
        V: Clone,
    {
        let live = match self.entries.get(key) {
            Some(entry) => entry.is_live(now_ms),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if !live {
            self.remove_entry(key);
            self.stats.record_expiration();
            self.stats.record_miss();
            return None;
        }

        let seq = self.bump_seq();
        let entry = self.entries.get_mut(key)?;
        entry.record_hit(now_ms, seq);
        self.stats.record_hit();
        Some(entry.value.clone())
    }

    // == Contains ==
    /// Liveness probe that leaves counters and recency untouched.
    pub fn contains(&self, key: &str, now_ms: u64) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| entry.is_live(now_ms))
    }

    // == Set ==
    /// Stores `value` under `key`, evicting other entries first if the
    /// namespace budget would be exceeded.
    ///
    /// Expired entries are purged before any live entry is evicted. A value
    /// larger than the whole budget empties the namespace and is stored
    /// anyway, leaving the budget exceeded by that single entry.
    ///
    /// Returns the number of entries evicted.
    pub fn set(
        &mut self,
        key: String,
        value: V,
        size_bytes: u64,
        ttl_override: Option<u64>,
        now_ms: u64,
    ) -> usize {
        let ttl_seconds = ttl_override.unwrap_or(self.config.ttl_seconds);

        // Overwrite: the old size leaves before the new one is checked
        self.remove_entry(&key);

        let mut evicted = 0;
        if self.stats.total_size_bytes.saturating_add(size_bytes) > self.config.max_size_bytes {
            self.purge_expired(now_ms);
            let needed = self
                .stats
                .total_size_bytes
                .saturating_add(size_bytes)
                .saturating_sub(self.config.max_size_bytes);
            evicted = self.evict_bytes(needed);
        }

        let seq = self.bump_seq();
        let entry = CacheEntry::new(key.clone(), value, ttl_seconds, size_bytes, now_ms, seq);
        self.entries.insert(key, entry);
        self.stats.total_size_bytes = self.stats.total_size_bytes.saturating_add(size_bytes);
        self.stats.entry_count = self.entries.len();

        evicted
    }

    // == Evict Bytes ==
    /// Removes entries in strategy order until `needed` bytes are freed.
    fn evict_bytes(&mut self, needed: u64) -> usize {
        let victims = self
            .config
            .strategy
            .select_victims(self.entries.values(), needed);

        for key in &victims {
            if let Some(entry) = self.remove_entry(key) {
                self.stats.record_eviction();
                debug!(
                    namespace = %self.config.namespace,
                    key = %key,
                    size_bytes = entry.size_bytes,
                    strategy = %self.config.strategy,
                    "Evicted entry under budget pressure"
                );
            }
        }
        victims.len()
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether it was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.bump_generation();
        self.remove_entry(key).is_some()
    }

    // == Clear ==
    /// Drops every entry and resets size, count, eviction and expiry
    /// counters. Hits and misses survive.
    pub fn clear(&mut self) {
        self.bump_generation();
        self.entries.clear();
        self.stats.total_size_bytes = 0;
        self.stats.entry_count = 0;
        self.stats.evictions = 0;
        self.stats.expirations = 0;
    }

    // == Invalidate ==
    /// Removes every key matching `pattern`. Returns the count removed.
    pub fn invalidate(&mut self, pattern: &Regex) -> usize {
        self.bump_generation();
        let matching: Vec<String> = self
            .entries
            .keys()
            .filter(|key| pattern.is_match(key))
            .cloned()
            .collect();

        for key in &matching {
            self.remove_entry(key);
        }
        matching.len()
    }

    // == Purge Expired ==
    /// Removes all expired entries. Returns the number removed.
    ///
    /// Counts expirations, never evictions or misses.
    pub fn purge_expired(&mut self, now_ms: u64) -> usize {
        let expired: Vec<String> = self
            .entries
            .values()
            .filter(|entry| entry.is_expired(now_ms))
            .map(|entry| entry.key.clone())
            .collect();

        for key in &expired {
            if self.remove_entry(key).is_some() {
                self.stats.record_expiration();
            }
        }
        expired.len()
    }

    // == Reconfigure ==
    /// Replaces ttl, budget and strategy. Existing entries keep their own
    /// TTL. A smaller budget is enforced immediately.
    ///
    /// Returns the number of entries evicted to fit the new budget.
    pub fn reconfigure(&mut self, config: CacheConfig, now_ms: u64) -> usize {
        self.config = config;
        if self.stats.total_size_bytes <= self.config.max_size_bytes {
            return 0;
        }
        self.purge_expired(now_ms);
        let needed = self
            .stats
            .total_size_bytes
            .saturating_sub(self.config.max_size_bytes);
        self.evict_bytes(needed)
    }

    // == Stats ==
    /// Returns current statistics.
    pub fn stats(&self) -> NamespaceStats {
        self.stats.snapshot()
    }

    // == Entries ==
    /// Metadata of live entries, sorted by key.
    pub fn entries_info(&self, now_ms: u64) -> Vec<EntryInfo> {
        let mut infos: Vec<EntryInfo> = self
            .entries
            .values()
            .filter(|entry| entry.is_live(now_ms))
            .map(|entry| entry.info(now_ms))
            .collect();
        infos.sort_by(|a, b| a.key.cmp(&b.key));
        infos
    }

    // == Length ==
    /// Returns the number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn recomputed_size(&self) -> u64 {
        self.entries.values().map(|entry| entry.size_bytes).sum()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::EvictionStrategy;

    fn store(max_size_bytes: u64, strategy: EvictionStrategy) -> NamespaceStore<String> {
        NamespaceStore::new(CacheConfig::new("test", 60, max_size_bytes, strategy))
    }

    fn put(store: &mut NamespaceStore<String>, key: &str, size: u64, now: u64) -> usize {
        store.set(key.to_string(), format!("value_{key}"), size, None, now)
    }

    #[test]
    fn test_store_new() {
        let store = store(300, EvictionStrategy::Lru);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.stats().namespace, "test");
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store(300, EvictionStrategy::Lru);

        put(&mut store, "key1", 10, 0);
        assert_eq!(store.get("key1", 0), Some("value_key1".to_string()));

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entry_count, 1);
        assert_eq!(stats.total_size_bytes, 10);
    }

    #[test]
    fn test_store_get_nonexistent_counts_miss() {
        let mut store = store(300, EvictionStrategy::Lru);

        assert_eq!(store.get("nonexistent", 0), None);
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_overwrite_replaces_size() {
        let mut store = store(300, EvictionStrategy::Lru);

        put(&mut store, "key1", 50, 0);
        store.set("key1".to_string(), "second".to_string(), 20, None, 1);

        assert_eq!(store.get("key1", 2), Some("second".to_string()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().total_size_bytes, 20);
    }

    #[test]
    fn test_overwrite_does_not_evict_itself() {
        let mut store = store(100, EvictionStrategy::Lru);

        put(&mut store, "key1", 100, 0);
        let evicted = put(&mut store, "key1", 100, 1);

        assert_eq!(evicted, 0);
        assert_eq!(store.stats().evictions, 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_lazy_expiry_on_get() {
        let mut store = store(300, EvictionStrategy::Lru);
        store.set("key1".to_string(), "v".to_string(), 10, Some(1), 0);

        assert!(store.get("key1", 1_000).is_some());
        assert!(store.get("key1", 1_001).is_none());

        let stats = store.stats();
        assert_eq!(stats.entry_count, 0);
        assert_eq!(stats.total_size_bytes, 0);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 0);
    }

    #[test]
    fn test_lru_eviction_respects_recency() {
        let mut store = store(300, EvictionStrategy::Lru);

        put(&mut store, "a", 100, 0);
        put(&mut store, "b", 100, 1);
        put(&mut store, "c", 100, 2);
        store.get("a", 3);

        let evicted = put(&mut store, "d", 100, 4);

        assert_eq!(evicted, 1);
        assert!(store.contains("a", 5));
        assert!(!store.contains("b", 5));
        assert_eq!(store.stats().evictions, 1);
        assert_eq!(store.stats().total_size_bytes, 300);
    }

    #[test]
    fn test_expired_entries_purged_before_eviction() {
        let mut store = store(200, EvictionStrategy::Fifo);

        store.set("short".to_string(), "v".to_string(), 100, Some(1), 0);
        put(&mut store, "long", 100, 0);

        // "short" has expired; it makes room without counting as an eviction
        put(&mut store, "new", 100, 5_000);

        let stats = store.stats();
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.expirations, 1);
        assert!(store.contains("long", 5_000));
        assert!(store.contains("new", 5_000));
    }

    #[test]
    fn test_oversized_value_empties_namespace_and_is_kept() {
        let mut store = store(300, EvictionStrategy::Lru);

        put(&mut store, "a", 100, 0);
        put(&mut store, "b", 100, 1);
        let evicted = put(&mut store, "huge", 500, 2);

        assert_eq!(evicted, 2);
        assert_eq!(store.len(), 1);
        assert!(store.contains("huge", 3));
        assert_eq!(store.stats().total_size_bytes, 500);
    }

    #[test]
    fn test_huge_size_estimate_does_not_overflow() {
        let mut store = store(100, EvictionStrategy::Lru);

        put(&mut store, "huge", u64::MAX, 0);
        assert_eq!(store.stats().total_size_bytes, u64::MAX);

        let evicted = put(&mut store, "small", 1, 1);
        assert_eq!(evicted, 1);
        assert!(!store.contains("huge", 2));
        assert!(store.contains("small", 2));
        assert_eq!(store.stats().total_size_bytes, 1);
    }

    #[test]
    fn test_generation_moves_on_explicit_removal_only() {
        let mut store = store(200, EvictionStrategy::Fifo);
        let start = store.generation();

        put(&mut store, "a", 100, 0);
        put(&mut store, "b", 100, 0);
        put(&mut store, "c", 100, 0);
        store.get("b", 0);
        assert_eq!(store.generation(), start);

        // Deleting a missing key still counts, the backing record may exist
        store.delete("missing");
        assert_eq!(store.generation(), start + 1);

        store.invalidate(&Regex::new("^nothing$").unwrap());
        store.clear();
        assert_eq!(store.generation(), start + 3);
    }

    #[test]
    fn test_store_delete() {
        let mut store = store(300, EvictionStrategy::Lru);

        put(&mut store, "key1", 10, 0);
        assert!(store.delete("key1"));
        assert!(!store.delete("key1"));
        assert!(store.is_empty());
        assert_eq!(store.stats().total_size_bytes, 0);
    }

    #[test]
    fn test_clear_keeps_hits_and_misses() {
        let mut store = store(300, EvictionStrategy::Lru);

        put(&mut store, "a", 100, 0);
        put(&mut store, "b", 100, 0);
        put(&mut store, "c", 100, 0);
        put(&mut store, "d", 100, 0);
        store.get("b", 1);
        store.get("zzz", 1);

        store.clear();

        let stats = store.stats();
        assert_eq!(stats.entry_count, 0);
        assert_eq!(stats.total_size_bytes, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_invalidate_by_pattern() {
        let mut store = store(1_000, EvictionStrategy::Lru);

        put(&mut store, "listing:42", 10, 0);
        put(&mut store, "listing:43", 10, 0);
        put(&mut store, "profile:42", 10, 0);

        let pattern = Regex::new("listing:.*").unwrap();
        assert_eq!(store.invalidate(&pattern), 2);
        assert!(store.contains("profile:42", 0));
        assert_eq!(store.stats().total_size_bytes, 10);
    }

    #[test]
    fn test_purge_expired() {
        let mut store = store(1_000, EvictionStrategy::Lru);

        store.set("key1".to_string(), "v".to_string(), 10, Some(1), 0);
        store.set("key2".to_string(), "v".to_string(), 10, Some(10), 0);

        assert_eq!(store.purge_expired(1_100), 1);
        assert_eq!(store.len(), 1);

        let stats = store.stats();
        assert_eq!(stats.misses, 0, "reaping is not a read");
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.total_size_bytes, 10);
    }

    #[test]
    fn test_reconfigure_shrinks_budget() {
        let mut store = store(300, EvictionStrategy::Lru);

        put(&mut store, "a", 100, 0);
        put(&mut store, "b", 100, 1);
        put(&mut store, "c", 100, 2);

        let evicted = store.reconfigure(
            CacheConfig::new("test", 60, 150, EvictionStrategy::Fifo),
            3,
        );

        assert_eq!(evicted, 2);
        assert!(store.contains("c", 4));
        assert_eq!(store.stats().total_size_bytes, 100);
    }

    #[test]
    fn test_reconfigure_keeps_entry_ttl() {
        let mut store = store(300, EvictionStrategy::Lru);
        put(&mut store, "a", 10, 0);

        store.reconfigure(CacheConfig::new("test", 1, 300, EvictionStrategy::Lru), 0);

        assert!(store.contains("a", 30_000), "existing entry keeps its 60s TTL");
    }

    #[test]
    fn test_totals_match_entries_after_mixed_operations() {
        let mut store = store(250, EvictionStrategy::Lfu);

        for i in 0..20u64 {
            put(&mut store, &format!("k{}", i % 7), 30 + i, i);
            store.get(&format!("k{}", i % 3), i);
            if i % 5 == 0 {
                store.delete(&format!("k{}", i % 4));
            }
        }

        assert_eq!(store.stats().total_size_bytes, store.recomputed_size());
        assert_eq!(store.stats().entry_count, store.len());
    }

    #[test]
    fn test_entries_info_sorted_and_live_only() {
        let mut store = store(1_000, EvictionStrategy::Lru);
        put(&mut store, "b", 10, 0);
        put(&mut store, "a", 10, 0);
        store.set("gone".to_string(), "v".to_string(), 10, Some(1), 0);

        let keys: Vec<String> = store
            .entries_info(2_000)
            .into_iter()
            .map(|info| info.key)
            .collect();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }
}
