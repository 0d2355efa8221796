//! Cache Statistics Module
//!
//! Tracks per-namespace performance metrics including hits, misses and evictions.

use serde::Serialize;

// == Namespace Stats ==
/// Counters for one namespace.
///
/// `hits` and `misses` are lifetime counters; `clear` leaves them alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NamespaceStats {
    /// Namespace these counters belong to
    pub namespace: String,
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// hits / (hits + misses), 0 when no reads happened
    pub hit_rate: f64,
    /// Sum of `size_bytes` over live entries
    pub total_size_bytes: u64,
    /// Number of live entries
    pub entry_count: usize,
    /// Entries removed to satisfy the byte budget
    pub evictions: u64,
    /// Entries removed because their TTL elapsed
    pub expirations: u64,
}

impl NamespaceStats {
    // == Constructor ==
    /// Creates zeroed counters for `namespace`.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn compute_hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    // == Snapshot ==
    /// Copy with `hit_rate` filled in.
    pub fn snapshot(&self) -> Self {
        let mut stats = self.clone();
        stats.hit_rate = self.compute_hit_rate();
        stats
    }
}
