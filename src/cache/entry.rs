//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use serde::Serialize;

// == Cache Entry ==
/// A single cached value and the metadata eviction policies rank it by.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The key this entry is stored under
    pub key: String,
    /// The stored value
    pub value: V,
    /// Time of the last write (clock milliseconds)
    pub inserted_at_ms: u64,
    /// Time of the last write or successful read (clock milliseconds)
    pub last_accessed_ms: u64,
    /// Lifetime in seconds, measured from `inserted_at_ms`
    pub ttl_seconds: u64,
    /// Number of successful reads since the last write
    pub hit_count: u64,
    /// Estimated serialized size
    pub size_bytes: u64,
    /// Namespace-local write sequence; orders entries with equal timestamps
    pub inserted_seq: u64,
    /// Namespace-local access sequence, bumped on every write and hit
    pub accessed_seq: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a fresh entry written at `now_ms` with sequence number `seq`.
    pub fn new(key: String, value: V, ttl_seconds: u64, size_bytes: u64, now_ms: u64, seq: u64) -> Self {
        Self {
            key,
            value,
            inserted_at_ms: now_ms,
            last_accessed_ms: now_ms,
            ttl_seconds,
            hit_count: 0,
            size_bytes,
            inserted_seq: seq,
            accessed_seq: seq,
        }
    }

    // == Is Live ==
    /// An entry is live while `now - inserted_at <= ttl`.
    ///
    /// The boundary instant itself is still live; one millisecond later the
    /// entry is expired.
    pub fn is_live(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.inserted_at_ms) <= self.ttl_seconds.saturating_mul(1000)
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        !self.is_live(now_ms)
    }

    // == Record Hit ==
    /// Marks a successful read.
    pub fn record_hit(&mut self, now_ms: u64, seq: u64) {
        self.hit_count += 1;
        self.last_accessed_ms = now_ms;
        self.accessed_seq = seq;
    }

    // == Time To Live ==
    /// Remaining lifetime in milliseconds; 0 once expired.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        let expires_at = self
            .inserted_at_ms
            .saturating_add(self.ttl_seconds.saturating_mul(1000));
        expires_at.saturating_sub(now_ms)
    }

    /// Metadata view without the value.
    pub fn info(&self, now_ms: u64) -> EntryInfo {
        EntryInfo {
            key: self.key.clone(),
            size_bytes: self.size_bytes,
            hit_count: self.hit_count,
            ttl_seconds: self.ttl_seconds,
            ttl_remaining_ms: self.ttl_remaining_ms(now_ms),
        }
    }
}

// == Entry Info ==
/// Value-less snapshot of an entry, used for inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryInfo {
    pub key: String,
    pub size_bytes: u64,
    pub hit_count: u64,
    pub ttl_seconds: u64,
    pub ttl_remaining_ms: u64,
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ttl: u64, now: u64) -> CacheEntry<String> {
        CacheEntry::new("k".to_string(), "v".to_string(), ttl, 1, now, 0)
    }

    #[test]
    fn test_entry_creation() {
        let entry = entry(60, 1_000);

        assert_eq!(entry.value, "v");
        assert_eq!(entry.hit_count, 0);
        assert_eq!(entry.inserted_at_ms, 1_000);
        assert_eq!(entry.last_accessed_ms, 1_000);
        assert!(entry.is_live(1_000));
    }

    #[test]
    fn test_live_until_boundary_inclusive() {
        let entry = entry(10, 0);

        assert!(entry.is_live(9_999));
        assert!(entry.is_live(10_000), "boundary instant is still live");
        assert!(entry.is_expired(10_001));
    }

    #[test]
    fn test_record_hit_updates_access_metadata() {
        let mut entry = entry(10, 0);
        entry.record_hit(500, 7);
        entry.record_hit(600, 9);

        assert_eq!(entry.hit_count, 2);
        assert_eq!(entry.last_accessed_ms, 600);
        assert_eq!(entry.accessed_seq, 9);
        assert_eq!(entry.inserted_seq, 0);
        assert_eq!(entry.inserted_at_ms, 0, "reads never extend the TTL");
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = entry(10, 1_000);

        assert_eq!(entry.ttl_remaining_ms(1_000), 10_000);
        assert_eq!(entry.ttl_remaining_ms(6_000), 5_000);
        assert_eq!(entry.ttl_remaining_ms(50_000), 0);
    }

    #[test]
    fn test_info_snapshot() {
        let mut entry = entry(10, 0);
        entry.record_hit(100, 1);

        let info = entry.info(4_000);
        assert_eq!(info.key, "k");
        assert_eq!(info.hit_count, 1);
        assert_eq!(info.ttl_remaining_ms, 6_000);
    }
}
