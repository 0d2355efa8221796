//! Eviction Policy Module
//!
//! Orders a namespace's entries for removal when its byte budget is exceeded.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cache::CacheEntry;

// == Eviction Strategy ==
/// Ordering policy used to pick budget-eviction victims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionStrategy {
    /// Least recently used: oldest write-or-hit goes first
    #[serde(alias = "LRU")]
    Lru,
    /// Least frequently used: fewest hits goes first, oldest write breaks ties
    #[serde(alias = "LFU")]
    Lfu,
    /// First in, first out: oldest write goes first, reads are ignored
    #[serde(alias = "FIFO")]
    Fifo,
}

impl fmt::Display for EvictionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EvictionStrategy::Lru => "lru",
            EvictionStrategy::Lfu => "lfu",
            EvictionStrategy::Fifo => "fifo",
        };
        f.write_str(name)
    }
}

impl EvictionStrategy {
    // == Rank ==
    /// Sort key for an entry; smaller ranks are evicted first.
    ///
    /// The trailing sequence numbers are unique per namespace, so the order
    /// is total and deterministic.
    fn rank<V>(&self, entry: &CacheEntry<V>) -> (u64, u64, u64) {
        match self {
            EvictionStrategy::Lru => (entry.accessed_seq, entry.inserted_seq, 0),
            EvictionStrategy::Lfu => (entry.hit_count, entry.inserted_at_ms, entry.inserted_seq),
            EvictionStrategy::Fifo => (entry.inserted_seq, 0, 0),
        }
    }

    // == Select Victims ==
    /// Picks keys to remove, front of the order first, until at least
    /// `bytes_needed` would be freed.
    ///
    /// If the candidates together are smaller than `bytes_needed`, every
    /// candidate is returned.
    pub fn select_victims<'a, V: 'a>(
        &self,
        entries: impl IntoIterator<Item = &'a CacheEntry<V>>,
        bytes_needed: u64,
    ) -> Vec<String> {
        if bytes_needed == 0 {
            return Vec::new();
        }

        let mut candidates: Vec<&CacheEntry<V>> = entries.into_iter().collect();
        candidates.sort_by_key(|entry| self.rank(entry));

        let mut freed = 0u64;
        let mut victims = Vec::new();
        for entry in candidates {
            if freed >= bytes_needed {
                break;
            }
            freed = freed.saturating_add(entry.size_bytes);
            victims.push(entry.key.clone());
        }
        victims
    }
}
