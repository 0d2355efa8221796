//! Cache Module
//!
//! Namespace-aware in-memory caching with TTL expiration, byte budgets and
//! pluggable eviction.

mod clock;
mod entry;
mod eviction;
mod registry;
mod size;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use entry::{CacheEntry, EntryInfo};
pub use eviction::EvictionStrategy;
pub use registry::CacheRegistry;
pub use size::{FnSizeEstimator, JsonSizeEstimator, SizeEstimator};
pub use stats::NamespaceStats;
pub use store::NamespaceStore;
