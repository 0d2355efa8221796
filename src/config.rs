//! Configuration Module
//!
//! Process configuration loaded from environment variables, and the static
//! table of namespace definitions registered at startup.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::EvictionStrategy;
use crate::error::{CacheError, Result};

// == Namespace Names ==
pub const LISTINGS_NAMESPACE: &str = "listings";
pub const PROFILES_NAMESPACE: &str = "profiles";
pub const CATEGORIES_NAMESPACE: &str = "categories";
pub const SEARCH_NAMESPACE: &str = "search";

const MIB: u64 = 1024 * 1024;

// == Cache Config ==
/// Configuration of one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Unique namespace name
    pub namespace: String,
    /// Default entry lifetime in seconds
    pub ttl_seconds: u64,
    /// Byte budget that triggers eviction when exceeded
    pub max_size_bytes: u64,
    /// Eviction ordering
    pub strategy: EvictionStrategy,
}

impl CacheConfig {
    pub fn new(
        namespace: impl Into<String>,
        ttl_seconds: u64,
        max_size_bytes: u64,
        strategy: EvictionStrategy,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            ttl_seconds,
            max_size_bytes,
            strategy,
        }
    }

    // == Validate ==
    /// Rejects empty names and zero TTLs or budgets.
    pub fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            return Err(CacheError::InvalidConfig(
                "namespace cannot be empty".to_string(),
            ));
        }
        if self.ttl_seconds == 0 {
            return Err(CacheError::InvalidConfig(format!(
                "ttl_seconds must be positive for namespace '{}'",
                self.namespace
            )));
        }
        if self.max_size_bytes == 0 {
            return Err(CacheError::InvalidConfig(format!(
                "max_size_bytes must be positive for namespace '{}'",
                self.namespace
            )));
        }
        Ok(())
    }
}

/// Process configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP admin server port
    pub server_port: u16,
    /// Expiry reaper interval in seconds
    pub reap_interval: u64,
    /// Bounded queue size for access-tracking events
    pub tracker_queue_capacity: usize,
    /// Backing-store fetch timeout in milliseconds, applied by
    /// `DataService::from_config`. The admin binary serves no data reads and
    /// leaves it unused.
    pub fetch_timeout_ms: u64,
    /// Namespaces registered at startup
    pub namespaces: Vec<CacheConfig>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `REAP_INTERVAL` - Expiry sweep frequency in seconds (default: 60)
    /// - `TRACKER_QUEUE_CAPACITY` - Access event queue size (default: 1024)
    /// - `FETCH_TIMEOUT_MS` - Backing-store fetch timeout (default: 5000)
    /// - `CACHE_NAMESPACES` - JSON array of namespace configs replacing the
    ///   built-in table
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_env("SERVER_PORT").unwrap_or(defaults.server_port),
            reap_interval: parse_env("REAP_INTERVAL").unwrap_or(defaults.reap_interval),
            tracker_queue_capacity: parse_env("TRACKER_QUEUE_CAPACITY")
                .unwrap_or(defaults.tracker_queue_capacity),
            fetch_timeout_ms: parse_env("FETCH_TIMEOUT_MS").unwrap_or(defaults.fetch_timeout_ms),
            namespaces: env::var("CACHE_NAMESPACES")
                .ok()
                .and_then(|raw| parse_namespaces(&raw))
                .unwrap_or(defaults.namespaces),
        }
    }

    // == Default Namespaces ==
    /// Built-in namespace table: slow-changing data lives longer, volatile
    /// search results expire quickly.
    pub fn default_namespaces() -> Vec<CacheConfig> {
        vec![
            CacheConfig::new(LISTINGS_NAMESPACE, 300, 10 * MIB, EvictionStrategy::Lru),
            CacheConfig::new(PROFILES_NAMESPACE, 600, 5 * MIB, EvictionStrategy::Lru),
            CacheConfig::new(CATEGORIES_NAMESPACE, 3600, MIB, EvictionStrategy::Lfu),
            CacheConfig::new(SEARCH_NAMESPACE, 60, 10 * MIB, EvictionStrategy::Fifo),
        ]
    }

    pub fn reap_interval(&self) -> Duration {
        Duration::from_secs(self.reap_interval)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            reap_interval: 60,
            tracker_queue_capacity: 1024,
            fetch_timeout_ms: 5000,
            namespaces: Self::default_namespaces(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn parse_namespaces(raw: &str) -> Option<Vec<CacheConfig>> {
    match serde_json::from_str::<Vec<CacheConfig>>(raw) {
        Ok(namespaces) => Some(namespaces),
        Err(e) => {
            warn!(error = %e, "Ignoring malformed CACHE_NAMESPACES, using built-in table");
            None
        }
    }
}
