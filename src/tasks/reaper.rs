//! Expiry Reaper
//!
//! Background task that periodically removes expired entries from every
//! namespace.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::CacheRegistry;

/// Sweep interval used when none is configured.
pub const DEFAULT_REAP_INTERVAL: Duration = Duration::from_secs(60);

// == Reaper Handle ==
/// Owner handle of a running reaper.
#[derive(Debug)]
pub struct ReaperHandle {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl ReaperHandle {
    /// Signals the reaper to stop and waits for it to exit.
    ///
    /// A sweep already in progress finishes first.
    pub async fn stop(self) {
        self.token.cancel();
        if let Err(e) = self.handle.await {
            warn!(error = %e, "Expiry reaper ended abnormally");
        }
    }

    /// Token that stops the reaper when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Spawns a background task that sweeps expired entries every `interval`.
///
/// Each sweep takes every namespace's lock in turn, so it serialises with
/// foreground operations on that namespace only. Expired entries removed
/// here count as expirations, never as evictions or misses.
///
/// # Example
/// ```ignore
/// let registry = Arc::new(CacheRegistry::<serde_json::Value>::new());
/// let reaper = spawn_reaper(registry.clone(), DEFAULT_REAP_INTERVAL);
/// // Later, during shutdown:
/// reaper.stop().await;
/// ```
pub fn spawn_reaper<V>(registry: Arc<CacheRegistry<V>>, interval: Duration) -> ReaperHandle
where
    V: Send + Sync + 'static,
{
    let token = CancellationToken::new();
    let cancelled = token.clone();

    let handle = tokio::spawn(async move {
        info!(
            "Starting expiry reaper with interval of {} ms",
            interval.as_millis()
        );

        loop {
            tokio::select! {
                _ = cancelled.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            let removed = registry.reap_expired();

            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }

        info!("Expiry reaper stopped");
    });

    ReaperHandle { token, handle }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{EvictionStrategy, FnSizeEstimator, ManualClock};
    use crate::config::CacheConfig;

    fn registry(clock: Arc<ManualClock>) -> Arc<CacheRegistry<String>> {
        let registry = CacheRegistry::<String>::with_size_estimator(Arc::new(
            FnSizeEstimator::new(|v: &String| v.len() as u64),
        ))
        .with_clock(clock);
        registry
            .register_namespace(CacheConfig::new("ns", 300, 1_000, EvictionStrategy::Lru))
            .unwrap();
        Arc::new(registry)
    }

    #[tokio::test]
    async fn test_reaper_removes_expired_entries() {
        let clock = Arc::new(ManualClock::new(0));
        let registry = registry(clock.clone());

        registry
            .set("ns", "expire_soon", "value".to_string(), Some(1))
            .unwrap();
        clock.advance_secs(2);

        let reaper = spawn_reaper(registry.clone(), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(100)).await;
        reaper.stop().await;

        // Probe without a read so the reaper, not a lazy miss, did the work
        assert!(!registry.contains("ns", "expire_soon").unwrap());
        let stats = registry.stats("ns").unwrap();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.total_size_bytes, 0);
    }

    #[tokio::test]
    async fn test_reaper_preserves_live_entries() {
        let clock = Arc::new(ManualClock::new(0));
        let registry = registry(clock.clone());

        registry
            .set("ns", "long_lived", "value".to_string(), Some(3600))
            .unwrap();
        clock.advance_secs(10);

        let reaper = spawn_reaper(registry.clone(), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(100)).await;
        reaper.stop().await;

        assert_eq!(
            registry.get("ns", "long_lived").unwrap(),
            Some("value".to_string())
        );
    }

    #[tokio::test]
    async fn test_reaper_stops_on_cancel() {
        let registry = registry(Arc::new(ManualClock::new(0)));

        let reaper = spawn_reaper(registry, DEFAULT_REAP_INTERVAL);
        let token = reaper.cancellation_token();
        token.cancel();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(reaper.is_finished(), "Reaper should exit after cancellation");
        reaper.stop().await;
    }
}
