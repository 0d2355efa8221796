//! Access Tracker
//!
//! Fire-and-forget reporting of cache hits, misses and writes to an external
//! analytics sink. Events go through a bounded queue drained by a worker
//! task, so a slow or failing sink never reaches the cache hot path.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Upper bound on a single sink call.
const SINK_TIMEOUT: Duration = Duration::from_secs(5);

// == Access Kind ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessKind {
    Hit,
    Miss,
    Write,
}

// == Access Event ==
/// One cache access as reported to the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessEvent {
    pub namespace: String,
    pub key: String,
    pub kind: AccessKind,
    pub recorded_at: DateTime<Utc>,
}

// == Tracker Error ==
#[derive(Error, Debug)]
pub enum TrackerError {
    /// The sink rejected or failed to store the event
    #[error("Access sink failed: {0}")]
    Sink(String),
}

// == Access Sink ==
/// Destination for access events, typically an analytics table.
#[async_trait]
pub trait AccessSink: Send + Sync {
    async fn record(&self, event: &AccessEvent) -> Result<(), TrackerError>;
}

/// Sink that writes events to the log at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl AccessSink for LogSink {
    async fn record(&self, event: &AccessEvent) -> Result<(), TrackerError> {
        debug!(
            namespace = %event.namespace,
            key = %event.key,
            kind = ?event.kind,
            "Cache access"
        );
        Ok(())
    }
}

// == Access Tracker ==
/// Cloneable handle that enqueues access events.
///
/// The worker exits once every handle has been dropped and the queue is
/// drained.
#[derive(Debug, Clone)]
pub struct AccessTracker {
    tx: mpsc::Sender<AccessEvent>,
}

impl AccessTracker {
    /// Spawns the draining worker and returns a handle to feed it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(sink: Arc<dyn AccessSink>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<AccessEvent>(capacity.max(1));

        let handle = tokio::spawn(async move {
            info!("Access tracker started with queue capacity {}", capacity.max(1));
            while let Some(event) = rx.recv().await {
                deliver(sink.as_ref(), &event).await;
            }
            info!("Access tracker stopped");
        });

        (Self { tx }, handle)
    }

    // == Record ==
    /// Queues an event without waiting. Events are dropped when the queue
    /// is full or the worker is gone.
    pub fn record(&self, namespace: &str, key: &str, kind: AccessKind) {
        let event = AccessEvent {
            namespace: namespace.to_string(),
            key: key.to_string(),
            kind,
            recorded_at: Utc::now(),
        };

        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                debug!(namespace = %event.namespace, key = %event.key, "Access queue full, dropping event");
            }
            Err(TrySendError::Closed(event)) => {
                debug!(namespace = %event.namespace, key = %event.key, "Access tracker closed, dropping event");
            }
        }
    }
}

/// Runs one sink call with timeout and panic isolation. Never fails.
async fn deliver(sink: &dyn AccessSink, event: &AccessEvent) {
    let result = tokio::time::timeout(
        SINK_TIMEOUT,
        AssertUnwindSafe(sink.record(event)).catch_unwind(),
    )
    .await;

    match result {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => {
            warn!(namespace = %event.namespace, key = %event.key, error = %e, "Access sink failed");
        }
        Ok(Err(_panic)) => {
            error!(namespace = %event.namespace, key = %event.key, "Access sink panicked");
        }
        Err(_) => {
            warn!(
                namespace = %event.namespace,
                timeout_secs = SINK_TIMEOUT.as_secs(),
                "Access sink timed out"
            );
        }
    }
}
