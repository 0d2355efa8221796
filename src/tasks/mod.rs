//! Background Tasks Module
//!
//! Contains work that runs alongside request handling.
//!
//! # Tasks
//! - Expiry reaper: removes TTL-expired entries on a fixed interval
//! - Access tracker: drains cache access events to an analytics sink

mod reaper;
mod tracker;

pub use reaper::{spawn_reaper, ReaperHandle, DEFAULT_REAP_INTERVAL};
pub use tracker::{AccessEvent, AccessKind, AccessSink, AccessTracker, LogSink, TrackerError};
