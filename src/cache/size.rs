//! Size Estimation Module
//!
//! Byte-size estimates for budget accounting. Estimates only need to be
//! consistent for a given value, not exact.

use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;

use crate::error::{CacheError, Result};

// == Size Estimator Trait ==
/// Computes the accounted size of a value.
pub trait SizeEstimator<V>: Send + Sync {
    fn estimate(&self, value: &V) -> Result<u64>;
}

// == JSON Size Estimator ==
/// Sizes a value by the length of its JSON encoding.
pub struct JsonSizeEstimator<V> {
    _marker: PhantomData<fn(&V)>,
}

impl<V> JsonSizeEstimator<V> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<V> Default for JsonSizeEstimator<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for JsonSizeEstimator<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonSizeEstimator")
    }
}

impl<V: Serialize> SizeEstimator<V> for JsonSizeEstimator<V> {
    fn estimate(&self, value: &V) -> Result<u64> {
        serde_json::to_vec(value)
            .map(|bytes| bytes.len() as u64)
            .map_err(|e| CacheError::SizeEstimation(e.to_string()))
    }
}

// == Closure Size Estimator ==
/// Wraps a cheap caller-supplied size function.
pub struct FnSizeEstimator<F> {
    f: F,
}

impl<F> FnSizeEstimator<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for FnSizeEstimator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnSizeEstimator")
    }
}

impl<V, F> SizeEstimator<V> for FnSizeEstimator<F>
where
    F: Fn(&V) -> u64 + Send + Sync,
{
    fn estimate(&self, value: &V) -> Result<u64> {
        Ok((self.f)(value))
    }
}
