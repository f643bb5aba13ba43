//! # Query
//!
//! Ephemeral search context: what to look for, how far, and whether to stop.
//! Nothing here is stored in the tree.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

/// Rejected distance window
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("invalid distance range: [{min_dist}, {max_dist}]")]
pub struct InvalidRange {
    pub min_dist: f64,
    pub max_dist: f64,
}

/// A range query: every value `v` with `min_dist <= d(v, reference) <= max_dist`
///
/// Validated on construction, so a search never starts with a bad window.
#[derive(Debug)]
pub struct RangeQuery<'q, V> {
    reference: &'q V,
    min_dist: f64,
    max_dist: f64,
}

// Manual impls: the query only borrows `V`, so it is Copy for any `V`
impl<V> Clone for RangeQuery<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for RangeQuery<'_, V> {}

impl<'q, V> RangeQuery<'q, V> {
    /// Create a query over the inclusive window `[min_dist, max_dist]`
    ///
    /// Fails when `min_dist > max_dist` or either bound is NaN.
    pub fn new(reference: &'q V, min_dist: f64, max_dist: f64) -> Result<Self, InvalidRange> {
        if min_dist.is_nan() || max_dist.is_nan() || min_dist > max_dist {
            return Err(InvalidRange { min_dist, max_dist });
        }
        Ok(Self {
            reference,
            min_dist,
            max_dist,
        })
    }

    /// Everything within `radius` of the reference
    pub fn within(reference: &'q V, radius: f64) -> Result<Self, InvalidRange> {
        Self::new(reference, 0.0, radius)
    }

    pub fn reference(&self) -> &'q V {
        self.reference
    }

    pub fn min_dist(&self) -> f64 {
        self.min_dist
    }

    pub fn max_dist(&self) -> f64 {
        self.max_dist
    }

    /// Is a measured distance inside the window?
    pub fn contains(&self, distance: f64) -> bool {
        self.min_dist <= distance && distance <= self.max_dist
    }
}

/// Cooperative cancellation flag
///
/// Clones share the same flag. Searches check it once per worklist step.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every search holding this token
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Work done by one search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes (or values, for flat scans) whose distance was computed
    pub visited: usize,
    /// Values returned
    pub matched: usize,
    /// Largest worklist length seen
    pub peak_pending: usize,
}

/// Values found by a range search, with the work it took
#[derive(Debug)]
pub struct Found<'a, V> {
    pub values: Vec<&'a V>,
    pub stats: SearchStats,
}

/// A nearest-neighbour hit
#[derive(Debug, PartialEq)]
pub struct Neighbor<'a, V> {
    pub value: &'a V,
    pub distance: f64,
}

impl<V> Clone for Neighbor<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Neighbor<'_, V> {}
