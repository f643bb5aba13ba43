//! # Ports
//!
//! Trait contracts between the engine and the index adapters.
//!
//! - `Insert`: put values into an index, reorganise it
//! - `RangeSearch`: ask which values lie in a distance window
//! - `Index`: anything that does both
//!
//! Adapters implement these; the engine only ever talks to the traits.

use thiserror::Error;

use crate::core::{CancelToken, DistanceError, Found, InvalidRange, Neighbor, RangeQuery};

// ============================================================================
// ERRORS
// ============================================================================

/// Why a search produced no result
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// Window rejected before any traversal
    #[error(transparent)]
    InvalidRange(#[from] InvalidRange),

    /// The metric failed on some stored value; no partial result is kept
    #[error("distance computation failed: {0}")]
    Distance(#[from] DistanceError),

    /// A `CancelToken` fired mid-search
    #[error("search cancelled")]
    Cancelled,
}

pub type SearchResult<T> = Result<T, SearchError>;

/// Why an insert or rebuild failed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InsertError {
    #[error("distance computation failed during insert: {0}")]
    Distance(#[from] DistanceError),
}

pub type InsertResult<T> = Result<T, InsertError>;

// ============================================================================
// TRAITS
// ============================================================================

/// Putting values into an index
pub trait Insert<V> {
    /// Add one value
    fn insert(&mut self, value: V) -> InsertResult<()>;

    /// Reorganise the whole index from its current contents
    fn rebuild(&mut self) -> InsertResult<()>;

    /// Drop every value
    fn clear(&mut self);

    /// Number of stored values
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Asking an index what lies near a reference
pub trait RangeSearch<V> {
    /// Run a validated range query
    ///
    /// `cancel` is checked once per unit of work; a fired token aborts the
    /// search with [`SearchError::Cancelled`].
    fn search_with<'a>(
        &'a self,
        query: &RangeQuery<'_, V>,
        cancel: Option<&CancelToken>,
    ) -> SearchResult<Found<'a, V>>;

    /// The `k` values closest to `reference`, nearest first
    fn nearest<'a>(&'a self, reference: &V, k: usize) -> SearchResult<Vec<Neighbor<'a, V>>>;

    /// All values with `min_dist <= d(value, reference) <= max_dist`
    fn search(&self, reference: &V, min_dist: f64, max_dist: f64) -> SearchResult<Vec<&V>> {
        let query = RangeQuery::new(reference, min_dist, max_dist)?;
        Ok(self.search_with(&query, None)?.values)
    }

    /// All values within `radius` of `reference`
    fn within(&self, reference: &V, radius: f64) -> SearchResult<Vec<&V>> {
        self.search(reference, 0.0, radius)
    }
}

/// A complete index adapter
pub trait Index<V>: Insert<V> + RangeSearch<V> {
    /// Adapter name (for logs)
    fn kind(&self) -> &'static str;
}
