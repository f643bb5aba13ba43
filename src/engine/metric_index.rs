//! # MetricIndex Engine
//!
//! The main orchestrator.
//!
//! This struct wires together:
//! - An index adapter (Insert + RangeSearch ports)
//! - Configuration
//! - The rebuild policy
//!
//! And exposes a unified API for storing and querying values.

use tracing::{debug, warn};

use crate::adapters::index::MetricTree;
use crate::core::{CancelToken, Distance, Found, Neighbor, RangeQuery, TreeConfig};
use crate::ports::{Index, Insert, InsertResult, RangeSearch, SearchResult};

/// The main engine
///
/// Owns one index adapter and applies the configured maintenance policy.
pub struct MetricIndex<V> {
    /// Configuration
    config: TreeConfig,

    /// Index backend
    index: Box<dyn Index<V>>,

    /// Incremental inserts since the last (re)build
    pending_inserts: usize,
}

impl<V: 'static> MetricIndex<V> {
    /// Create an engine backed by an empty [`MetricTree`]
    pub fn new<D>(metric: D, config: TreeConfig) -> Self
    where
        D: Distance<V> + 'static,
    {
        let index = Box::new(MetricTree::with_config(metric, config.clone()));
        Self::with_adapter(config, index)
    }

    /// Create with a custom adapter
    pub fn with_adapter(config: TreeConfig, index: Box<dyn Index<V>>) -> Self {
        Self {
            config,
            index,
            pending_inserts: 0,
        }
    }
}

impl<V> MetricIndex<V> {
    /// Get the configuration
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Name of the active adapter
    pub fn backend(&self) -> &'static str {
        self.index.kind()
    }

    // ========================================================================
    // INSERT OPERATIONS
    // ========================================================================

    /// Insert a value
    ///
    /// Triggers a rebuild once `rebuild_after` inserts have accumulated. The
    /// value is stored even if that rebuild fails: the failure is logged, the
    /// index keeps its previous shape and the counter starts over.
    pub fn insert(&mut self, value: V) -> InsertResult<()> {
        self.index.insert(value)?;
        self.pending_inserts += 1;

        if let Some(threshold) = self.config.rebuild_after {
            if self.pending_inserts >= threshold {
                debug!(
                    backend = self.index.kind(),
                    inserts = self.pending_inserts,
                    "rebuild threshold reached"
                );
                if let Err(e) = self.rebuild() {
                    warn!(backend = self.index.kind(), error = %e, "automatic rebuild failed");
                    self.pending_inserts = 0;
                }
            }
        }
        Ok(())
    }

    /// Insert several values, stopping at the first failure
    pub fn insert_batch(&mut self, values: impl IntoIterator<Item = V>) -> InsertResult<usize> {
        let mut inserted = 0;
        for value in values {
            self.insert(value)?;
            inserted += 1;
        }
        Ok(inserted)
    }

    /// Reorganise the index from its current contents
    pub fn rebuild(&mut self) -> InsertResult<()> {
        self.index.rebuild()?;
        self.pending_inserts = 0;
        Ok(())
    }

    /// Remove every value
    pub fn clear(&mut self) {
        self.index.clear();
        self.pending_inserts = 0;
    }

    /// Get the number of stored values
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Inserts waiting for the next rebuild
    pub fn pending_inserts(&self) -> usize {
        self.pending_inserts
    }

    // ========================================================================
    // SEARCH OPERATIONS
    // ========================================================================

    /// All values with `min_dist <= distance <= max_dist`
    pub fn search(&self, reference: &V, min_dist: f64, max_dist: f64) -> SearchResult<Vec<&V>> {
        self.index.search(reference, min_dist, max_dist)
    }

    /// All values within `radius`
    pub fn within(&self, reference: &V, radius: f64) -> SearchResult<Vec<&V>> {
        self.index.within(reference, radius)
    }

    /// Range search with statistics and cooperative cancellation
    pub fn search_cancellable(
        &self,
        reference: &V,
        min_dist: f64,
        max_dist: f64,
        cancel: &CancelToken,
    ) -> SearchResult<Found<'_, V>> {
        let query = RangeQuery::new(reference, min_dist, max_dist)?;
        self.index.search_with(&query, Some(cancel))
    }

    /// Find the k nearest values
    pub fn nearest(&self, reference: &V, k: usize) -> SearchResult<Vec<Neighbor<'_, V>>> {
        self.index.nearest(reference, k)
    }
}
