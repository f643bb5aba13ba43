//! # Flat Index
//!
//! Exhaustive scan: every value is measured on every query.
//!
//! This is the baseline the metric tree is checked and benchmarked against,
//! and a reasonable choice for very small collections.

use tracing::{trace, warn};

use crate::core::distance::measure;
use crate::core::{CancelToken, Distance, Found, Neighbor, RangeQuery, SearchStats};
use crate::ports::{Index, Insert, InsertResult, RangeSearch, SearchError, SearchResult};

/// Brute-force index
pub struct FlatIndex<V, D> {
    values: Vec<V>,
    metric: D,
}

impl<V, D: Distance<V>> FlatIndex<V, D> {
    pub fn new(metric: D) -> Self {
        Self {
            values: Vec::new(),
            metric,
        }
    }

    /// Create from existing values
    pub fn from_values(values: impl IntoIterator<Item = V>, metric: D) -> Self {
        Self {
            values: values.into_iter().collect(),
            metric,
        }
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }
}

impl<V, D: Distance<V>> Insert<V> for FlatIndex<V, D> {
    fn insert(&mut self, value: V) -> InsertResult<()> {
        self.values.push(value);
        Ok(())
    }

    fn rebuild(&mut self) -> InsertResult<()> {
        // Nothing to reorganise
        Ok(())
    }

    fn clear(&mut self) {
        self.values.clear();
    }

    fn len(&self) -> usize {
        self.values.len()
    }
}

impl<V, D: Distance<V>> RangeSearch<V> for FlatIndex<V, D> {
    fn search_with<'a>(
        &'a self,
        query: &RangeQuery<'_, V>,
        cancel: Option<&CancelToken>,
    ) -> SearchResult<Found<'a, V>> {
        let mut stats = SearchStats::default();
        let mut values = Vec::new();

        for value in &self.values {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                warn!(visited = stats.visited, "flat search cancelled");
                return Err(SearchError::Cancelled);
            }
            let d = measure(&self.metric, value, query.reference())?;
            stats.visited += 1;
            if query.contains(d) {
                values.push(value);
            }
        }

        stats.matched = values.len();
        trace!(visited = stats.visited, matched = stats.matched, "flat search complete");
        Ok(Found { values, stats })
    }

    fn nearest<'a>(&'a self, reference: &V, k: usize) -> SearchResult<Vec<Neighbor<'a, V>>> {
        let mut scored = self
            .values
            .iter()
            .map(|value| {
                measure(&self.metric, value, reference).map(|distance| Neighbor { value, distance })
            })
            .collect::<Result<Vec<_>, _>>()?;

        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(k);
        Ok(scored)
    }
}

impl<V, D: Distance<V>> Index<V> for FlatIndex<V, D> {
    fn kind(&self) -> &'static str {
        "flat"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::distance::{Absolute, DistanceError, Euclidean};

    #[test]
    fn test_flat_search() {
        let index = FlatIndex::from_values(vec![1.0, 2.0, 3.0, 10.0], Absolute);

        let mut found: Vec<f64> = index.search(&2.0, 0.0, 1.0).unwrap().into_iter().copied().collect();
        found.sort_by(f64::total_cmp);
        assert_eq!(found, vec![1.0, 2.0, 3.0]);

        assert_eq!(index.search(&2.0, 0.5, 1.0).unwrap().len(), 2);
    }

    #[test]
    fn test_flat_visits_everything() {
        let index = FlatIndex::from_values(vec![1.0, 2.0, 3.0], Absolute);
        let query = RangeQuery::new(&100.0, 0.0, 1.0).unwrap();
        let found = index.search_with(&query, None).unwrap();

        assert!(found.values.is_empty());
        assert_eq!(found.stats.visited, 3);
    }

    #[test]
    fn test_flat_nearest() {
        let mut index = FlatIndex::new(Euclidean);
        index.insert(vec![0.0, 0.0]).unwrap();
        index.insert(vec![3.0, 4.0]).unwrap();
        index.insert(vec![1.0, 1.0]).unwrap();

        let neighbors = index.nearest(&vec![0.0, 0.0], 2).unwrap();
        assert_eq!(neighbors.len(), 2);
        assert_eq!(neighbors[0].value, &vec![0.0, 0.0]);
        assert_eq!(neighbors[1].value, &vec![1.0, 1.0]);
    }

    #[test]
    fn test_flat_propagates_distance_error() {
        let index = FlatIndex::from_values(vec![vec![0.0, 0.0], vec![1.0]], Euclidean);
        let result = index.search(&vec![0.0, 0.0], 0.0, 5.0);
        assert!(matches!(
            result,
            Err(SearchError::Distance(DistanceError::DimensionMismatch { .. }))
        ));
    }

    #[test]
    fn test_flat_cancel_and_clear() {
        let mut index = FlatIndex::from_values(vec![1.0, 2.0], Absolute);
        let token = CancelToken::new();
        token.cancel();

        let query = RangeQuery::within(&1.0, 1.0).unwrap();
        assert!(matches!(index.search_with(&query, Some(&token)), Err(SearchError::Cancelled)));

        index.clear();
        assert!(index.is_empty());
    }
}
