//! # Python Bindings
//!
//! PyO3 bindings for fuzzy string lookup over a metric tree.
//!
//! ## Python API
//!
//! ```python
//! from metric_tree import FuzzyIndex
//!
//! # Build from a word list (Levenshtein distance)
//! index = FuzzyIndex(["book", "books", "cake", "boo", "cook"])
//!
//! # Add more words
//! index.add("hook")
//!
//! # Every word within one edit
//! index.within("bool", 1)
//!
//! # Every word between one and two edits away
//! index.search("bool", 1, 2)
//!
//! # The three closest words, with distances
//! for word, distance in index.nearest("bool", 3):
//!     print(word, distance)
//! ```

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::adapters::index::MetricTree;
use crate::core::distance::Levenshtein;
use crate::core::TreeConfig;
use crate::ports::{Insert, RangeSearch};

fn value_error(e: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(format!("{}", e))
}

/// Fuzzy string index
///
/// Stores words in a metric tree keyed by Levenshtein edit distance.
#[pyclass(name = "FuzzyIndex")]
pub struct PyFuzzyIndex {
    inner: MetricTree<String, Levenshtein>,
}

#[pymethods]
impl PyFuzzyIndex {
    /// Create an index, optionally from an initial word list
    ///
    /// Args:
    ///     words: Optional list of strings, built as a balanced tree
    #[new]
    #[pyo3(signature = (words=None))]
    fn new(words: Option<Vec<String>>) -> PyResult<Self> {
        let inner = match words {
            Some(words) => {
                MetricTree::build(words, Levenshtein, TreeConfig::default()).map_err(value_error)?
            }
            None => MetricTree::new(Levenshtein),
        };
        Ok(Self { inner })
    }

    /// Add a word
    fn add(&mut self, word: String) -> PyResult<()> {
        self.inner.insert(word).map_err(value_error)
    }

    /// Words whose edit distance from `reference` lies in [min_dist, max_dist]
    ///
    /// Raises:
    ///     ValueError: if min_dist > max_dist
    fn search(&self, reference: String, min_dist: f64, max_dist: f64) -> PyResult<Vec<String>> {
        let found = self
            .inner
            .search(&reference, min_dist, max_dist)
            .map_err(value_error)?;
        Ok(found.into_iter().cloned().collect())
    }

    /// Words within `radius` edits of `reference`
    fn within(&self, reference: String, radius: f64) -> PyResult<Vec<String>> {
        let found = self.inner.within(&reference, radius).map_err(value_error)?;
        Ok(found.into_iter().cloned().collect())
    }

    /// The `k` closest words as (word, distance) pairs, closest first
    fn nearest(&self, reference: String, k: usize) -> PyResult<Vec<(String, f64)>> {
        let neighbors = self.inner.nearest(&reference, k).map_err(value_error)?;
        Ok(neighbors
            .into_iter()
            .map(|n| (n.value.clone(), n.distance))
            .collect())
    }

    /// Rebalance the tree after many additions
    fn rebuild(&mut self) -> PyResult<()> {
        self.inner.rebuild().map_err(value_error)
    }

    /// Longest root-to-leaf path
    fn depth(&self) -> usize {
        self.inner.depth()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "FuzzyIndex(words={}, depth={})",
            self.inner.len(),
            self.inner.depth()
        )
    }
}

/// metric-tree Python module
#[pymodule]
fn metric_tree(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyFuzzyIndex>()?;

    m.add("__doc__", "metric-tree: exact range and nearest-neighbour search over edit distance")?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
