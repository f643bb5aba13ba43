//! # metric-tree
//!
//! > "Everything within reach, nothing it can rule out"
//!
//! A self-expanding binary metric tree. Given a reference value and a
//! distance function, it returns every stored value whose distance from the
//! reference lies in `[min_dist, max_dist]`, without measuring the parts of
//! the tree the triangle inequality rules out.
//!
//! Works for any metric space: edit distance over words (BK-tree style fuzzy
//! matching), Euclidean vectors, scalars, or a caller-supplied closure.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       metric-tree                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  CORE (pure math, no I/O)                                   │
//! │    Distance, Node, RangeQuery, TreeConfig                   │
//! │                                                              │
//! │  PORTS (trait contracts)                                     │
//! │    Insert, RangeSearch, Index                               │
//! │                                                              │
//! │  ADAPTERS (swappable implementations)                       │
//! │    Index: MetricTree, Flat                                  │
//! │    API: Python bindings                                      │
//! │                                                              │
//! │  ENGINE (orchestration)                                      │
//! │    MetricIndex - the main entry point                       │
//! │                                                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use metric_tree::{Levenshtein, MetricIndex, TreeConfig};
//!
//! let mut index = MetricIndex::new(Levenshtein, TreeConfig::default());
//! for word in ["book", "books", "cake", "boo", "cook", "cape"] {
//!     index.insert(word.to_string()).unwrap();
//! }
//!
//! // Everything within one edit of "bool"
//! let mut found = index.within(&"bool".to_string(), 1.0).unwrap();
//! found.sort();
//! assert_eq!(found, vec!["boo", "book"]);
//! ```

// ============================================================================
// MODULES
// ============================================================================

/// Core domain - pure math, no I/O
/// Contains: Distance trait and metrics, Node, query types, config
pub mod core;

/// Port definitions - trait contracts for adapters
/// Contains: Insert trait, RangeSearch trait, Index trait, errors
pub mod ports;

/// Adapter implementations - swappable components
/// Contains: index, python submodules
pub mod adapters;

/// Engine - orchestration layer
/// Contains: MetricIndex main struct
pub mod engine;

// ============================================================================
// PYTHON BINDINGS (when enabled)
// ============================================================================

#[cfg(feature = "python")]
pub use adapters::python::*;

// ============================================================================
// RE-EXPORTS (public API)
// ============================================================================

// Core types
pub use crate::core::{CancelToken, Found, InvalidRange, Neighbor, Node, RangeQuery, SearchStats};
pub use crate::core::distance::{
    from_fn, Absolute, Distance, DistanceError, DistanceResult, Euclidean, FnDistance, Hamming,
    Levenshtein, Manhattan,
};
pub use crate::core::config::{TraversalOrder, TreeConfig, VantageSelection};

// Port traits
pub use crate::ports::{Index, Insert, InsertError, RangeSearch, SearchError};

// Adapters
pub use crate::adapters::index::{FlatIndex, MetricTree};

// Engine
pub use crate::engine::MetricIndex;
