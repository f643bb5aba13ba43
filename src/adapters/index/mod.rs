//! # Index Adapters
//!
//! Implementations of the `Insert` and `RangeSearch` ports.
//!
//! Available adapters:
//! - `MetricTree` - binary metric tree with pruned search (exact)
//! - `FlatIndex` - brute-force scan (exact, baseline)

mod flat;
mod metric_tree;

pub use flat::FlatIndex;
pub use metric_tree::{Iter, MetricTree};
