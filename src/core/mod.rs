//! # Core Domain
//!
//! Pure logic, no I/O, no adapters.
//!
//! - `distance`: the `Distance` capability and stock metrics
//! - `node`: tree vertices and child-candidate pruning
//! - `query`: range windows, cancellation, search statistics
//! - `config`: tree tunables

pub mod config;
pub mod distance;
pub mod node;
pub mod query;

pub use config::{TraversalOrder, TreeConfig, VantageSelection};
pub use distance::{Distance, DistanceError, DistanceResult};
pub use node::{Candidates, Node};
pub use query::{CancelToken, Found, InvalidRange, Neighbor, RangeQuery, SearchStats};
