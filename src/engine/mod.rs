//! # Engine
//!
//! The orchestration layer that wires everything together.
//!
//! This is where:
//! - Configuration is applied
//! - Adapters are connected to ports
//! - The unified interface is exposed

mod metric_index;

pub use metric_index::MetricIndex;
