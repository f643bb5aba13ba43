//! # Adapters
//!
//! Swappable implementations of port traits.
//!
//! - Index adapters: MetricTree (pruned), Flat (brute force)
//! - Python bindings (when enabled)
//!
//! Each adapter implements the `Insert` and `RangeSearch` ports.
//! Adapters can be swapped without changing core logic.

pub mod index;

#[cfg(feature = "python")]
pub mod python;
