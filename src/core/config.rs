//! # Configuration
//!
//! Tunables for tree construction, traversal and maintenance.

/// Order in which the search worklist is drained
///
/// Results are the same either way; only the visiting order and the peak
/// worklist size differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalOrder {
    /// Stack (LIFO)
    #[default]
    DepthFirst,
    /// Queue (FIFO)
    BreadthFirst,
}

/// How batch construction picks a node's center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VantageSelection {
    /// First remaining item (deterministic, input-order dependent)
    #[default]
    First,
    /// Uniformly random item from a seeded generator
    Random { seed: u64 },
}

/// Configuration for a metric tree
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TreeConfig {
    /// Worklist discipline for searches
    pub order: TraversalOrder,

    /// Center selection during batch builds
    pub vantage: VantageSelection,

    /// Rebuild after this many incremental inserts (None = never)
    pub rebuild_after: Option<usize>,
}

impl TreeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(mut self, order: TraversalOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_vantage(mut self, vantage: VantageSelection) -> Self {
        self.vantage = vantage;
        self
    }

    /// Rebuild the tree every `inserts` incremental inserts
    ///
    /// Zero disables the policy.
    pub fn with_rebuild_after(mut self, inserts: usize) -> Self {
        self.rebuild_after = if inserts == 0 { None } else { Some(inserts) };
        self
    }
}
