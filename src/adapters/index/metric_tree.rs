//! # Metric Tree
//!
//! Self-expanding binary metric tree with exact range search.
//!
//! ## Layout
//!
//! Every node holds a center (plus any values at distance zero from it) and
//! a median radius. Descendants closer to the center than the median live on
//! the left, the rest on the right:
//!
//! ```text
//!                  [center c, median m]
//!                 /                    \
//!      d(c, x) < m                  d(c, x) >= m
//! ```
//!
//! ## Search
//!
//! A range query `[lo, hi]` around reference `q` measures `d = d(c, q)` at
//! each visited node and keeps only the children the triangle inequality
//! cannot rule out:
//!
//! - left  if `d - hi <  m`
//! - right if `d + hi >= m`
//!
//! Traversal runs on an explicit worklist, never on the call stack, so tree
//! depth is not limited by stack size. Each node enters the worklist at most
//! once (only its parent can push it), so each node is measured at most once.
//!
//! ## Construction
//!
//! - `build`: vantage-point style; pick a center, split the rest at the upper
//!   median of their distances, repeat for both halves
//! - `insert`: descend by the same rule; a new leaf takes the distance
//!   measured at its parent as its median
//! - `rebuild`: batch-build again from the current contents
//!
//! Both routes use the same left/right rule, so any mix of them keeps the
//! pruning invariant.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace, warn};

use crate::core::distance::measure;
use crate::core::{
    CancelToken, Distance, DistanceResult, Found, Neighbor, Node, RangeQuery, SearchStats,
    TraversalOrder, TreeConfig, VantageSelection,
};
use crate::ports::{Index, Insert, InsertResult, RangeSearch, SearchError, SearchResult};

/// Binary metric tree over values `V` under metric `D`
pub struct MetricTree<V, D> {
    root: Option<Box<Node<V>>>,
    metric: D,
    config: TreeConfig,
    len: usize,
}

impl<V, D: Distance<V>> MetricTree<V, D> {
    /// Create an empty tree with default configuration
    pub fn new(metric: D) -> Self {
        Self::with_config(metric, TreeConfig::default())
    }

    /// Create an empty tree with custom configuration
    pub fn with_config(metric: D, config: TreeConfig) -> Self {
        Self {
            root: None,
            metric,
            config,
            len: 0,
        }
    }

    /// Batch-build a tree from `items`
    ///
    /// Fails if the metric fails on any pair it is asked to measure.
    pub fn build(
        items: impl IntoIterator<Item = V>,
        metric: D,
        config: TreeConfig,
    ) -> DistanceResult<Self> {
        let items: Vec<V> = items.into_iter().collect();
        let staged = {
            let refs: Vec<&V> = items.iter().collect();
            plan(&refs, &metric, config.vantage)?
        };

        let mut tree = Self::with_config(metric, config);
        tree.len = items.len();
        tree.root = assemble(items, staged);

        debug!(
            metric = tree.metric.name(),
            values = tree.len,
            depth = tree.depth(),
            "built metric tree"
        );
        Ok(tree)
    }

    /// Wrap a hand-assembled node graph
    ///
    /// The caller is responsible for the layout matching `metric`: values
    /// on the left of a node must be closer to its center than its median.
    pub fn from_root(root: Node<V>, metric: D, config: TreeConfig) -> Self {
        let mut tree = Self::with_config(metric, config);
        tree.root = Some(Box::new(root));
        tree.len = tree.iter().count();
        tree
    }
}

impl<V, D> MetricTree<V, D> {
    pub fn metric(&self) -> &D {
        &self.metric
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn root(&self) -> Option<&Node<V>> {
        self.root.as_deref()
    }

    /// Number of nodes (a node may hold several colocated values)
    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    /// Length of the longest root-to-leaf path, in nodes
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(&Node<V>, usize)> = self.root().map(|n| (n, 1)).into_iter().collect();
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(node.left().map(|n| (n, level + 1)));
            stack.extend(node.right().map(|n| (n, level + 1)));
        }
        deepest
    }

    /// Iterate over every stored value (order unspecified)
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            stack: self.root().into_iter().collect(),
            current: Default::default(),
        }
    }

    /// Consume the tree, returning its values
    pub fn into_values(mut self) -> Vec<V> {
        self.drain_values()
    }

    fn nodes(&self) -> impl Iterator<Item = &Node<V>> + '_ {
        let mut stack: Vec<&Node<V>> = self.root().into_iter().collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.left());
            stack.extend(node.right());
            Some(node)
        })
    }

    /// Take every value out, leaving the tree empty
    ///
    /// Visits nodes in the same order as [`MetricTree::iter`].
    fn drain_values(&mut self) -> Vec<V> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack: Vec<Box<Node<V>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
            out.append(&mut node.values);
        }
        self.len = 0;
        out
    }
}

impl<V, D> Drop for MetricTree<V, D> {
    // Unlink children before they drop so a list-shaped tree cannot
    // overflow the stack through recursive Box drops.
    fn drop(&mut self) {
        let mut stack: Vec<Box<Node<V>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

impl<V, D> std::fmt::Debug for MetricTree<V, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricTree")
            .field("len", &self.len)
            .field("nodes", &self.node_count())
            .field("depth", &self.depth())
            .field("config", &self.config)
            .finish()
    }
}

// ============================================================================
// PORTS
// ============================================================================

impl<V, D: Distance<V>> Insert<V> for MetricTree<V, D> {
    fn insert(&mut self, value: V) -> InsertResult<()> {
        let metric = &self.metric;
        let mut median = 0.0;
        let mut slot = &mut self.root;

        while let Some(node) = slot {
            let d = measure(metric, node.center(), &value)?;
            if d == 0.0 {
                node.values.push(value);
                self.len += 1;
                return Ok(());
            }
            median = d;
            slot = if d < node.median {
                &mut node.left
            } else {
                &mut node.right
            };
        }

        *slot = Some(Box::new(Node::new(value, median)));
        self.len += 1;
        Ok(())
    }

    fn rebuild(&mut self) -> InsertResult<()> {
        // Plan against borrowed values first; a failing metric leaves the
        // current tree untouched.
        let staged = {
            let refs: Vec<&V> = self.iter().collect();
            plan(&refs, &self.metric, self.config.vantage)?
        };
        let items = self.drain_values();
        self.len = items.len();
        self.root = assemble(items, staged);

        debug!(
            metric = self.metric.name(),
            values = self.len,
            depth = self.depth(),
            "rebuilt metric tree"
        );
        Ok(())
    }

    fn clear(&mut self) {
        drop(self.drain_values());
    }

    fn len(&self) -> usize {
        self.len
    }
}

impl<V, D: Distance<V>> RangeSearch<V> for MetricTree<V, D> {
    fn search_with<'a>(
        &'a self,
        query: &RangeQuery<'_, V>,
        cancel: Option<&CancelToken>,
    ) -> SearchResult<Found<'a, V>> {
        let mut stats = SearchStats::default();
        let mut values = Vec::new();
        let mut pending: VecDeque<&'a Node<V>> = self.root().into_iter().collect();
        stats.peak_pending = pending.len();

        while let Some(node) = pop(&mut pending, self.config.order) {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                warn!(visited = stats.visited, "metric tree search cancelled");
                return Err(SearchError::Cancelled);
            }

            let d = measure(&self.metric, node.center(), query.reference())?;
            stats.visited += 1;

            if query.contains(d) {
                values.extend(node.values.iter());
            }
            pending.extend(node.candidates(d, query.max_dist()));
            stats.peak_pending = stats.peak_pending.max(pending.len());
        }

        stats.matched = values.len();
        trace!(
            visited = stats.visited,
            matched = stats.matched,
            peak_pending = stats.peak_pending,
            "range search complete"
        );
        Ok(Found { values, stats })
    }

    fn nearest<'a>(&'a self, reference: &V, k: usize) -> SearchResult<Vec<Neighbor<'a, V>>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        // Max-heap of the k best so far; its top is the current radius
        let mut best: BinaryHeap<Ranked<'a, V>> = BinaryHeap::with_capacity(k + 1);
        let mut pending: Vec<&'a Node<V>> = self.root().into_iter().collect();

        while let Some(node) = pending.pop() {
            let d = measure(&self.metric, node.center(), reference)?;

            for value in &node.values {
                if best.len() < k {
                    best.push(Ranked { distance: d, value });
                } else if best.peek().is_some_and(|worst| d < worst.distance) {
                    best.pop();
                    best.push(Ranked { distance: d, value });
                }
            }

            let radius = match best.peek() {
                Some(worst) if best.len() == k => worst.distance,
                _ => f64::INFINITY,
            };

            // Visit the side the reference falls on first; it tightens the
            // radius sooner.
            let before = pending.len();
            pending.extend(node.candidates(d, radius));
            if d < node.median {
                pending[before..].reverse();
            }
        }

        Ok(best
            .into_sorted_vec()
            .into_iter()
            .map(|r| Neighbor {
                value: r.value,
                distance: r.distance,
            })
            .collect())
    }
}

impl<V, D: Distance<V>> Index<V> for MetricTree<V, D> {
    fn kind(&self) -> &'static str {
        "metric-tree"
    }
}

fn pop<T>(pending: &mut VecDeque<T>, order: TraversalOrder) -> Option<T> {
    match order {
        TraversalOrder::DepthFirst => pending.pop_back(),
        TraversalOrder::BreadthFirst => pending.pop_front(),
    }
}

/// Heap entry ordered by distance
struct Ranked<'a, V> {
    distance: f64,
    value: &'a V,
}

impl<V> PartialEq for Ranked<'_, V> {
    fn eq(&self, other: &Self) -> bool {
        self.distance.total_cmp(&other.distance) == Ordering::Equal
    }
}

impl<V> Eq for Ranked<'_, V> {}

impl<V> PartialOrd for Ranked<'_, V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<V> Ord for Ranked<'_, V> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance.total_cmp(&other.distance)
    }
}

// ============================================================================
// ITERATION
// ============================================================================

/// Borrowing iterator over the values of a [`MetricTree`]
pub struct Iter<'a, V> {
    stack: Vec<&'a Node<V>>,
    current: std::slice::Iter<'a, V>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(value) = self.current.next() {
                return Some(value);
            }
            let node = self.stack.pop()?;
            self.stack.extend(node.left());
            self.stack.extend(node.right());
            self.current = node.values.iter();
        }
    }
}

impl<'a, V, D> IntoIterator for &'a MetricTree<V, D> {
    type Item = &'a V;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// BATCH CONSTRUCTION
// ============================================================================

/// A node whose values are still indices into the input
struct Staged {
    values: Vec<usize>,
    median: f64,
    left: Option<usize>,
    right: Option<usize>,
}

#[derive(Clone, Copy)]
enum Branch {
    Left,
    Right,
}

/// Lay out a tree over `items` without moving them
///
/// Parents are always staged before their children, so every child index is
/// larger than its parent's.
fn plan<V, D>(items: &[&V], metric: &D, vantage: VantageSelection) -> DistanceResult<Vec<Staged>>
where
    D: Distance<V> + ?Sized,
{
    let mut rng = match vantage {
        VantageSelection::First => None,
        VantageSelection::Random { seed } => Some(StdRng::seed_from_u64(seed)),
    };

    let mut staged: Vec<Staged> = Vec::new();
    let mut work: Vec<(Vec<usize>, Option<(usize, Branch)>)> = Vec::new();
    if !items.is_empty() {
        work.push(((0..items.len()).collect(), None));
    }

    while let Some((mut group, parent)) = work.pop() {
        let pick = match rng.as_mut() {
            Some(rng) => rng.gen_range(0..group.len()),
            None => 0,
        };
        let center = group.swap_remove(pick);

        let mut values = vec![center];
        let mut rest: Vec<(f64, usize)> = Vec::with_capacity(group.len());
        for i in group {
            let d = measure(metric, items[center], items[i])?;
            if d == 0.0 {
                values.push(i);
            } else {
                rest.push((d, i));
            }
        }

        let median = upper_median(&rest);
        let (near, far): (Vec<_>, Vec<_>) = rest.into_iter().partition(|(d, _)| *d < median);

        let index = staged.len();
        staged.push(Staged {
            values,
            median,
            left: None,
            right: None,
        });
        match parent {
            Some((p, Branch::Left)) => staged[p].left = Some(index),
            Some((p, Branch::Right)) => staged[p].right = Some(index),
            None => {}
        }

        if !far.is_empty() {
            work.push((far.into_iter().map(|(_, i)| i).collect(), Some((index, Branch::Right))));
        }
        if !near.is_empty() {
            work.push((near.into_iter().map(|(_, i)| i).collect(), Some((index, Branch::Left))));
        }
    }

    Ok(staged)
}

/// Upper median of the distances in `rest`; 0.0 for a leaf
fn upper_median(rest: &[(f64, usize)]) -> f64 {
    if rest.is_empty() {
        return 0.0;
    }
    let mut distances: Vec<f64> = rest.iter().map(|(d, _)| *d).collect();
    let mid = distances.len() / 2;
    let (_, median, _) = distances.select_nth_unstable_by(mid, f64::total_cmp);
    *median
}

/// Move `items` into the nodes laid out by `plan`
fn assemble<V>(items: Vec<V>, mut staged: Vec<Staged>) -> Option<Box<Node<V>>> {
    let mut slots: Vec<Option<V>> = items.into_iter().map(Some).collect();
    let mut built: Vec<Option<Box<Node<V>>>> = Vec::with_capacity(staged.len());
    built.resize_with(staged.len(), || None);

    // Children have larger indices, so walking backwards always finds them
    // already built.
    while let Some(s) = staged.pop() {
        let index = staged.len();
        let node = Node {
            values: s.values.iter().filter_map(|&i| slots[i].take()).collect(),
            median: s.median,
            left: s.left.and_then(|i| built[i].take()),
            right: s.right.and_then(|i| built[i].take()),
        };
        built[index] = Some(Box::new(node));
    }

    built.first_mut().and_then(Option::take)
}
