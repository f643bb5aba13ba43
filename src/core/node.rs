//! # Node
//!
//! One vertex of the metric tree.
//!
//! ```text
//! Node
//! ├── values: Vec<V>        colocated items, values[0] is the center
//! ├── median: f64           split radius around the center
//! ├── left:  Option<Box>    descendants with distance <  median
//! └── right: Option<Box>    descendants with distance >= median
//! ```
//!
//! A node owns its children outright. The median is chosen when the node is
//! created and never changes afterwards.

/// A node of the metric tree
///
/// Dropping a standalone node recurses through its children. Hand very deep
/// chains to [`MetricTree::from_root`](crate::MetricTree::from_root), whose
/// teardown is iterative.
#[derive(Debug)]
pub struct Node<V> {
    pub(crate) values: Vec<V>,
    pub(crate) median: f64,
    pub(crate) left: Option<Box<Node<V>>>,
    pub(crate) right: Option<Box<Node<V>>>,
}

impl<V> Node<V> {
    /// Create a childless node holding a single value
    pub fn new(value: V, median: f64) -> Self {
        Self {
            values: vec![value],
            median,
            left: None,
            right: None,
        }
    }

    /// Create a childless node holding several colocated values
    ///
    /// Returns `None` when `values` is empty: a node always has a center.
    pub fn with_values(values: Vec<V>, median: f64) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Self {
            values,
            median,
            left: None,
            right: None,
        })
    }

    /// Attach a left child
    pub fn with_left(mut self, child: Node<V>) -> Self {
        self.left = Some(Box::new(child));
        self
    }

    /// Attach a right child
    pub fn with_right(mut self, child: Node<V>) -> Self {
        self.right = Some(Box::new(child));
        self
    }

    /// The value distances are measured from
    pub fn center(&self) -> &V {
        &self.values[0]
    }

    /// All values stored at this node
    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn median(&self) -> f64 {
        self.median
    }

    pub fn left(&self) -> Option<&Node<V>> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&Node<V>> {
        self.right.as_deref()
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Children that might hold values within `max_dist` of the reference
    ///
    /// `distance` is the already measured distance from this node's center
    /// to the reference. Children are never measured here; the decision uses
    /// only `distance` and the median:
    ///
    /// - left is kept when `distance - max_dist < median`
    /// - right is kept when `distance + max_dist >= median`
    ///
    /// The lower bound of a range never prunes, so it is not taken.
    pub fn candidates(&self, distance: f64, max_dist: f64) -> Candidates<'_, V> {
        Candidates {
            node: self,
            distance,
            max_dist,
            side: Side::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
    Done,
}

/// Lazy sequence of child candidates, left before right
///
/// Yields at most two nodes.
#[derive(Debug, Clone)]
pub struct Candidates<'a, V> {
    node: &'a Node<V>,
    distance: f64,
    max_dist: f64,
    side: Side,
}

impl<'a, V> Iterator for Candidates<'a, V> {
    type Item = &'a Node<V>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.side {
                Side::Left => {
                    self.side = Side::Right;
                    if let Some(left) = self.node.left.as_deref() {
                        if self.distance - self.max_dist < self.node.median {
                            return Some(left);
                        }
                    }
                }
                Side::Right => {
                    self.side = Side::Done;
                    if let Some(right) = self.node.right.as_deref() {
                        if self.distance + self.max_dist >= self.node.median {
                            return Some(right);
                        }
                    }
                }
                Side::Done => return None,
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.side {
            Side::Left => (0, Some(2)),
            Side::Right => (0, Some(1)),
            Side::Done => (0, Some(0)),
        }
    }
}

impl<V> std::iter::FusedIterator for Candidates<'_, V> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node<&'static str> {
        Node::new("root", 10.0)
            .with_left(Node::new("near", 0.0))
            .with_right(Node::new("far", 0.0))
    }

    fn names(c: Candidates<'_, &'static str>) -> Vec<&'static str> {
        c.map(|n| *n.center()).collect()
    }

    #[test]
    fn test_candidates_both_sides() {
        // 8 - 5 < 10 and 8 + 5 >= 10
        assert_eq!(names(sample().candidates(8.0, 5.0)), vec!["near", "far"]);
    }

    #[test]
    fn test_candidates_left_only() {
        // 2 + 3 < 10
        assert_eq!(names(sample().candidates(2.0, 3.0)), vec!["near"]);
    }

    #[test]
    fn test_candidates_right_only() {
        // 20 - 5 >= 10
        assert_eq!(names(sample().candidates(20.0, 5.0)), vec!["far"]);
    }

    #[test]
    fn test_candidates_boundaries() {
        let node = sample();

        // distance - max_dist == median: left excluded (strict)
        assert_eq!(names(node.candidates(15.0, 5.0)), vec!["far"]);

        // distance + max_dist == median: right included (inclusive)
        assert_eq!(names(node.candidates(5.0, 5.0)), vec!["near", "far"]);
    }

    #[test]
    fn test_candidates_missing_children() {
        let leaf = Node::new("alone", 3.0);
        assert_eq!(leaf.candidates(3.0, 100.0).count(), 0);

        let right_only = Node::new("root", 1.0).with_right(Node::new("r", 0.0));
        assert_eq!(names(right_only.candidates(0.0, 0.0)), Vec::<&str>::new());
        assert_eq!(names(right_only.candidates(0.0, 1.0)), vec!["r"]);
    }

    #[test]
    fn test_candidates_is_fused() {
        let node = sample();
        let mut c = node.candidates(8.0, 5.0);
        assert!(c.next().is_some());
        assert!(c.next().is_some());
        assert!(c.next().is_none());
        assert!(c.next().is_none());
    }

    #[test]
    fn test_with_values_requires_center() {
        assert!(Node::<u8>::with_values(vec![], 1.0).is_none());

        let node = Node::with_values(vec![1, 1, 1], 0.0).unwrap();
        assert_eq!(node.values().len(), 3);
        assert_eq!(*node.center(), 1);
        assert!(node.is_leaf());
    }
}
