//! Property-based tests for the metric tree.
//!
//! These check, for arbitrary data and windows:
//! - Range search returns exactly what an exhaustive scan returns
//! - Each node is measured at most once, and exactly once when nothing prunes
//! - Incremental inserts, rebuilds and traversal orders never change results
//! - Nearest-neighbour distances match the exhaustive scan

use std::cell::Cell;

use metric_tree::{
    from_fn, Absolute, Euclidean, FlatIndex, Insert, Levenshtein, MetricTree,
    RangeQuery, RangeSearch, TraversalOrder, TreeConfig, VantageSelection,
};
use proptest::prelude::*;

fn sorted_f64(values: Vec<&f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.into_iter().copied().collect();
    out.sort_by(f64::total_cmp);
    out
}

fn sorted_strings(values: Vec<&String>) -> Vec<String> {
    let mut out: Vec<String> = values.into_iter().cloned().collect();
    out.sort();
    out
}

fn sorted_vectors(values: Vec<&Vec<f64>>) -> Vec<Vec<f64>> {
    let mut out: Vec<Vec<f64>> = values.into_iter().cloned().collect();
    out.sort_by(|a, b| {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| x.total_cmp(y))
            .find(|o| o.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    out
}

prop_compose! {
    fn arb_window()(lo in 0.0f64..50.0, width in 0.0f64..50.0) -> (f64, f64) {
        (lo, lo + width)
    }
}

prop_compose! {
    fn arb_word()(word in "[a-d]{0,6}") -> String {
        word
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn scalar_search_matches_flat(
        values in prop::collection::vec(-100.0f64..100.0, 0..200),
        reference in -120.0f64..120.0,
        (lo, hi) in arb_window(),
    ) {
        let tree = MetricTree::build(values.clone(), Absolute, TreeConfig::default()).unwrap();
        let flat = FlatIndex::from_values(values, Absolute);

        prop_assert_eq!(
            sorted_f64(tree.search(&reference, lo, hi).unwrap()),
            sorted_f64(flat.search(&reference, lo, hi).unwrap())
        );
    }

    #[test]
    fn integer_scalars_with_duplicates_match_flat(
        values in prop::collection::vec(0u8..20, 0..100),
        reference in 0u8..20,
        lo in 0u8..10,
        width in 0u8..10,
    ) {
        // Small integer domain: many ties and colocated values
        let values: Vec<f64> = values.into_iter().map(f64::from).collect();
        let (reference, lo, hi) = (f64::from(reference), f64::from(lo), f64::from(lo + width));

        let tree = MetricTree::build(values.clone(), Absolute, TreeConfig::default()).unwrap();
        let flat = FlatIndex::from_values(values, Absolute);

        prop_assert_eq!(
            sorted_f64(tree.search(&reference, lo, hi).unwrap()),
            sorted_f64(flat.search(&reference, lo, hi).unwrap())
        );
    }

    #[test]
    fn word_search_matches_flat(
        words in prop::collection::vec(arb_word(), 0..80),
        reference in arb_word(),
        lo in 0u8..4,
        width in 0u8..4,
    ) {
        let (lo, hi) = (f64::from(lo), f64::from(lo + width));
        let tree = MetricTree::build(words.clone(), Levenshtein, TreeConfig::default()).unwrap();
        let flat = FlatIndex::from_values(words, Levenshtein);

        prop_assert_eq!(
            sorted_strings(tree.search(&reference, lo, hi).unwrap()),
            sorted_strings(flat.search(&reference, lo, hi).unwrap())
        );
    }

    #[test]
    fn vector_search_matches_flat(
        points in prop::collection::vec(prop::collection::vec(-10.0f64..10.0, 3), 0..120),
        reference in prop::collection::vec(-10.0f64..10.0, 3),
        radius in 0.0f64..15.0,
    ) {
        let tree = MetricTree::build(points.clone(), Euclidean, TreeConfig::default()).unwrap();
        let flat = FlatIndex::from_values(points, Euclidean);

        prop_assert_eq!(
            sorted_vectors(tree.within(&reference, radius).unwrap()),
            sorted_vectors(flat.within(&reference, radius).unwrap())
        );
    }

    #[test]
    fn inserts_and_rebuild_match_flat(
        initial in prop::collection::vec(arb_word(), 0..40),
        added in prop::collection::vec(arb_word(), 0..40),
        reference in arb_word(),
        radius in 0u8..4,
    ) {
        let radius = f64::from(radius);
        let mut tree = MetricTree::build(initial.clone(), Levenshtein, TreeConfig::default()).unwrap();
        let mut flat = FlatIndex::from_values(initial, Levenshtein);
        for word in added {
            tree.insert(word.clone()).unwrap();
            flat.insert(word).unwrap();
        }

        let expected = sorted_strings(flat.within(&reference, radius).unwrap());
        prop_assert_eq!(sorted_strings(tree.within(&reference, radius).unwrap()), expected.clone());

        tree.rebuild().unwrap();
        prop_assert_eq!(tree.len(), flat.len());
        prop_assert_eq!(sorted_strings(tree.within(&reference, radius).unwrap()), expected);
    }

    #[test]
    fn configuration_never_changes_results(
        values in prop::collection::vec(-50.0f64..50.0, 0..150),
        reference in -60.0f64..60.0,
        (lo, hi) in arb_window(),
        seed in any::<u64>(),
    ) {
        let baseline = MetricTree::build(values.clone(), Absolute, TreeConfig::default()).unwrap();
        let config = TreeConfig::new()
            .with_order(TraversalOrder::BreadthFirst)
            .with_vantage(VantageSelection::Random { seed });
        let other = MetricTree::build(values, Absolute, config).unwrap();

        prop_assert_eq!(
            sorted_f64(baseline.search(&reference, lo, hi).unwrap()),
            sorted_f64(other.search(&reference, lo, hi).unwrap())
        );
    }

    #[test]
    fn each_node_measured_at_most_once(
        values in prop::collection::vec(0.0f64..1000.0, 1..150),
        reference in 0.0f64..1000.0,
        (lo, hi) in arb_window(),
    ) {
        let calls = Cell::new(0usize);
        let metric = from_fn(|a: &f64, b: &f64| {
            calls.set(calls.get() + 1);
            Ok((a - b).abs())
        });
        let tree = MetricTree::build(values, metric, TreeConfig::default()).unwrap();

        calls.set(0);
        let query = RangeQuery::new(&reference, lo, hi).unwrap();
        let found = tree.search_with(&query, None).unwrap();
        prop_assert_eq!(found.stats.visited, calls.get());
        prop_assert!(calls.get() <= tree.node_count());

        calls.set(0);
        let everything = RangeQuery::new(&reference, 0.0, f64::MAX).unwrap();
        tree.search_with(&everything, None).unwrap();
        prop_assert_eq!(calls.get(), tree.node_count());
    }

    #[test]
    fn nearest_matches_flat(
        values in prop::collection::vec(-100.0f64..100.0, 0..150),
        reference in -120.0f64..120.0,
        k in 0usize..20,
    ) {
        let tree = MetricTree::build(values.clone(), Absolute, TreeConfig::default()).unwrap();
        let flat = FlatIndex::from_values(values, Absolute);

        let got: Vec<f64> = tree.nearest(&reference, k).unwrap().iter().map(|n| n.distance).collect();
        let want: Vec<f64> = flat.nearest(&reference, k).unwrap().iter().map(|n| n.distance).collect();
        prop_assert_eq!(got, want);
    }
}
