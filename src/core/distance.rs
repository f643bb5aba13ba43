//! # Distance
//!
//! How far apart are two values?
//!
//! The tree treats distance as an opaque capability supplied by the caller.
//! Pruning is only exact when the capability is a true metric:
//!
//! - `d(a, b) >= 0`
//! - `d(a, a) == 0`
//! - `d(a, b) == d(b, a)`
//! - `d(a, c) <= d(a, b) + d(b, c)`
//!
//! The tree cannot verify these laws. It does reject values that would break
//! its arithmetic outright (NaN, infinite, negative).

use thiserror::Error;

/// Errors raised while measuring a distance
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistanceError {
    /// The two values cannot be compared under this metric
    #[error("values are not comparable: {0}")]
    Incomparable(String),

    /// Vector metrics need equal lengths
    #[error("dimensionality mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// The metric produced something that is not a usable distance
    #[error("metric returned an invalid distance: {0}")]
    InvalidValue(f64),
}

pub type DistanceResult<T> = Result<T, DistanceError>;

/// A distance capability over values of type `V`
///
/// `a` is the value stored in the tree (a node center), `b` is the reference
/// being searched for.
pub trait Distance<V: ?Sized> {
    /// Measure the distance between `a` and `b`
    fn distance(&self, a: &V, b: &V) -> DistanceResult<f64>;

    /// Name of this metric (for logs and debugging)
    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Measure and validate a distance
///
/// Every distance the tree acts on goes through here.
pub(crate) fn measure<V, D>(metric: &D, a: &V, b: &V) -> DistanceResult<f64>
where
    V: ?Sized,
    D: Distance<V> + ?Sized,
{
    let d = metric.distance(a, b)?;
    if d.is_finite() && d >= 0.0 {
        Ok(d)
    } else {
        Err(DistanceError::InvalidValue(d))
    }
}

// ============================================================================
// VECTOR METRICS
// ============================================================================

/// Euclidean (L2) distance over `f64` vectors
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl Distance<Vec<f64>> for Euclidean {
    fn distance(&self, a: &Vec<f64>, b: &Vec<f64>) -> DistanceResult<f64> {
        check_dims(a, b)?;
        Ok(a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f64>()
            .sqrt())
    }

    fn name(&self) -> &'static str {
        "euclidean"
    }
}

/// Manhattan (L1) distance over `f64` vectors
#[derive(Debug, Clone, Copy, Default)]
pub struct Manhattan;

impl Distance<Vec<f64>> for Manhattan {
    fn distance(&self, a: &Vec<f64>, b: &Vec<f64>) -> DistanceResult<f64> {
        check_dims(a, b)?;
        Ok(a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum())
    }

    fn name(&self) -> &'static str {
        "manhattan"
    }
}

fn check_dims(a: &[f64], b: &[f64]) -> DistanceResult<()> {
    if a.len() != b.len() {
        return Err(DistanceError::DimensionMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }
    Ok(())
}

/// Absolute difference between scalars
#[derive(Debug, Clone, Copy, Default)]
pub struct Absolute;

impl Distance<f64> for Absolute {
    fn distance(&self, a: &f64, b: &f64) -> DistanceResult<f64> {
        Ok((a - b).abs())
    }

    fn name(&self) -> &'static str {
        "absolute"
    }
}

// ============================================================================
// STRING METRICS
// ============================================================================

/// Levenshtein edit distance, counted in `char`s
///
/// The classic BK-tree metric for fuzzy word matching.
#[derive(Debug, Clone, Copy, Default)]
pub struct Levenshtein;

impl Levenshtein {
    /// Edit distance between two strings
    pub fn edits(a: &str, b: &str) -> usize {
        let b: Vec<char> = b.chars().collect();
        if b.is_empty() {
            return a.chars().count();
        }

        // Two rolling rows of the DP table
        let mut prev: Vec<usize> = (0..=b.len()).collect();
        let mut curr = vec![0; b.len() + 1];

        for (i, ca) in a.chars().enumerate() {
            curr[0] = i + 1;
            for (j, &cb) in b.iter().enumerate() {
                let substitution = prev[j] + usize::from(ca != cb);
                curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
            }
            std::mem::swap(&mut prev, &mut curr);
        }

        prev[b.len()]
    }
}

impl Distance<String> for Levenshtein {
    fn distance(&self, a: &String, b: &String) -> DistanceResult<f64> {
        Ok(Self::edits(a, b) as f64)
    }

    fn name(&self) -> &'static str {
        "levenshtein"
    }
}

/// Hamming distance between equal-length strings
#[derive(Debug, Clone, Copy, Default)]
pub struct Hamming;

impl Distance<String> for Hamming {
    fn distance(&self, a: &String, b: &String) -> DistanceResult<f64> {
        let (la, lb) = (a.chars().count(), b.chars().count());
        if la != lb {
            return Err(DistanceError::Incomparable(format!(
                "hamming needs equal lengths, got {} and {}",
                la, lb
            )));
        }
        Ok(a.chars().zip(b.chars()).filter(|(x, y)| x != y).count() as f64)
    }

    fn name(&self) -> &'static str {
        "hamming"
    }
}

// ============================================================================
// CLOSURES
// ============================================================================

/// Adapts a closure into a [`Distance`]
#[derive(Clone, Copy)]
pub struct FnDistance<F> {
    f: F,
}

/// Build a metric from a closure
///
/// ```rust
/// use metric_tree::core::distance::{from_fn, Distance};
///
/// let metric = from_fn(|a: &i64, b: &i64| Ok((a - b).abs() as f64));
/// assert_eq!(metric.distance(&3, &10).unwrap(), 7.0);
/// ```
pub fn from_fn<V, F>(f: F) -> FnDistance<F>
where
    V: ?Sized,
    F: Fn(&V, &V) -> DistanceResult<f64>,
{
    FnDistance { f }
}

impl<V, F> Distance<V> for FnDistance<F>
where
    V: ?Sized,
    F: Fn(&V, &V) -> DistanceResult<f64>,
{
    fn distance(&self, a: &V, b: &V) -> DistanceResult<f64> {
        (self.f)(a, b)
    }
}

impl<F> std::fmt::Debug for FnDistance<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnDistance")
    }
}
