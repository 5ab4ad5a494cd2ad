// crates/vigil-compare/src/distance.rs
//
// Bounded distances between two observed distributions.
//
// Both measures are L-infinity distances in [0, 1]:
//
// - numeric: max |F_ref(x) - F_other(x)| over the cumulative distributions of
//   two histograms, with mass spread uniformly inside each bucket. This is the
//   Kolmogorov-Smirnov statistic of the two piecewise-linear CDFs.
// - categorical: max |p_ref(v) - p_other(v)| over per-category proportions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vigil_core::{CategoricalStatistics, Histogram, ValueStatistics, VigilError};

use crate::wellformed::{validate_frequencies, validate_histogram};

/// Result of a distance computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    /// Distance in [0, 1].
    pub value: f64,
    /// False when a side had no mass; `value` is then the maximum (1.0).
    pub defined: bool,
}

impl Distance {
    pub fn new(value: f64) -> Self {
        Self {
            value: value.clamp(0.0, 1.0),
            defined: true,
        }
    }

    /// Maximum distance, flagged as undefined-but-reportable.
    pub fn undefined() -> Self {
        Self {
            value: 1.0,
            defined: false,
        }
    }
}

/// Distance between two numeric histograms.
///
/// Symmetric. Returns `Distance::undefined()` if either histogram is empty.
pub fn numeric_distance(reference: &Histogram, other: &Histogram) -> Result<Distance, VigilError> {
    validate_histogram("reference", reference)?;
    validate_histogram("comparison", other)?;

    let ref_total = reference.total();
    let other_total = other.total();
    if ref_total <= 0.0 || other_total <= 0.0 {
        return Ok(Distance::undefined());
    }

    let mut edges: Vec<f64> = reference
        .buckets
        .iter()
        .chain(other.buckets.iter())
        .flat_map(|b| [b.low, b.high])
        .collect();
    edges.sort_by(f64::total_cmp);
    edges.dedup();

    // Both CDFs are linear between edges, so the supremum is reached at an
    // edge, either at the point itself or just left of it (point buckets jump).
    let mut max_gap: f64 = 0.0;
    for &x in &edges {
        let right = cdf(reference, x, true) / ref_total - cdf(other, x, true) / other_total;
        let left = cdf(reference, x, false) / ref_total - cdf(other, x, false) / other_total;
        max_gap = max_gap.max(right.abs()).max(left.abs());
    }

    Ok(Distance::new(max_gap))
}

/// Unnormalized mass at or below `x` (`inclusive`) or strictly below `x`.
fn cdf(histogram: &Histogram, x: f64, inclusive: bool) -> f64 {
    let mut mass = 0.0;
    for bucket in &histogram.buckets {
        if bucket.width() == 0.0 {
            let counted = if inclusive { bucket.low <= x } else { bucket.low < x };
            if counted {
                mass += bucket.count;
            }
        } else if x >= bucket.high {
            mass += bucket.count;
        } else if x > bucket.low {
            mass += bucket.count * (x - bucket.low) / bucket.width();
        }
    }
    mass
}

/// Distance between two categorical frequency tables.
///
/// A category present in only one table has proportion 0 on the other side.
pub fn categorical_distance(
    reference: &CategoricalStatistics,
    other: &CategoricalStatistics,
) -> Result<Distance, VigilError> {
    validate_frequencies("reference", reference)?;
    validate_frequencies("comparison", other)?;

    let ref_total = reference.total();
    let other_total = other.total();
    if ref_total <= 0.0 || other_total <= 0.0 {
        return Ok(Distance::undefined());
    }

    let mut proportions: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for entry in &reference.frequencies {
        proportions.entry(entry.value.as_str()).or_default().0 = entry.count / ref_total;
    }
    for entry in &other.frequencies {
        proportions.entry(entry.value.as_str()).or_default().1 = entry.count / other_total;
    }

    let max_gap = proportions
        .values()
        .map(|(p, q)| (p - q).abs())
        .fold(0.0, f64::max);

    Ok(Distance::new(max_gap))
}

/// Distance between two summaries of the same kind.
///
/// Numeric features compare value histograms, bytes features compare length
/// histograms. Returns `None` when the kinds differ.
pub fn value_distance(
    reference: &ValueStatistics,
    other: &ValueStatistics,
) -> Result<Option<Distance>, VigilError> {
    let distance = match (reference, other) {
        (ValueStatistics::Numeric(a), ValueStatistics::Numeric(b)) => {
            numeric_distance(&a.histogram, &b.histogram)?
        }
        (ValueStatistics::Categorical(a), ValueStatistics::Categorical(b)) => {
            categorical_distance(a, b)?
        }
        (ValueStatistics::Bytes(a), ValueStatistics::Bytes(b)) => {
            numeric_distance(&a.length_histogram, &b.length_histogram)?
        }
        (ValueStatistics::Numeric(_), _)
        | (ValueStatistics::Categorical(_), _)
        | (ValueStatistics::Bytes(_), _) => return Ok(None),
    };
    Ok(Some(distance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::{Bucket, FrequencyEntry};

    fn hist(buckets: &[(f64, f64, f64)]) -> Histogram {
        Histogram::new(buckets.iter().map(|&(l, h, c)| Bucket::new(l, h, c)).collect())
    }

    fn freq(entries: &[(&str, f64)]) -> CategoricalStatistics {
        CategoricalStatistics {
            frequencies: entries.iter().map(|&(v, c)| FrequencyEntry::new(v, c)).collect(),
        }
    }

    #[test]
    fn test_identical_histograms_zero_distance() {
        let a = hist(&[(0.0, 1.0, 3.0), (1.0, 2.0, 7.0)]);
        let d = numeric_distance(&a, &a).unwrap();
        assert!(d.defined);
        assert!(d.value.abs() < 1e-10);
    }

    #[test]
    fn test_disjoint_histograms_max_distance() {
        let a = hist(&[(0.0, 1.0, 5.0)]);
        let b = hist(&[(2.0, 3.0, 5.0)]);
        let d = numeric_distance(&a, &b).unwrap();
        assert!((d.value - 1.0).abs() < 1e-10);
        assert!(d.defined);
    }

    #[test]
    fn test_numeric_distance_symmetric_and_bounded() {
        let a = hist(&[(0.0, 1.0, 2.0), (1.0, 4.0, 8.0)]);
        let b = hist(&[(0.5, 2.0, 6.0), (2.0, 3.0, 1.0), (3.0, 3.0, 3.0)]);
        let ab = numeric_distance(&a, &b).unwrap().value;
        let ba = numeric_distance(&b, &a).unwrap().value;
        assert!((0.0..=1.0).contains(&ab));
        assert!((0.0..=1.0).contains(&ba));
        assert!((ab - ba).abs() < 1e-10);
    }

    #[test]
    fn test_scale_invariant() {
        let a = hist(&[(0.0, 1.0, 1.0), (1.0, 2.0, 3.0)]);
        let b = hist(&[(0.0, 1.0, 10.0), (1.0, 2.0, 30.0)]);
        assert!(numeric_distance(&a, &b).unwrap().value.abs() < 1e-10);
    }

    #[test]
    fn test_half_shift() {
        // Uniform on [0, 2] vs uniform on [1, 3]: CDF gap peaks at x = 1 and 2.
        let a = hist(&[(0.0, 2.0, 10.0)]);
        let b = hist(&[(1.0, 3.0, 10.0)]);
        let d = numeric_distance(&a, &b).unwrap();
        assert!((d.value - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_point_masses() {
        let a = hist(&[(1.0, 1.0, 1.0)]);
        let b = hist(&[(1.0, 1.0, 1.0)]);
        assert!(numeric_distance(&a, &b).unwrap().value.abs() < 1e-10);

        let c = hist(&[(2.0, 2.0, 1.0)]);
        assert!((numeric_distance(&a, &c).unwrap().value - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_empty_side_is_undefined_not_error() {
        let a = hist(&[(0.0, 1.0, 5.0)]);
        let empty = Histogram::default();
        let d = numeric_distance(&a, &empty).unwrap();
        assert!(!d.defined);
        assert_eq!(d.value, 1.0);
    }

    #[test]
    fn test_malformed_histogram_is_error() {
        let a = hist(&[(0.0, 1.0, -5.0)]);
        let b = hist(&[(0.0, 1.0, 5.0)]);
        assert!(matches!(
            numeric_distance(&a, &b),
            Err(VigilError::MalformedStatistics(_))
        ));
    }

    #[test]
    fn test_categorical_distance_one_sided_category() {
        let a = freq(&[("red", 50.0), ("blue", 50.0)]);
        let b = freq(&[("red", 50.0), ("green", 50.0)]);
        let d = categorical_distance(&a, &b).unwrap();
        assert!((d.value - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_categorical_distance_identical() {
        let a = freq(&[("x", 3.0), ("y", 1.0)]);
        assert!(categorical_distance(&a, &a).unwrap().value.abs() < 1e-10);
    }

    #[test]
    fn test_value_distance_kind_mismatch_is_none() {
        let numeric = ValueStatistics::Numeric(vigil_core::NumericStatistics {
            min: 0.0,
            max: 1.0,
            mean: 0.5,
            std_dev: 0.1,
            histogram: hist(&[(0.0, 1.0, 1.0)]),
        });
        let categorical = ValueStatistics::Categorical(freq(&[("a", 1.0)]));
        assert!(value_distance(&numeric, &categorical).unwrap().is_none());
        assert!(value_distance(&numeric, &numeric).unwrap().is_some());
    }

    #[test]
    fn test_value_distance_bytes_uses_length_histograms() {
        let lengths = |buckets: &[(f64, f64, f64)]| {
            ValueStatistics::Bytes(vigil_core::BytesStatistics {
                min_length: buckets[0].0,
                max_length: buckets[buckets.len() - 1].1,
                length_histogram: hist(buckets),
            })
        };
        let short = lengths(&[(0.0, 2.0, 10.0)]);
        let long = lengths(&[(1.0, 3.0, 10.0)]);
        let d = value_distance(&short, &long).unwrap().unwrap();
        assert!(d.defined);
        assert!((d.value - 0.5).abs() < 1e-10);

        let categorical = ValueStatistics::Categorical(freq(&[("a", 1.0)]));
        assert!(value_distance(&short, &categorical).unwrap().is_none());
    }
}
