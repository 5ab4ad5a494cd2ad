// crates/vigil-compare/src/wellformed.rs
//
// Structural revalidation of statistics summaries.
//
// Upstream producers are not trusted: every summary is checked here before a
// distance or domain check reads it, so a malformed input fails fast with
// MalformedStatistics instead of yielding a silently wrong number.

use std::collections::HashSet;

use vigil_core::{
    CategoricalStatistics, DatasetStatistics, FeatureStatistics, Histogram, ValueStatistics,
    VigilError,
};

/// Relative slack allowed when comparing summed float counts to integer totals.
const COUNT_EPS: f64 = 1e-9;

/// Check bucket bounds, ordering, and counts.
///
/// Buckets must be sorted, may share an edge, and may not overlap.
/// Point buckets (`low == high`) are allowed.
pub fn validate_histogram(feature: &str, histogram: &Histogram) -> Result<(), VigilError> {
    let mut prev_high: Option<f64> = None;
    for (i, bucket) in histogram.buckets.iter().enumerate() {
        if !bucket.low.is_finite() || !bucket.high.is_finite() {
            return Err(VigilError::malformed(
                feature,
                format!("bucket {} has non-finite bounds [{}, {}]", i, bucket.low, bucket.high),
            ));
        }
        if bucket.low > bucket.high {
            return Err(VigilError::malformed(
                feature,
                format!("bucket {} low {} exceeds high {}", i, bucket.low, bucket.high),
            ));
        }
        if !bucket.count.is_finite() || bucket.count < 0.0 {
            return Err(VigilError::malformed(
                feature,
                format!("bucket {} has invalid count {}", i, bucket.count),
            ));
        }
        if let Some(high) = prev_high {
            if bucket.low < high {
                return Err(VigilError::malformed(
                    feature,
                    format!("bucket {} starts at {} before previous bucket ends at {}", i, bucket.low, high),
                ));
            }
        }
        prev_high = Some(bucket.high);
    }
    Ok(())
}

/// Check that counts are non-negative and values unique.
pub fn validate_frequencies(feature: &str, stats: &CategoricalStatistics) -> Result<(), VigilError> {
    let mut seen = HashSet::new();
    for entry in &stats.frequencies {
        if !entry.count.is_finite() || entry.count < 0.0 {
            return Err(VigilError::malformed(
                feature,
                format!("value '{}' has invalid count {}", entry.value, entry.count),
            ));
        }
        if !seen.insert(entry.value.as_str()) {
            return Err(VigilError::malformed(
                feature,
                format!("value '{}' appears more than once", entry.value),
            ));
        }
    }
    Ok(())
}

/// Full check of one feature summary.
pub fn validate_feature_statistics(stats: &FeatureStatistics) -> Result<(), VigilError> {
    let name = stats.name.as_str();

    if stats.missing_count > stats.total_count {
        return Err(VigilError::malformed(
            name,
            format!(
                "missing count {} exceeds total count {}",
                stats.missing_count, stats.total_count
            ),
        ));
    }
    if stats.min_num_values > stats.max_num_values {
        return Err(VigilError::malformed(
            name,
            format!(
                "min_num_values {} exceeds max_num_values {}",
                stats.min_num_values, stats.max_num_values
            ),
        ));
    }

    let has_values = stats.present_count() > 0;
    match &stats.values {
        ValueStatistics::Numeric(numeric) => {
            validate_histogram(name, &numeric.histogram)?;
            if has_values {
                if !numeric.min.is_finite() || !numeric.max.is_finite() || numeric.min > numeric.max {
                    return Err(VigilError::malformed(
                        name,
                        format!("inconsistent range [{}, {}]", numeric.min, numeric.max),
                    ));
                }
                if !numeric.std_dev.is_finite() || numeric.std_dev < 0.0 {
                    return Err(VigilError::malformed(
                        name,
                        format!("invalid standard deviation {}", numeric.std_dev),
                    ));
                }
            }
        }
        ValueStatistics::Categorical(categorical) => validate_frequencies(name, categorical)?,
        ValueStatistics::Bytes(bytes) => {
            validate_histogram(name, &bytes.length_histogram)?;
            if has_values
                && (!bytes.min_length.is_finite()
                    || !bytes.max_length.is_finite()
                    || bytes.min_length < 0.0
                    || bytes.min_length > bytes.max_length)
            {
                return Err(VigilError::malformed(
                    name,
                    format!("inconsistent length range [{}, {}]", bytes.min_length, bytes.max_length),
                ));
            }
        }
    }

    // Multivalent features contribute up to max_num_values values per example.
    let mass = stats.values.observed_mass();
    let limit = stats.total_count as f64 * stats.max_num_values.max(1) as f64;
    if mass > limit * (1.0 + COUNT_EPS) {
        return Err(VigilError::malformed(
            name,
            format!("observed value count {} exceeds total {}", mass, limit),
        ));
    }

    Ok(())
}

/// Check every feature and reject duplicate feature names.
pub fn validate_dataset(stats: &DatasetStatistics) -> Result<(), VigilError> {
    let mut names = HashSet::new();
    for feature in &stats.features {
        if !names.insert(feature.name.as_str()) {
            return Err(VigilError::malformed(&feature.name, "feature appears more than once"));
        }
        if feature.total_count > stats.num_examples && stats.num_examples > 0 {
            return Err(VigilError::malformed(
                &feature.name,
                format!(
                    "total count {} exceeds dataset example count {}",
                    feature.total_count, stats.num_examples
                ),
            ));
        }
        validate_feature_statistics(feature)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::{Bucket, BytesStatistics, FrequencyEntry, NumericStatistics};

    fn numeric(total: u64, missing: u64, buckets: Vec<Bucket>) -> FeatureStatistics {
        FeatureStatistics::new(
            "x",
            total,
            missing,
            ValueStatistics::Numeric(NumericStatistics {
                min: 0.0,
                max: 10.0,
                mean: 5.0,
                std_dev: 1.0,
                histogram: Histogram::new(buckets),
            }),
        )
    }

    fn bytes(min_length: f64, max_length: f64) -> FeatureStatistics {
        FeatureStatistics::new(
            "payload",
            10,
            0,
            ValueStatistics::Bytes(BytesStatistics {
                min_length,
                max_length,
                length_histogram: Histogram::new(vec![Bucket::new(4.0, 16.0, 10.0)]),
            }),
        )
    }

    #[test]
    fn test_well_formed_numeric_passes() {
        let stats = numeric(10, 0, vec![Bucket::new(0.0, 5.0, 4.0), Bucket::new(5.0, 10.0, 6.0)]);
        assert!(validate_feature_statistics(&stats).is_ok());
    }

    #[test]
    fn test_negative_count_rejected() {
        let stats = numeric(10, 0, vec![Bucket::new(0.0, 5.0, -1.0)]);
        assert!(matches!(
            validate_feature_statistics(&stats),
            Err(VigilError::MalformedStatistics(_))
        ));
    }

    #[test]
    fn test_overlapping_buckets_rejected() {
        let h = Histogram::new(vec![Bucket::new(0.0, 5.0, 1.0), Bucket::new(4.0, 8.0, 1.0)]);
        assert!(validate_histogram("x", &h).is_err());
    }

    #[test]
    fn test_inverted_bucket_rejected() {
        let h = Histogram::new(vec![Bucket::new(5.0, 1.0, 1.0)]);
        assert!(validate_histogram("x", &h).is_err());
    }

    #[test]
    fn test_counts_exceeding_total_rejected() {
        let stats = numeric(5, 0, vec![Bucket::new(0.0, 10.0, 9.0)]);
        assert!(validate_feature_statistics(&stats).is_err());
    }

    #[test]
    fn test_missing_exceeding_total_rejected() {
        let stats = numeric(5, 6, vec![]);
        assert!(validate_feature_statistics(&stats).is_err());
    }

    #[test]
    fn test_bytes_length_range_checked() {
        assert!(validate_feature_statistics(&bytes(4.0, 16.0)).is_ok());
        assert!(matches!(
            validate_feature_statistics(&bytes(16.0, 4.0)),
            Err(VigilError::MalformedStatistics(_))
        ));
        assert!(validate_feature_statistics(&bytes(-1.0, 4.0)).is_err());
    }

    #[test]
    fn test_bytes_non_finite_length_rejected() {
        assert!(validate_feature_statistics(&bytes(f64::NAN, 16.0)).is_err());
        assert!(validate_feature_statistics(&bytes(4.0, f64::INFINITY)).is_err());
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let stats = CategoricalStatistics {
            frequencies: vec![FrequencyEntry::new("a", 1.0), FrequencyEntry::new("a", 2.0)],
        };
        assert!(validate_frequencies("x", &stats).is_err());
    }

    #[test]
    fn test_duplicate_feature_rejected() {
        let dataset = DatasetStatistics::new(10, vec![numeric(10, 0, vec![]), numeric(10, 0, vec![])]);
        assert!(validate_dataset(&dataset).is_err());
    }
}
