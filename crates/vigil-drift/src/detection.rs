// crates/vigil-drift/src/detection.rs
//
// Skew and drift detection between a reference and a comparison summary.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use vigil_compare::{validate_dataset, value_distance};
use vigil_core::{
    AnomalyRecord, AnomalyReport, AnomalyReportBuilder, AnomalyType, ComparisonGap,
    DatasetStatistics, DistributionComparator, FeatureStatistics, Measurement, Severity,
    ValidationConfig, VigilError,
};

/// Which comparison is being run. Only changes the tag on emitted anomalies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonKind {
    /// Training data (reference) against serving data (comparison).
    TrainingServingSkew,
    /// An earlier span (reference) against a later span (comparison).
    DistributionDrift,
}

impl ComparisonKind {
    pub fn anomaly_type(&self) -> AnomalyType {
        match self {
            ComparisonKind::TrainingServingSkew => AnomalyType::TrainingServingSkew,
            ComparisonKind::DistributionDrift => AnomalyType::DistributionDrift,
        }
    }
}

/// Detects skew or drift with a fixed kind and threshold config.
#[derive(Debug, Clone)]
pub struct SkewDetector {
    kind: ComparisonKind,
    config: ValidationConfig,
}

impl SkewDetector {
    pub fn new(kind: ComparisonKind, config: ValidationConfig) -> Result<Self, VigilError> {
        config.validate()?;
        Ok(Self { kind, config })
    }

    pub fn kind(&self) -> ComparisonKind {
        self.kind
    }
}

impl DistributionComparator for SkewDetector {
    fn compare(
        &self,
        reference: &DatasetStatistics,
        comparison: &DatasetStatistics,
    ) -> Result<AnomalyReport, VigilError> {
        compare(reference, comparison, self.kind, &self.config)
    }
}

/// One feature to compare; either side may be absent.
type Pair<'a> = (&'a str, Option<&'a FeatureStatistics>, Option<&'a FeatureStatistics>);

/// Reference features in order, then comparison-only features in order.
fn pair_features<'a>(reference: &'a DatasetStatistics, comparison: &'a DatasetStatistics) -> Vec<Pair<'a>> {
    let mut pairs: Vec<Pair<'a>> = reference
        .features
        .iter()
        .map(|r| (r.name.as_str(), Some(r), comparison.feature(&r.name)))
        .collect();
    pairs.extend(
        comparison
            .features
            .iter()
            .filter(|c| reference.feature(&c.name).is_none())
            .map(|c| (c.name.as_str(), None, Some(c))),
    );
    pairs
}

/// Compare `comparison` against `reference`.
///
/// Emits at most one anomaly per feature: a `kind` anomaly when the distance
/// exceeds the feature's threshold, or COMPARISON_FEATURE_MISSING when the
/// feature cannot be compared.
pub fn compare(
    reference: &DatasetStatistics,
    comparison: &DatasetStatistics,
    kind: ComparisonKind,
    config: &ValidationConfig,
) -> Result<AnomalyReport, VigilError> {
    revalidate(reference, comparison, config)?;

    let mut builder = AnomalyReportBuilder::new();
    for (name, r, c) in pair_features(reference, comparison) {
        if let Some(record) = compare_feature(name, r, c, kind, config)? {
            builder.push(record);
        }
    }
    Ok(finish(builder, kind))
}

/// Same result as [`compare`], with features spread over the rayon pool.
pub fn compare_parallel(
    reference: &DatasetStatistics,
    comparison: &DatasetStatistics,
    kind: ComparisonKind,
    config: &ValidationConfig,
) -> Result<AnomalyReport, VigilError> {
    revalidate(reference, comparison, config)?;

    let records: Vec<Option<AnomalyRecord>> = pair_features(reference, comparison)
        .par_iter()
        .map(|&(name, r, c)| compare_feature(name, r, c, kind, config))
        .collect::<Result<_, _>>()?;

    let mut builder = AnomalyReportBuilder::new();
    builder.extend(records.into_iter().flatten());
    Ok(finish(builder, kind))
}

fn revalidate(
    reference: &DatasetStatistics,
    comparison: &DatasetStatistics,
    config: &ValidationConfig,
) -> Result<(), VigilError> {
    config.validate()?;
    validate_dataset(reference)?;
    validate_dataset(comparison)
}

fn finish(builder: AnomalyReportBuilder, kind: ComparisonKind) -> AnomalyReport {
    let report = builder.finish();
    tracing::info!(
        kind = %kind.anomaly_type(),
        anomalies = report.len(),
        "distribution comparison complete"
    );
    report
}

fn gap(name: &str, gap: ComparisonGap, description: String) -> AnomalyRecord {
    tracing::debug!(feature = name, %gap, "feature not comparable");
    AnomalyRecord::new(
        name,
        AnomalyType::ComparisonFeatureMissing,
        Severity::Warning,
        description,
        Measurement::Gap { gap },
        "feature present with data on both sides",
    )
}

fn compare_feature(
    name: &str,
    reference: Option<&FeatureStatistics>,
    comparison: Option<&FeatureStatistics>,
    kind: ComparisonKind,
    config: &ValidationConfig,
) -> Result<Option<AnomalyRecord>, VigilError> {
    let (r, c) = match (reference, comparison) {
        (Some(r), Some(c)) => (r, c),
        (Some(_), None) => {
            return Ok(Some(gap(
                name,
                ComparisonGap::MissingInComparison,
                format!("Feature '{}' is absent from the comparison statistics", name),
            )))
        }
        (None, Some(_)) => {
            return Ok(Some(gap(
                name,
                ComparisonGap::MissingInReference,
                format!("Feature '{}' is absent from the reference statistics", name),
            )))
        }
        (None, None) => return Ok(None),
    };

    if r.total_count == 0 || c.total_count == 0 {
        return Ok(Some(gap(
            name,
            ComparisonGap::InsufficientData,
            format!(
                "Feature '{}' has no examples on one side (reference {}, comparison {})",
                name, r.total_count, c.total_count
            ),
        )));
    }

    let distance = match value_distance(&r.values, &c.values)? {
        Some(d) => d,
        None => {
            return Ok(Some(gap(
                name,
                ComparisonGap::KindMismatch,
                format!(
                    "Feature '{}' is {} in the reference but {} in the comparison",
                    name,
                    r.kind(),
                    c.kind()
                ),
            )))
        }
    };

    if !distance.defined {
        return Ok(Some(gap(
            name,
            ComparisonGap::InsufficientData,
            format!("Feature '{}' has no observed values on one side", name),
        )));
    }

    let threshold = config.distance_threshold_for(name);
    tracing::debug!(feature = name, distance = distance.value, threshold, "compared feature");
    if distance.value <= threshold {
        return Ok(None);
    }

    let label = match kind {
        ComparisonKind::TrainingServingSkew => "Training/serving skew",
        ComparisonKind::DistributionDrift => "Distribution drift",
    };
    Ok(Some(AnomalyRecord::new(
        name,
        kind.anomaly_type(),
        Severity::Error,
        format!("{} of {:.4} on feature '{}'", label, distance.value, name),
        Measurement::Distance {
            value: distance.value,
            threshold,
        },
        format!("distance <= {}", threshold),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::{
        Bucket, BytesStatistics, CategoricalStatistics, FeatureThresholds, FrequencyEntry,
        Histogram, NumericStatistics, ValueStatistics,
    };

    fn numeric(name: &str, total: u64, buckets: &[(f64, f64, f64)]) -> FeatureStatistics {
        let histogram = Histogram::new(buckets.iter().map(|&(l, h, c)| Bucket::new(l, h, c)).collect());
        let lo = buckets.first().map_or(0.0, |b| b.0);
        let hi = buckets.last().map_or(0.0, |b| b.1);
        FeatureStatistics::new(
            name,
            total,
            0,
            ValueStatistics::Numeric(NumericStatistics {
                min: lo,
                max: hi,
                mean: (lo + hi) / 2.0,
                std_dev: 1.0,
                histogram,
            }),
        )
    }

    fn categorical(name: &str, entries: &[(&str, f64)]) -> FeatureStatistics {
        let total: f64 = entries.iter().map(|e| e.1).sum();
        FeatureStatistics::new(
            name,
            total as u64,
            0,
            ValueStatistics::Categorical(CategoricalStatistics {
                frequencies: entries.iter().map(|&(v, c)| FrequencyEntry::new(v, c)).collect(),
            }),
        )
    }

    fn bytes(name: &str, total: u64, lengths: (f64, f64)) -> FeatureStatistics {
        FeatureStatistics::new(
            name,
            total,
            0,
            ValueStatistics::Bytes(BytesStatistics {
                min_length: lengths.0,
                max_length: lengths.1,
                length_histogram: Histogram::new(vec![Bucket::new(lengths.0, lengths.1, total as f64)]),
            }),
        )
    }

    #[test]
    fn test_identical_summaries_no_anomalies() {
        let stats = DatasetStatistics::new(
            10,
            vec![
                numeric("x", 10, &[(0.0, 1.0, 4.0), (1.0, 2.0, 6.0)]),
                categorical("c", &[("a", 5.0), ("b", 5.0)]),
            ],
        );
        let report = compare(&stats, &stats, ComparisonKind::TrainingServingSkew, &ValidationConfig::default()).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_skew_tagged_with_kind_and_distance() {
        let reference = DatasetStatistics::new(100, vec![categorical("c", &[("a", 90.0), ("b", 10.0)])]);
        let serving = DatasetStatistics::new(100, vec![categorical("c", &[("a", 50.0), ("b", 50.0)])]);
        let config = ValidationConfig::default();

        let skew = compare(&reference, &serving, ComparisonKind::TrainingServingSkew, &config).unwrap();
        assert_eq!(skew.len(), 1);
        let anomaly = &skew.anomalies()[0];
        assert_eq!(anomaly.anomaly_type, AnomalyType::TrainingServingSkew);
        match anomaly.measured_value {
            Measurement::Distance { value, threshold } => {
                assert!((value - 0.4).abs() < 1e-10);
                assert!((threshold - 0.1).abs() < 1e-10);
            }
            ref other => panic!("unexpected measurement {:?}", other),
        }

        let drift = compare(&reference, &serving, ComparisonKind::DistributionDrift, &config).unwrap();
        assert_eq!(drift.anomalies()[0].anomaly_type, AnomalyType::DistributionDrift);
    }

    #[test]
    fn test_per_feature_threshold_override() {
        let reference = DatasetStatistics::new(100, vec![categorical("c", &[("a", 90.0), ("b", 10.0)])]);
        let serving = DatasetStatistics::new(100, vec![categorical("c", &[("a", 50.0), ("b", 50.0)])]);
        let config = ValidationConfig::default().with_feature(
            "c",
            FeatureThresholds {
                distance_threshold: Some(0.5),
                ..Default::default()
            },
        );
        let report = compare(&reference, &serving, ComparisonKind::DistributionDrift, &config).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_one_sided_features_reported() {
        let reference = DatasetStatistics::new(10, vec![numeric("x", 10, &[(0.0, 1.0, 10.0)])]);
        let comparison = DatasetStatistics::new(10, vec![numeric("y", 10, &[(0.0, 1.0, 10.0)])]);
        let report = compare(&reference, &comparison, ComparisonKind::DistributionDrift, &ValidationConfig::default()).unwrap();
        let gaps: Vec<(&str, Measurement)> = report
            .anomalies()
            .iter()
            .map(|a| (a.feature_name.as_str(), a.measured_value.clone()))
            .collect();
        assert_eq!(
            gaps,
            vec![
                ("x", Measurement::Gap { gap: ComparisonGap::MissingInComparison }),
                ("y", Measurement::Gap { gap: ComparisonGap::MissingInReference }),
            ]
        );
    }

    #[test]
    fn test_zero_examples_is_insufficient_data() {
        let reference = DatasetStatistics::new(10, vec![numeric("x", 10, &[(0.0, 1.0, 10.0)])]);
        let empty = DatasetStatistics::new(0, vec![numeric("x", 0, &[])]);
        let report = compare(&reference, &empty, ComparisonKind::TrainingServingSkew, &ValidationConfig::default()).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.anomalies()[0].anomaly_type, AnomalyType::ComparisonFeatureMissing);
        assert_eq!(
            report.anomalies()[0].measured_value,
            Measurement::Gap { gap: ComparisonGap::InsufficientData }
        );
    }

    #[test]
    fn test_bytes_length_shift_is_drift() {
        let reference = DatasetStatistics::new(10, vec![bytes("payload", 10, (0.0, 2.0))]);
        let comparison = DatasetStatistics::new(10, vec![bytes("payload", 10, (1.0, 3.0))]);
        let report = compare(&reference, &comparison, ComparisonKind::DistributionDrift, &ValidationConfig::default()).unwrap();
        assert_eq!(report.len(), 1);
        let anomaly = &report.anomalies()[0];
        assert_eq!(anomaly.anomaly_type, AnomalyType::DistributionDrift);
        match anomaly.measured_value {
            Measurement::Distance { value, .. } => assert!((value - 0.5).abs() < 1e-10),
            ref other => panic!("unexpected measurement {:?}", other),
        }

        let same = compare(&reference, &reference, ComparisonKind::DistributionDrift, &ValidationConfig::default()).unwrap();
        assert!(same.is_empty());
    }

    #[test]
    fn test_kind_change_is_not_compared() {
        let reference = DatasetStatistics::new(10, vec![numeric("x", 10, &[(0.0, 1.0, 10.0)])]);
        let comparison = DatasetStatistics::new(10, vec![categorical("x", &[("a", 10.0)])]);
        let report = compare(&reference, &comparison, ComparisonKind::DistributionDrift, &ValidationConfig::default()).unwrap();
        assert_eq!(
            report.anomalies()[0].measured_value,
            Measurement::Gap { gap: ComparisonGap::KindMismatch }
        );
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let reference = DatasetStatistics::new(
            100,
            vec![
                numeric("x", 100, &[(0.0, 2.0, 100.0)]),
                categorical("c", &[("a", 90.0), ("b", 10.0)]),
                numeric("only_ref", 100, &[(0.0, 1.0, 100.0)]),
            ],
        );
        let comparison = DatasetStatistics::new(
            100,
            vec![
                numeric("x", 100, &[(1.0, 3.0, 100.0)]),
                categorical("c", &[("a", 50.0), ("b", 50.0)]),
                categorical("only_cmp", &[("z", 100.0)]),
            ],
        );
        let config = ValidationConfig::default();
        let sequential = compare(&reference, &comparison, ComparisonKind::DistributionDrift, &config).unwrap();
        let parallel = compare_parallel(&reference, &comparison, ComparisonKind::DistributionDrift, &config).unwrap();
        assert_eq!(sequential, parallel);
        assert_eq!(sequential.len(), 4);
    }

    #[test]
    fn test_detector_through_trait() {
        let detector = SkewDetector::new(ComparisonKind::TrainingServingSkew, ValidationConfig::default()).unwrap();
        let comparator: &dyn DistributionComparator = &detector;
        let stats = DatasetStatistics::new(10, vec![numeric("x", 10, &[(0.0, 1.0, 10.0)])]);
        assert!(comparator.compare(&stats, &stats).unwrap().is_empty());
    }
}
