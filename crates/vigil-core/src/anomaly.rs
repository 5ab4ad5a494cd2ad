// crates/vigil-core/src/anomaly.rs
//
// Structured findings emitted by the anomaly, skew, and drift detectors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::FeatureType;

/// Fixed enumeration of anomaly kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyType {
    /// Feature observed in statistics but not declared in the schema.
    UnexpectedFeature,
    /// Required feature missing from more examples than allowed.
    MissingValues,
    /// Observed value kind differs from the declared type.
    TypeMismatch,
    /// Observed values fall outside the declared domain.
    OutOfDomain,
    /// Observed valency violates the declared shape.
    ShapeMismatch,
    /// Feature cannot be compared across two summaries.
    ComparisonFeatureMissing,
    TrainingServingSkew,
    DistributionDrift,
}

impl AnomalyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyType::UnexpectedFeature => "UNEXPECTED_FEATURE",
            AnomalyType::MissingValues => "MISSING_VALUES",
            AnomalyType::TypeMismatch => "TYPE_MISMATCH",
            AnomalyType::OutOfDomain => "OUT_OF_DOMAIN",
            AnomalyType::ShapeMismatch => "SHAPE_MISMATCH",
            AnomalyType::ComparisonFeatureMissing => "COMPARISON_FEATURE_MISSING",
            AnomalyType::TrainingServingSkew => "TRAINING_SERVING_SKEW",
            AnomalyType::DistributionDrift => "DISTRIBUTION_DRIFT",
        }
    }
}

impl fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("WARNING"),
            Severity::Error => f.write_str("ERROR"),
        }
    }
}

/// Why a feature could not be compared across two summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonGap {
    MissingInReference,
    MissingInComparison,
    /// One side has no examples (or no observed values) for the feature.
    InsufficientData,
    /// The two sides observed different value kinds.
    KindMismatch,
}

impl fmt::Display for ComparisonGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ComparisonGap::MissingInReference => "missing in reference",
            ComparisonGap::MissingInComparison => "missing in comparison",
            ComparisonGap::InsufficientData => "insufficient data",
            ComparisonGap::KindMismatch => "kind mismatch",
        };
        f.write_str(text)
    }
}

/// What the detector actually observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Measurement {
    /// No measurable quantity (e.g. an undeclared feature).
    None,
    /// A fraction of examples or values.
    Fraction { value: f64 },
    /// A distance between two distributions.
    Distance { value: f64, threshold: f64 },
    /// The observed value kind.
    Kind { observed: FeatureType },
    /// Offending categorical values.
    Values { values: Vec<String>, fraction: f64 },
    /// Observed numeric range.
    Range { min: f64, max: f64, fraction: f64 },
    /// Observed per-example valency.
    Valency { min: u32, max: u32 },
    Gap { gap: ComparisonGap },
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measurement::None => f.write_str("-"),
            Measurement::Fraction { value } => write!(f, "{:.4}", value),
            Measurement::Distance { value, .. } => write!(f, "distance {:.4}", value),
            Measurement::Kind { observed } => write!(f, "{}", observed),
            Measurement::Values { values, fraction } => {
                write!(f, "{{{}}} ({:.4} of values)", values.join(", "), fraction)
            }
            Measurement::Range { min, max, fraction } => {
                write!(f, "[{}, {}] ({:.4} of values)", min, max, fraction)
            }
            Measurement::Valency { min, max } => write!(f, "{}..={} values", min, max),
            Measurement::Gap { gap } => write!(f, "{}", gap),
        }
    }
}

/// A single immutable finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub feature_name: String,
    pub anomaly_type: AnomalyType,
    pub severity: Severity,
    pub short_description: String,
    pub measured_value: Measurement,
    pub expected_constraint: String,
}

impl AnomalyRecord {
    pub fn new(
        feature_name: impl Into<String>,
        anomaly_type: AnomalyType,
        severity: Severity,
        short_description: impl Into<String>,
        measured_value: Measurement,
        expected_constraint: impl Into<String>,
    ) -> Self {
        Self {
            feature_name: feature_name.into(),
            anomaly_type,
            severity,
            short_description: short_description.into(),
            measured_value,
            expected_constraint: expected_constraint.into(),
        }
    }
}

/// Ordered result of one validation run, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    anomalies: Vec<AnomalyRecord>,
}

impl AnomalyReport {
    pub fn anomalies(&self) -> &[AnomalyRecord] {
        &self.anomalies
    }

    pub fn into_anomalies(self) -> Vec<AnomalyRecord> {
        self.anomalies
    }

    pub fn len(&self) -> usize {
        self.anomalies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anomalies.is_empty()
    }

    /// True if any finding has `ERROR` severity.
    pub fn has_errors(&self) -> bool {
        self.anomalies.iter().any(|a| a.severity == Severity::Error)
    }

    /// All findings for one feature, in report order.
    pub fn for_feature<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a AnomalyRecord> + 'a {
        self.anomalies.iter().filter(move |a| a.feature_name == name)
    }

    pub fn count_of(&self, anomaly_type: AnomalyType) -> usize {
        self.anomalies
            .iter()
            .filter(|a| a.anomaly_type == anomaly_type)
            .count()
    }
}

/// Collects findings in insertion order and is finalized once.
#[derive(Debug, Default)]
pub struct AnomalyReportBuilder {
    anomalies: Vec<AnomalyRecord>,
}

impl AnomalyReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: AnomalyRecord) {
        self.anomalies.push(record);
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = AnomalyRecord>) {
        self.anomalies.extend(records);
    }

    pub fn len(&self) -> usize {
        self.anomalies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anomalies.is_empty()
    }

    pub fn finish(self) -> AnomalyReport {
        AnomalyReport {
            anomalies: self.anomalies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, anomaly_type: AnomalyType, severity: Severity) -> AnomalyRecord {
        AnomalyRecord::new(name, anomaly_type, severity, "test", Measurement::None, "-")
    }

    #[test]
    fn test_builder_preserves_insertion_order() {
        let mut builder = AnomalyReportBuilder::new();
        builder.push(record("b", AnomalyType::MissingValues, Severity::Error));
        builder.push(record("a", AnomalyType::OutOfDomain, Severity::Error));
        let report = builder.finish();
        let names: Vec<&str> = report.anomalies().iter().map(|a| a.feature_name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_has_errors_ignores_warnings() {
        let mut builder = AnomalyReportBuilder::new();
        builder.push(record("x", AnomalyType::UnexpectedFeature, Severity::Warning));
        let report = builder.finish();
        assert!(!report.has_errors());
        assert_eq!(report.count_of(AnomalyType::UnexpectedFeature), 1);
    }

    #[test]
    fn test_anomaly_type_serializes_screaming_case() {
        let json = serde_json::to_string(&AnomalyType::TrainingServingSkew).unwrap();
        assert_eq!(json, "\"TRAINING_SERVING_SKEW\"");
        assert_eq!(AnomalyType::OutOfDomain.to_string(), "OUT_OF_DOMAIN");
    }
}
