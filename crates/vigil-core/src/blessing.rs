// crates/vigil-core/src/blessing.rs
//
// Rules and decisions exchanged with the blessing engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::metrics::slice_label;

/// How a candidate value is compared against the baseline value.
///
/// Bounds are inclusive, with a relative slack of 1e-9 so that values on the
/// margin pass despite float rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    /// Passes iff `candidate >= baseline - margin`.
    GreaterOrEqual,
    /// Passes iff `candidate <= baseline + margin`.
    LessOrEqual,
    /// Passes iff `|candidate - baseline| <= margin`.
    WithinMargin,
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Comparator::GreaterOrEqual => "greater_or_equal",
            Comparator::LessOrEqual => "less_or_equal",
            Comparator::WithinMargin => "within_margin",
        };
        f.write_str(text)
    }
}

/// One acceptance criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlessingRule {
    pub metric: String,
    /// `None` targets the aggregate metric set.
    #[serde(default)]
    pub slice: Option<String>,
    pub comparator: Comparator,
    #[serde(default)]
    pub margin: f64,
}

impl BlessingRule {
    pub fn new(metric: impl Into<String>, comparator: Comparator, margin: f64) -> Self {
        Self {
            metric: metric.into(),
            slice: None,
            comparator,
            margin,
        }
    }

    pub fn on_slice(mut self, slice: impl Into<String>) -> Self {
        self.slice = Some(slice.into());
        self
    }
}

impl fmt::Display for BlessingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} {} (margin {})",
            self.metric,
            slice_label(self.slice.as_deref()),
            self.comparator,
            self.margin
        )
    }
}

/// Which side of the comparison lacked a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSide {
    Candidate,
    Baseline,
    Both,
}

/// Why a rule failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleFailure {
    /// The metric/slice was absent on one or both sides.
    MissingMetric { side: MetricSide },
    /// Both values were present but the comparator did not hold.
    ThresholdNotMet,
}

/// Outcome of evaluating one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub rule: BlessingRule,
    pub passed: bool,
    pub candidate_value: Option<f64>,
    pub baseline_value: Option<f64>,
    #[serde(default)]
    pub failure: Option<RuleFailure>,
}

/// A slice present in only one of the two metric collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceGap {
    pub slice: Option<String>,
    /// The side that carries the slice.
    pub present_in: MetricSide,
}

/// Accept/reject decision for a candidate model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlessingDecision {
    pub model_id: String,
    pub baseline_model_id: String,
    /// True iff every evaluated rule passed.
    pub blessed: bool,
    /// Outcomes in the order the rules were supplied.
    pub evaluated_rules: Vec<RuleOutcome>,
    pub slice_gaps: Vec<SliceGap>,
}

impl BlessingDecision {
    pub fn failed_rules(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.evaluated_rules.iter().filter(|o| !o.passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_deserializes_with_default_margin() {
        let rule: BlessingRule =
            serde_json::from_str(r#"{"metric": "auc", "comparator": "greater_or_equal"}"#).unwrap();
        assert_eq!(rule.comparator, Comparator::GreaterOrEqual);
        assert_eq!(rule.margin, 0.0);
        assert!(rule.slice.is_none());
    }

    #[test]
    fn test_missing_metric_serializes_reason_tag() {
        let failure = RuleFailure::MissingMetric {
            side: MetricSide::Baseline,
        };
        let json = serde_json::to_string(&failure).unwrap();
        assert_eq!(json, r#"{"reason":"MISSING_METRIC","side":"baseline"}"#);
    }
}
