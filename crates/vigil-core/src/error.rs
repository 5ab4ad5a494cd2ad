// crates/vigil-core/src/error.rs

use thiserror::Error;

/// Validation-wide error types.
///
/// Only structurally invalid input surfaces here. Feature-level findings
/// (missing values, drift, failed rules) are data, not errors.
#[derive(Debug, Error)]
pub enum VigilError {
    /// Statistics that make a comparison undefined (negative counts,
    /// inconsistent histogram buckets, counts exceeding totals).
    #[error("Malformed statistics: {0}")]
    MalformedStatistics(String),

    /// Metric sets with duplicate slices or non-finite values.
    #[error("Malformed metrics: {0}")]
    MalformedMetrics(String),

    /// Schema that violates its own invariants (duplicate names, min > max).
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Blessing rule that cannot be evaluated (negative margin).
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    /// Threshold configuration out of range.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for VigilError {
    fn from(e: serde_json::Error) -> Self {
        VigilError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for VigilError {
    fn from(e: toml::de::Error) -> Self {
        VigilError::Serialization(e.to_string())
    }
}

impl VigilError {
    /// Shorthand used at the comparator boundary.
    pub fn malformed(feature: &str, detail: impl std::fmt::Display) -> Self {
        VigilError::MalformedStatistics(format!("feature '{}': {}", feature, detail))
    }
}
