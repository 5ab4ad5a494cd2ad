// crates/vigil-core/src/config.rs
//
// Threshold configuration threaded into every validation call.
// Deserialized from TOML or populated with the documented defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::VigilError;

/// Immutable thresholds for anomaly, skew, and drift detection.
///
/// Global defaults apply to every feature unless `features` carries an
/// override for that feature name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Allowed fraction of examples missing a required feature.
    #[serde(default = "default_missing_fraction_tolerance")]
    pub missing_fraction_tolerance: f64,

    /// Fraction of present values allowed to fall outside the declared domain.
    /// Zero means any violation is reported.
    #[serde(default = "default_domain_violation_tolerance")]
    pub domain_violation_tolerance: f64,

    /// Distance above which skew or drift is reported.
    #[serde(default = "default_distance_threshold")]
    pub distance_threshold: f64,

    /// Per-feature overrides keyed by feature name.
    #[serde(default)]
    pub features: BTreeMap<String, FeatureThresholds>,
}

/// Per-feature overrides. Unset fields fall back to the global value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureThresholds {
    #[serde(default)]
    pub missing_fraction_tolerance: Option<f64>,
    #[serde(default)]
    pub domain_violation_tolerance: Option<f64>,
    #[serde(default)]
    pub distance_threshold: Option<f64>,
}

fn default_missing_fraction_tolerance() -> f64 {
    0.0
}

fn default_domain_violation_tolerance() -> f64 {
    0.0
}

fn default_distance_threshold() -> f64 {
    0.1
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            missing_fraction_tolerance: default_missing_fraction_tolerance(),
            domain_violation_tolerance: default_domain_violation_tolerance(),
            distance_threshold: default_distance_threshold(),
            features: BTreeMap::new(),
        }
    }
}

impl ValidationConfig {
    /// Parse a TOML document and validate the result.
    pub fn from_toml_str(contents: &str) -> Result<Self, VigilError> {
        let config: ValidationConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Builder-style override for a single feature.
    pub fn with_feature(mut self, name: impl Into<String>, thresholds: FeatureThresholds) -> Self {
        self.features.insert(name.into(), thresholds);
        self
    }

    pub fn missing_tolerance_for(&self, feature: &str) -> f64 {
        self.features
            .get(feature)
            .and_then(|t| t.missing_fraction_tolerance)
            .unwrap_or(self.missing_fraction_tolerance)
    }

    pub fn domain_tolerance_for(&self, feature: &str) -> f64 {
        self.features
            .get(feature)
            .and_then(|t| t.domain_violation_tolerance)
            .unwrap_or(self.domain_violation_tolerance)
    }

    pub fn distance_threshold_for(&self, feature: &str) -> f64 {
        self.features
            .get(feature)
            .and_then(|t| t.distance_threshold)
            .unwrap_or(self.distance_threshold)
    }

    /// Reject fractions outside [0, 1] and negative or non-finite thresholds.
    pub fn validate(&self) -> Result<(), VigilError> {
        check_fraction("missing_fraction_tolerance", self.missing_fraction_tolerance)?;
        check_fraction("domain_violation_tolerance", self.domain_violation_tolerance)?;
        check_threshold("distance_threshold", self.distance_threshold)?;

        for (name, overrides) in &self.features {
            if let Some(v) = overrides.missing_fraction_tolerance {
                check_fraction(&format!("features.{}.missing_fraction_tolerance", name), v)?;
            }
            if let Some(v) = overrides.domain_violation_tolerance {
                check_fraction(&format!("features.{}.domain_violation_tolerance", name), v)?;
            }
            if let Some(v) = overrides.distance_threshold {
                check_threshold(&format!("features.{}.distance_threshold", name), v)?;
            }
        }
        Ok(())
    }
}

fn check_fraction(field: &str, value: f64) -> Result<(), VigilError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(VigilError::InvalidConfig(format!(
            "{} must be within [0, 1], got {}",
            field, value
        )));
    }
    Ok(())
}

fn check_threshold(field: &str, value: f64) -> Result<(), VigilError> {
    if !value.is_finite() || value < 0.0 {
        return Err(VigilError::InvalidConfig(format!(
            "{} must be a non-negative finite number, got {}",
            field, value
        )));
    }
    Ok(())
}
