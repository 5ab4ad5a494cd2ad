// crates/vigil-core/src/schema.rs
//
// Declarative per-feature expectations.
//
// A Schema is an ordered list of FeatureSchema entries. Declaration order is
// the order in which the anomaly detector walks features and therefore the
// order of the anomalies it reports.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::VigilError;

/// Value kind of a feature, declared by the schema or observed in statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureType {
    Categorical,
    Numeric,
    Bytes,
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeatureType::Categorical => "categorical",
            FeatureType::Numeric => "numeric",
            FeatureType::Bytes => "bytes",
        };
        f.write_str(name)
    }
}

/// Presence requirement for a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePresence {
    /// Whether every example is expected to carry the feature.
    pub required: bool,
    /// Allowed fraction of examples missing the feature. When unset, the
    /// tolerance comes from the validation config.
    #[serde(default)]
    pub max_missing_fraction: Option<f64>,
}

impl FeaturePresence {
    pub fn required() -> Self {
        Self {
            required: true,
            max_missing_fraction: None,
        }
    }

    pub fn optional() -> Self {
        Self {
            required: false,
            max_missing_fraction: None,
        }
    }
}

impl Default for FeaturePresence {
    fn default() -> Self {
        Self::optional()
    }
}

/// Allowed values of a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueDomain {
    /// No constraint.
    Any,
    /// Categorical feature restricted to a fixed vocabulary.
    Categories { values: Vec<String> },
    /// Numeric feature restricted to a closed interval. Either bound may be open.
    Range {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
}

impl Default for ValueDomain {
    fn default() -> Self {
        ValueDomain::Any
    }
}

impl fmt::Display for ValueDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueDomain::Any => f.write_str("any value"),
            ValueDomain::Categories { values } => write!(f, "one of {{{}}}", values.join(", ")),
            ValueDomain::Range { min, max } => {
                let lo = min.map_or("-inf".to_string(), |v| v.to_string());
                let hi = max.map_or("+inf".to_string(), |v| v.to_string());
                write!(f, "within [{}, {}]", lo, hi)
            }
        }
    }
}

/// Number of values a feature carries per example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureShape {
    Any,
    /// Every present example carries exactly `length` values.
    Fixed { length: u32 },
    /// Valency bounds for variable-length features.
    Variable {
        #[serde(default)]
        min: Option<u32>,
        #[serde(default)]
        max: Option<u32>,
    },
}

impl Default for FeatureShape {
    fn default() -> Self {
        FeatureShape::Any
    }
}

impl fmt::Display for FeatureShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureShape::Any => f.write_str("any valency"),
            FeatureShape::Fixed { length } => write!(f, "exactly {} value(s) per example", length),
            FeatureShape::Variable { min, max } => {
                let lo = min.unwrap_or(0);
                let hi = max.map_or("unbounded".to_string(), |v| v.to_string());
                write!(f, "between {} and {} value(s) per example", lo, hi)
            }
        }
    }
}

/// Expectations for a single feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub name: String,
    pub feature_type: FeatureType,
    #[serde(default)]
    pub presence: FeaturePresence,
    #[serde(default)]
    pub domain: ValueDomain,
    #[serde(default)]
    pub shape: FeatureShape,
}

impl FeatureSchema {
    /// An optional feature of the given type with no constraints.
    pub fn new(name: impl Into<String>, feature_type: FeatureType) -> Self {
        Self {
            name: name.into(),
            feature_type,
            presence: FeaturePresence::default(),
            domain: ValueDomain::Any,
            shape: FeatureShape::Any,
        }
    }

    pub fn required(mut self) -> Self {
        self.presence.required = true;
        self
    }

    pub fn with_max_missing_fraction(mut self, fraction: f64) -> Self {
        self.presence.max_missing_fraction = Some(fraction);
        self
    }

    pub fn with_domain(mut self, domain: ValueDomain) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_shape(mut self, shape: FeatureShape) -> Self {
        self.shape = shape;
        self
    }

    /// Check that the entry is internally consistent.
    pub fn validate(&self) -> Result<(), VigilError> {
        let invalid = |detail: String| {
            VigilError::InvalidSchema(format!("feature '{}': {}", self.name, detail))
        };

        if self.name.is_empty() {
            return Err(VigilError::InvalidSchema("feature name must not be empty".to_string()));
        }

        if let Some(fraction) = self.presence.max_missing_fraction {
            if !(0.0..=1.0).contains(&fraction) {
                return Err(invalid(format!(
                    "max_missing_fraction must be within [0, 1], got {}",
                    fraction
                )));
            }
        }

        match (&self.domain, self.feature_type) {
            (ValueDomain::Any, _) => {}
            (ValueDomain::Categories { values }, FeatureType::Categorical) => {
                if values.is_empty() {
                    return Err(invalid("category domain must list at least one value".to_string()));
                }
                let mut seen = HashSet::new();
                for value in values {
                    if !seen.insert(value.as_str()) {
                        return Err(invalid(format!("duplicate category '{}'", value)));
                    }
                }
            }
            (ValueDomain::Range { min, max }, FeatureType::Numeric) => {
                for bound in [min, max].into_iter().flatten() {
                    if !bound.is_finite() {
                        return Err(invalid(format!("range bound {} is not finite", bound)));
                    }
                }
                if let (Some(lo), Some(hi)) = (min, max) {
                    if lo > hi {
                        return Err(invalid(format!("range min {} exceeds max {}", lo, hi)));
                    }
                }
            }
            (domain, kind) => {
                return Err(invalid(format!(
                    "domain '{}' cannot constrain a {} feature",
                    domain, kind
                )));
            }
        }

        match self.shape {
            FeatureShape::Any => {}
            FeatureShape::Fixed { length } => {
                if length == 0 {
                    return Err(invalid("fixed shape length must be positive".to_string()));
                }
            }
            FeatureShape::Variable { min, max } => {
                if let (Some(lo), Some(hi)) = (min, max) {
                    if lo > hi {
                        return Err(invalid(format!("valency min {} exceeds max {}", lo, hi)));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Ordered collection of feature expectations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub features: Vec<FeatureSchema>,
}

impl Schema {
    /// Build a schema, rejecting inconsistent entries and duplicate names.
    pub fn new(features: Vec<FeatureSchema>) -> Result<Self, VigilError> {
        let schema = Self { features };
        schema.validate()?;
        Ok(schema)
    }

    /// Look up a feature by name.
    pub fn feature(&self, name: &str) -> Option<&FeatureSchema> {
        self.features.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.feature(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn validate(&self) -> Result<(), VigilError> {
        let mut names = HashSet::new();
        for feature in &self.features {
            feature.validate()?;
            if !names.insert(feature.name.as_str()) {
                return Err(VigilError::InvalidSchema(format!(
                    "duplicate feature '{}'",
                    feature.name
                )));
            }
        }
        Ok(())
    }
}
