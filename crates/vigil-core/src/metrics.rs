// crates/vigil-core/src/metrics.rs
//
// Already-computed evaluation metrics for one model.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::VigilError;

/// Metric values for one data slice. `slice == None` is the aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    #[serde(default)]
    pub slice: Option<String>,
    pub values: BTreeMap<String, f64>,
}

impl MetricSet {
    /// Aggregate (unsliced) metric set.
    pub fn aggregate() -> Self {
        Self::default()
    }

    pub fn for_slice(slice: impl Into<String>) -> Self {
        Self {
            slice: Some(slice.into()),
            values: BTreeMap::new(),
        }
    }

    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn get(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).copied()
    }
}

/// All metric sets computed for one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub model_id: String,
    pub sets: Vec<MetricSet>,
}

impl ModelMetrics {
    pub fn new(model_id: impl Into<String>, sets: Vec<MetricSet>) -> Self {
        Self {
            model_id: model_id.into(),
            sets,
        }
    }

    pub fn slice(&self, slice: Option<&str>) -> Option<&MetricSet> {
        self.sets.iter().find(|s| s.slice.as_deref() == slice)
    }

    /// Look up a metric value for a slice (`None` = aggregate).
    pub fn value(&self, metric: &str, slice: Option<&str>) -> Option<f64> {
        self.slice(slice).and_then(|s| s.get(metric))
    }

    pub fn slice_ids(&self) -> impl Iterator<Item = Option<&str>> {
        self.sets.iter().map(|s| s.slice.as_deref())
    }

    /// Reject duplicate slices and non-finite values.
    pub fn validate(&self) -> Result<(), VigilError> {
        let mut seen = HashSet::new();
        for set in &self.sets {
            if !seen.insert(set.slice.as_deref()) {
                return Err(VigilError::MalformedMetrics(format!(
                    "model '{}': duplicate slice {}",
                    self.model_id,
                    slice_label(set.slice.as_deref())
                )));
            }
            for (name, value) in &set.values {
                if !value.is_finite() {
                    return Err(VigilError::MalformedMetrics(format!(
                        "model '{}': metric '{}' on slice {} is not finite ({})",
                        self.model_id,
                        name,
                        slice_label(set.slice.as_deref()),
                        value
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Human-readable slice name; the aggregate slice renders as `<aggregate>`.
pub fn slice_label(slice: Option<&str>) -> String {
    match slice {
        Some(s) => format!("'{}'", s),
        None => "<aggregate>".to_string(),
    }
}
