// crates/vigil-anomaly/src/inference.rs
//
// Schema inference from an observed statistics summary.
//
// Produces a starting schema that the summary itself satisfies. Users are
// expected to review and tighten it before checking it in.

use serde::{Deserialize, Serialize};

use vigil_compare::validate_dataset;
use vigil_core::{
    DatasetStatistics, FeatureSchema, FeatureShape, FeatureStatistics, Schema, ValueDomain,
    ValueStatistics, VigilError,
};

/// Knobs for schema inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceOptions {
    /// Largest number of distinct values turned into a category domain.
    /// Features with more distinct values get an unconstrained domain.
    #[serde(default = "default_max_domain_size")]
    pub max_domain_size: usize,
}

fn default_max_domain_size() -> usize {
    20
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            max_domain_size: default_max_domain_size(),
        }
    }
}

/// Infer one schema entry per observed feature, in statistics order.
pub fn infer_schema(statistics: &DatasetStatistics, options: &InferenceOptions) -> Result<Schema, VigilError> {
    validate_dataset(statistics)?;

    let features: Vec<FeatureSchema> = statistics
        .features
        .iter()
        .map(|stats| infer_feature(stats, options))
        .collect();

    tracing::info!(features = features.len(), "inferred schema");
    Schema::new(features)
}

fn infer_feature(stats: &FeatureStatistics, options: &InferenceOptions) -> FeatureSchema {
    let mut feature = FeatureSchema::new(&stats.name, stats.kind());

    if stats.total_count > 0 && stats.missing_count == 0 {
        feature = feature.required();
    }

    if let ValueStatistics::Categorical(categorical) = &stats.values {
        let observed: Vec<String> = categorical
            .frequencies
            .iter()
            .filter(|f| f.count > 0.0)
            .map(|f| f.value.clone())
            .collect();
        if !observed.is_empty() && observed.len() <= options.max_domain_size {
            feature = feature.with_domain(ValueDomain::Categories { values: observed });
        } else {
            tracing::debug!(
                feature = %stats.name,
                distinct = observed.len(),
                "leaving categorical domain unconstrained"
            );
        }
    }

    if stats.present_count() > 0 {
        let (lo, hi) = (stats.min_num_values, stats.max_num_values);
        let shape = if lo == hi && lo > 0 {
            FeatureShape::Fixed { length: lo }
        } else {
            FeatureShape::Variable {
                min: Some(lo),
                max: Some(hi),
            }
        };
        feature = feature.with_shape(shape);
    }

    feature
}
