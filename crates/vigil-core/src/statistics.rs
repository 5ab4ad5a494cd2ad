// crates/vigil-core/src/statistics.rs
//
// Observed per-feature distributions for one dataset slice.
//
// These summaries are produced by an upstream statistics generator; this
// crate only defines their shape. Structural checks live in vigil-compare,
// which revalidates every summary before comparing it.

use serde::{Deserialize, Serialize};

use crate::schema::FeatureType;

/// One histogram bucket covering the closed interval [low, high].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub low: f64,
    pub high: f64,
    /// Number of values in the bucket. Fractional counts come from weighted
    /// or sampled statistics.
    pub count: f64,
}

impl Bucket {
    pub fn new(low: f64, high: f64, count: f64) -> Self {
        Self { low, high, count }
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

/// Ordered, non-overlapping buckets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub buckets: Vec<Bucket>,
}

impl Histogram {
    pub fn new(buckets: Vec<Bucket>) -> Self {
        Self { buckets }
    }

    /// Total mass across all buckets.
    pub fn total(&self) -> f64 {
        self.buckets.iter().map(|b| b.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() <= 0.0
    }
}

/// One row of a categorical frequency table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub value: String,
    pub count: f64,
}

impl FrequencyEntry {
    pub fn new(value: impl Into<String>, count: f64) -> Self {
        Self {
            value: value.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
    #[serde(default)]
    pub histogram: Histogram,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoricalStatistics {
    /// Ranked by descending count. Values are unique.
    pub frequencies: Vec<FrequencyEntry>,
}

impl CategoricalStatistics {
    pub fn total(&self) -> f64 {
        self.frequencies.iter().map(|f| f.count).sum()
    }

    pub fn count_of(&self, value: &str) -> f64 {
        self.frequencies
            .iter()
            .find(|f| f.value == value)
            .map_or(0.0, |f| f.count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BytesStatistics {
    pub min_length: f64,
    pub max_length: f64,
    /// Distribution of value lengths in bytes.
    #[serde(default)]
    pub length_histogram: Histogram,
}

/// Kind-specific part of a feature summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ValueStatistics {
    Numeric(NumericStatistics),
    Categorical(CategoricalStatistics),
    Bytes(BytesStatistics),
}

impl ValueStatistics {
    /// The value kind these statistics were computed for.
    pub fn kind(&self) -> FeatureType {
        match self {
            ValueStatistics::Numeric(_) => FeatureType::Numeric,
            ValueStatistics::Categorical(_) => FeatureType::Categorical,
            ValueStatistics::Bytes(_) => FeatureType::Bytes,
        }
    }

    /// Sum of histogram or frequency counts.
    pub fn observed_mass(&self) -> f64 {
        match self {
            ValueStatistics::Numeric(n) => n.histogram.total(),
            ValueStatistics::Categorical(c) => c.total(),
            ValueStatistics::Bytes(b) => b.length_histogram.total(),
        }
    }
}

/// Observed distribution of one feature in one slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureStatistics {
    pub name: String,
    /// Number of examples in the slice.
    pub total_count: u64,
    /// Examples that do not carry the feature.
    pub missing_count: u64,
    /// Smallest number of values seen in a present example.
    #[serde(default = "one")]
    pub min_num_values: u32,
    /// Largest number of values seen in a present example.
    #[serde(default = "one")]
    pub max_num_values: u32,
    pub values: ValueStatistics,
}

fn one() -> u32 {
    1
}

impl FeatureStatistics {
    pub fn new(name: impl Into<String>, total_count: u64, missing_count: u64, values: ValueStatistics) -> Self {
        Self {
            name: name.into(),
            total_count,
            missing_count,
            min_num_values: 1,
            max_num_values: 1,
            values,
        }
    }

    pub fn with_valency(mut self, min: u32, max: u32) -> Self {
        self.min_num_values = min;
        self.max_num_values = max;
        self
    }

    pub fn kind(&self) -> FeatureType {
        self.values.kind()
    }

    /// Examples that carry the feature.
    pub fn present_count(&self) -> u64 {
        self.total_count.saturating_sub(self.missing_count)
    }

    /// Fraction of examples missing the feature. Zero for an empty slice.
    pub fn missing_fraction(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        self.missing_count as f64 / self.total_count as f64
    }
}

/// Statistics for every feature of one dataset slice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetStatistics {
    /// Slice identifier; `None` for the whole dataset.
    #[serde(default)]
    pub slice: Option<String>,
    pub num_examples: u64,
    pub features: Vec<FeatureStatistics>,
}

impl DatasetStatistics {
    pub fn new(num_examples: u64, features: Vec<FeatureStatistics>) -> Self {
        Self {
            slice: None,
            num_examples,
            features,
        }
    }

    pub fn feature(&self, name: &str) -> Option<&FeatureStatistics> {
        self.features.iter().find(|f| f.name == name)
    }
}
