// crates/vigil-core/src/lib.rs
//
// vigil-core: Core types, configuration, and error definitions for Vigil.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the schema and statistics models, anomaly records, metric sets,
// blessing decisions, threshold configuration, and the trait seams the
// detector crates implement. It performs no I/O.

pub mod anomaly;
pub mod blessing;
pub mod config;
pub mod error;
pub mod metrics;
pub mod schema;
pub mod statistics;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use vigil_core::Schema;`

// Schema types
pub use schema::{FeaturePresence, FeatureSchema, FeatureShape, FeatureType, Schema, ValueDomain};

// Statistics types
pub use statistics::{
    Bucket, BytesStatistics, CategoricalStatistics, DatasetStatistics, FeatureStatistics,
    FrequencyEntry, Histogram, NumericStatistics, ValueStatistics,
};

// Anomaly types
pub use anomaly::{
    AnomalyRecord, AnomalyReport, AnomalyReportBuilder, AnomalyType, ComparisonGap, Measurement,
    Severity,
};

// Metric and blessing types
pub use blessing::{
    BlessingDecision, BlessingRule, Comparator, MetricSide, RuleFailure, RuleOutcome, SliceGap,
};
pub use metrics::{MetricSet, ModelMetrics};

// Configuration
pub use config::{FeatureThresholds, ValidationConfig};

// Error type
pub use error::VigilError;

// Traits
pub use traits::{DistributionComparator, ModelValidator, StatisticsValidator};
