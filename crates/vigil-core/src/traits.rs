// crates/vigil-core/src/traits.rs

use crate::anomaly::AnomalyReport;
use crate::blessing::{BlessingDecision, BlessingRule};
use crate::error::VigilError;
use crate::metrics::ModelMetrics;
use crate::schema::Schema;
use crate::statistics::DatasetStatistics;

/// Validates one statistics summary against a schema.
///
/// Implemented by vigil-anomaly.
pub trait StatisticsValidator: Send + Sync {
    fn validate(&self, schema: &Schema, statistics: &DatasetStatistics) -> Result<AnomalyReport, VigilError>;
}

/// Compares a summary against a reference summary.
///
/// Implemented by vigil-drift for training/serving skew and drift.
pub trait DistributionComparator: Send + Sync {
    fn compare(
        &self,
        reference: &DatasetStatistics,
        comparison: &DatasetStatistics,
    ) -> Result<AnomalyReport, VigilError>;
}

/// Decides whether a candidate model may replace a baseline.
///
/// Implemented by vigil-blessing.
pub trait ModelValidator: Send + Sync {
    fn bless(
        &self,
        candidate: &ModelMetrics,
        baseline: &ModelMetrics,
        rules: &[BlessingRule],
    ) -> Result<BlessingDecision, VigilError>;
}
