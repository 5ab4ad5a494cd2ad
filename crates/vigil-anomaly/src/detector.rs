// crates/vigil-anomaly/src/detector.rs
//
// Anomaly detection: one statistics summary against a schema.
//
// Per declared feature, in schema order:
// 1. presence   -> MISSING_VALUES
// 2. type       -> TYPE_MISMATCH (skips 3 and 4; needs present values)
// 3. domain     -> OUT_OF_DOMAIN
// 4. shape      -> SHAPE_MISMATCH
// Features observed but not declared are reported once as UNEXPECTED_FEATURE
// after all declared features, in statistics order.

use rayon::prelude::*;

use vigil_compare::{domain_violation, validate_dataset, DomainViolation};
use vigil_core::metrics::slice_label;
use vigil_core::{
    AnomalyRecord, AnomalyReport, AnomalyReportBuilder, AnomalyType, DatasetStatistics,
    FeatureSchema, FeatureShape, FeatureStatistics, Measurement, Schema, Severity,
    StatisticsValidator, ValidationConfig, VigilError,
};

/// Validates statistics against a schema using a fixed threshold config.
#[derive(Debug, Clone, Default)]
pub struct AnomalyDetector {
    config: ValidationConfig,
}

impl AnomalyDetector {
    /// Create a detector, rejecting an out-of-range config up front.
    pub fn new(config: ValidationConfig) -> Result<Self, VigilError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn detect(&self, schema: &Schema, statistics: &DatasetStatistics) -> Result<AnomalyReport, VigilError> {
        detect(schema, statistics, &self.config)
    }
}

impl StatisticsValidator for AnomalyDetector {
    fn validate(&self, schema: &Schema, statistics: &DatasetStatistics) -> Result<AnomalyReport, VigilError> {
        self.detect(schema, statistics)
    }
}

/// Check `statistics` against `schema`.
///
/// Deterministic: identical inputs yield an identical, identically ordered
/// report. Fails only on structurally invalid schema, statistics, or config.
pub fn detect(
    schema: &Schema,
    statistics: &DatasetStatistics,
    config: &ValidationConfig,
) -> Result<AnomalyReport, VigilError> {
    revalidate(schema, statistics, config)?;

    let mut builder = AnomalyReportBuilder::new();
    for feature in &schema.features {
        builder.extend(check_feature(feature, statistics, config)?);
    }
    builder.extend(unexpected_features(schema, statistics));

    finish(builder, statistics)
}

/// Same result as [`detect`], with per-feature checks spread over the rayon
/// pool. Results are concatenated back in schema order.
pub fn detect_parallel(
    schema: &Schema,
    statistics: &DatasetStatistics,
    config: &ValidationConfig,
) -> Result<AnomalyReport, VigilError> {
    revalidate(schema, statistics, config)?;

    let per_feature: Vec<Vec<AnomalyRecord>> = schema
        .features
        .par_iter()
        .map(|feature| check_feature(feature, statistics, config))
        .collect::<Result<_, _>>()?;

    let mut builder = AnomalyReportBuilder::new();
    for records in per_feature {
        builder.extend(records);
    }
    builder.extend(unexpected_features(schema, statistics));

    finish(builder, statistics)
}

fn revalidate(schema: &Schema, statistics: &DatasetStatistics, config: &ValidationConfig) -> Result<(), VigilError> {
    schema.validate()?;
    config.validate()?;
    validate_dataset(statistics)
}

fn finish(builder: AnomalyReportBuilder, statistics: &DatasetStatistics) -> Result<AnomalyReport, VigilError> {
    let report = builder.finish();
    tracing::info!(
        slice = %slice_label(statistics.slice.as_deref()),
        features = statistics.features.len(),
        anomalies = report.len(),
        "anomaly detection complete"
    );
    Ok(report)
}

fn unexpected_features<'a>(
    schema: &'a Schema,
    statistics: &'a DatasetStatistics,
) -> impl Iterator<Item = AnomalyRecord> + 'a {
    statistics
        .features
        .iter()
        .filter(move |f| !schema.contains(&f.name))
        .map(|f| {
            tracing::debug!(feature = %f.name, "feature not declared in schema");
            AnomalyRecord::new(
                &f.name,
                AnomalyType::UnexpectedFeature,
                Severity::Warning,
                format!("Feature '{}' is not declared in the schema", f.name),
                Measurement::Kind { observed: f.kind() },
                "feature declared in schema",
            )
        })
}

/// All findings for one declared feature.
fn check_feature(
    feature: &FeatureSchema,
    statistics: &DatasetStatistics,
    config: &ValidationConfig,
) -> Result<Vec<AnomalyRecord>, VigilError> {
    let mut found = Vec::new();

    let stats = match statistics.feature(&feature.name) {
        Some(stats) => stats,
        None => {
            if feature.presence.required && statistics.num_examples > 0 {
                found.push(AnomalyRecord::new(
                    &feature.name,
                    AnomalyType::MissingValues,
                    Severity::Error,
                    format!("Required feature '{}' is absent from every example", feature.name),
                    Measurement::Fraction { value: 1.0 },
                    format!("missing fraction <= {}", allowed_missing(feature, config)),
                ));
            }
            return Ok(found);
        }
    };

    if let Some(record) = check_presence(feature, stats, config) {
        found.push(record);
    }

    // With no present values the observed kind has nothing behind it.
    if stats.present_count() > 0 && stats.kind() != feature.feature_type {
        tracing::debug!(
            feature = %feature.name,
            declared = %feature.feature_type,
            observed = %stats.kind(),
            "type mismatch, skipping domain and shape checks"
        );
        found.push(AnomalyRecord::new(
            &feature.name,
            AnomalyType::TypeMismatch,
            Severity::Error,
            format!(
                "Expected {} values but observed {} values",
                feature.feature_type,
                stats.kind()
            ),
            Measurement::Kind {
                observed: stats.kind(),
            },
            feature.feature_type.to_string(),
        ));
        return Ok(found);
    }

    if let Some(record) = check_domain(feature, stats, config)? {
        found.push(record);
    }
    if let Some(record) = check_shape(feature, stats) {
        found.push(record);
    }

    Ok(found)
}

fn allowed_missing(feature: &FeatureSchema, config: &ValidationConfig) -> f64 {
    feature
        .presence
        .max_missing_fraction
        .unwrap_or_else(|| config.missing_tolerance_for(&feature.name))
}

fn check_presence(
    feature: &FeatureSchema,
    stats: &FeatureStatistics,
    config: &ValidationConfig,
) -> Option<AnomalyRecord> {
    if !feature.presence.required {
        return None;
    }
    let allowed = allowed_missing(feature, config);
    let observed = stats.missing_fraction();
    if observed <= allowed {
        return None;
    }
    Some(AnomalyRecord::new(
        &feature.name,
        AnomalyType::MissingValues,
        Severity::Error,
        format!(
            "{} of {} examples are missing required feature '{}'",
            stats.missing_count, stats.total_count, feature.name
        ),
        Measurement::Fraction { value: observed },
        format!("missing fraction <= {}", allowed),
    ))
}

fn check_domain(
    feature: &FeatureSchema,
    stats: &FeatureStatistics,
    config: &ValidationConfig,
) -> Result<Option<AnomalyRecord>, VigilError> {
    let violation = domain_violation(stats, &feature.domain)?;
    if !violation.is_violation() {
        return Ok(None);
    }

    let tolerance = config.domain_tolerance_for(&feature.name);
    if tolerance > 0.0 && violation.fraction() <= tolerance {
        tracing::debug!(
            feature = %feature.name,
            fraction = violation.fraction(),
            tolerance,
            "domain violation within tolerance"
        );
        return Ok(None);
    }

    let (description, measured) = match violation {
        DomainViolation::Values { values, fraction } => (
            format!("Unexpected values: {}", values.join(", ")),
            Measurement::Values { values, fraction },
        ),
        DomainViolation::Range { min, max, fraction } => (
            format!("Observed range [{}, {}] exceeds declared bounds", min, max),
            Measurement::Range { min, max, fraction },
        ),
        DomainViolation::None => return Ok(None),
    };

    Ok(Some(AnomalyRecord::new(
        &feature.name,
        AnomalyType::OutOfDomain,
        Severity::Error,
        description,
        measured,
        feature.domain.to_string(),
    )))
}

fn check_shape(feature: &FeatureSchema, stats: &FeatureStatistics) -> Option<AnomalyRecord> {
    if stats.present_count() == 0 {
        return None;
    }
    let (lo, hi) = (stats.min_num_values, stats.max_num_values);

    let violated = match feature.shape {
        FeatureShape::Any => false,
        FeatureShape::Fixed { length } => lo != length || hi != length,
        FeatureShape::Variable { min, max } => {
            min.map_or(false, |m| lo < m) || max.map_or(false, |m| hi > m)
        }
    };
    if !violated {
        return None;
    }

    Some(AnomalyRecord::new(
        &feature.name,
        AnomalyType::ShapeMismatch,
        Severity::Error,
        format!("Examples carry between {} and {} values", lo, hi),
        Measurement::Valency { min: lo, max: hi },
        feature.shape.to_string(),
    ))
}
