// crates/vigil-compare/src/domain.rs
//
// Schema-domain membership checks.

use vigil_core::{FeatureStatistics, Histogram, ValueDomain, ValueStatistics, VigilError};

use crate::wellformed::validate_feature_statistics;

/// What part of a feature's observed values falls outside its domain.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainViolation {
    /// All observed values are inside the domain.
    None,
    /// Categorical values outside the allowed set.
    Values { values: Vec<String>, fraction: f64 },
    /// Numeric mass outside the declared bounds, with the observed range.
    Range { min: f64, max: f64, fraction: f64 },
}

impl DomainViolation {
    pub fn is_violation(&self) -> bool {
        !matches!(self, DomainViolation::None)
    }

    /// Fraction of observed values affected, in [0, 1].
    pub fn fraction(&self) -> f64 {
        match self {
            DomainViolation::None => 0.0,
            DomainViolation::Values { fraction, .. } | DomainViolation::Range { fraction, .. } => {
                *fraction
            }
        }
    }
}

pub fn number_within(value: f64, domain: &ValueDomain) -> bool {
    match domain {
        ValueDomain::Range { min, max } => {
            min.map_or(true, |lo| value >= lo) && max.map_or(true, |hi| value <= hi)
        }
        ValueDomain::Any => true,
        ValueDomain::Categories { .. } => false,
    }
}

pub fn category_within(value: &str, domain: &ValueDomain) -> bool {
    match domain {
        ValueDomain::Categories { values } => values.iter().any(|v| v == value),
        ValueDomain::Any => true,
        ValueDomain::Range { .. } => false,
    }
}

/// True iff every observed value of the feature lies inside `domain`.
///
/// For numeric features the observed min/max decide; histogram mass only
/// sizes a violation once an extreme falls outside the declared bounds.
pub fn within_domain(stats: &FeatureStatistics, domain: &ValueDomain) -> Result<bool, VigilError> {
    Ok(!domain_violation(stats, domain)?.is_violation())
}

/// Measure how much of the feature's observed mass lies outside `domain`.
///
/// Fails with `InvalidSchema` when the domain cannot constrain the observed
/// value kind (e.g. a numeric range against categorical statistics).
pub fn domain_violation(
    stats: &FeatureStatistics,
    domain: &ValueDomain,
) -> Result<DomainViolation, VigilError> {
    validate_feature_statistics(stats)?;

    if stats.present_count() == 0 {
        return Ok(DomainViolation::None);
    }

    match (domain, &stats.values) {
        (ValueDomain::Any, _) => Ok(DomainViolation::None),
        (ValueDomain::Categories { .. }, ValueStatistics::Categorical(categorical)) => {
            let total = categorical.total();
            let offending: Vec<&vigil_core::FrequencyEntry> = categorical
                .frequencies
                .iter()
                .filter(|f| f.count > 0.0 && !category_within(&f.value, domain))
                .collect();
            if offending.is_empty() {
                return Ok(DomainViolation::None);
            }
            let outside: f64 = offending.iter().map(|f| f.count).sum();
            Ok(DomainViolation::Values {
                values: offending.iter().map(|f| f.value.clone()).collect(),
                fraction: if total > 0.0 { outside / total } else { 1.0 },
            })
        }
        (ValueDomain::Range { min, max }, ValueStatistics::Numeric(numeric)) => {
            // The observed extremes bound every value, whatever the bucket edges say.
            if number_within(numeric.min, domain) && number_within(numeric.max, domain) {
                return Ok(DomainViolation::None);
            }
            let observed = (numeric.min, numeric.max);
            let outside = mass_outside(&numeric.histogram, observed, *min, *max);
            let total = numeric.histogram.total();
            // Without a histogram there is no way to size the violation.
            let fraction = if total > 0.0 { outside / total } else { 1.0 };
            Ok(DomainViolation::Range {
                min: numeric.min,
                max: numeric.max,
                fraction: fraction.clamp(0.0, 1.0),
            })
        }
        (domain, values) => Err(VigilError::InvalidSchema(format!(
            "feature '{}': domain '{}' cannot constrain {} values",
            stats.name,
            domain,
            values.kind()
        ))),
    }
}

/// Histogram mass strictly below `min` or strictly above `max`, assuming
/// values are spread uniformly inside each bucket once it is clipped to the
/// observed `[low, high]` range.
fn mass_outside(histogram: &Histogram, observed: (f64, f64), min: Option<f64>, max: Option<f64>) -> f64 {
    let mut outside = 0.0;
    for bucket in &histogram.buckets {
        if bucket.count <= 0.0 {
            continue;
        }
        let (mut low, mut high) = (bucket.low.max(observed.0), bucket.high.min(observed.1));
        if low > high {
            // Bucket lies wholly outside the observed range; keep its own edges.
            (low, high) = (bucket.low, bucket.high);
        }
        let width = high - low;
        if width == 0.0 {
            let below = min.map_or(false, |lo| low < lo);
            let above = max.map_or(false, |hi| low > hi);
            if below || above {
                outside += bucket.count;
            }
            continue;
        }
        if let Some(lo) = min {
            let cut = lo.clamp(low, high);
            outside += bucket.count * (cut - low) / width;
        }
        if let Some(hi) = max {
            let cut = hi.clamp(low, high);
            outside += bucket.count * (high - cut) / width;
        }
    }
    outside
}
