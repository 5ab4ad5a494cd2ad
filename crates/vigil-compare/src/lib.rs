// crates/vigil-compare/src/lib.rs
//
// vigil-compare: The comparator library for Vigil.
//
// Pure numeric functions shared by the anomaly detector and the skew/drift
// detector: bounded distances between two distributions, schema-domain
// membership checks, and the structural revalidation every summary passes
// through before it is compared. Nothing here holds state.

pub mod distance;
pub mod domain;
pub mod wellformed;

pub use distance::{categorical_distance, numeric_distance, value_distance, Distance};
pub use domain::{category_within, domain_violation, number_within, within_domain, DomainViolation};
pub use wellformed::{
    validate_dataset, validate_feature_statistics, validate_frequencies, validate_histogram,
};
