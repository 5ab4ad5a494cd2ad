// crates/vigil-anomaly/src/lib.rs
//
// vigil-anomaly: Schema-driven anomaly detection for Vigil.
//
// Walks a schema in declared order and checks one statistics summary against
// it (presence, type, domain, shape), and infers a starting schema from a
// summary when none exists yet.

pub mod detector;
pub mod inference;

// Re-export key types for ergonomic access from downstream crates.
pub use detector::{detect, detect_parallel, AnomalyDetector};
pub use inference::{infer_schema, InferenceOptions};
