// crates/vigil-drift/src/lib.rs
//
// vigil-drift: Training/serving skew and distribution drift detection
// for Vigil.
//
// Compares two statistics summaries feature by feature and reports features
// whose distributions moved further apart than the configured threshold.
// Skew and drift share one procedure and differ only in the anomaly tag.
// The detector is stateless; time-ordered comparisons are driven by the
// caller through `sequence`.

pub mod detection;
pub mod sequence;

pub use detection::{compare, compare_parallel, ComparisonKind, SkewDetector};
pub use sequence::{compare_sequence, SequenceMode, SequenceStep};
