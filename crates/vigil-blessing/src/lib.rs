// crates/vigil-blessing/src/lib.rs
//
// vigil-blessing: Candidate vs. baseline model blessing for Vigil.
//
// Applies user-supplied threshold rules to two already-computed metric
// collections and produces an accept/reject decision with a full per-rule
// rationale. A model is blessed only when every rule passes.

pub mod engine;
pub mod marker;

pub use engine::{evaluate, BlessingEngine};
pub use marker::{BlessingMarker, BLESSED_PROPERTY};
