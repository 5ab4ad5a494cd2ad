// crates/vigil-drift/src/sequence.rs
//
// Pairwise comparisons over a time-ordered list of summaries.

use serde::{Deserialize, Serialize};

use vigil_core::{AnomalyReport, DatasetStatistics, ValidationConfig, VigilError};

use crate::detection::{compare, ComparisonKind};

/// Which summary each span is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceMode {
    /// Each summary against the one immediately before it.
    Previous,
    /// Each summary against the first summary.
    FixedReference,
}

/// Result of one comparison in a sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceStep {
    pub reference_index: usize,
    pub comparison_index: usize,
    pub report: AnomalyReport,
}

/// Compare every summary after the first according to `mode`.
///
/// Returns `summaries.len() - 1` steps in order (none for fewer than two
/// summaries). Fails on the first structurally invalid summary.
pub fn compare_sequence(
    summaries: &[DatasetStatistics],
    mode: SequenceMode,
    kind: ComparisonKind,
    config: &ValidationConfig,
) -> Result<Vec<SequenceStep>, VigilError> {
    let mut steps = Vec::with_capacity(summaries.len().saturating_sub(1));

    for comparison_index in 1..summaries.len() {
        let reference_index = match mode {
            SequenceMode::Previous => comparison_index - 1,
            SequenceMode::FixedReference => 0,
        };
        let report = compare(
            &summaries[reference_index],
            &summaries[comparison_index],
            kind,
            config,
        )?;
        steps.push(SequenceStep {
            reference_index,
            comparison_index,
            report,
        });
    }

    Ok(steps)
}
