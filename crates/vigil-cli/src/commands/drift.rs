// crates/vigil-cli/src/commands/drift.rs
//
// `vigil drift`: drift across a time-ordered list of summaries.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use vigil_core::DatasetStatistics;
use vigil_drift::{compare_sequence, ComparisonKind, SequenceMode, SequenceStep};

use super::{Context, Outcome};
use crate::input::{load, InputDigest};
use crate::output::render_report;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Compare each span with the one before it.
    Previous,
    /// Compare each span with the first span.
    Fixed,
}

impl From<ModeArg> for SequenceMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Previous => SequenceMode::Previous,
            ModeArg::Fixed => SequenceMode::FixedReference,
        }
    }
}

#[derive(Debug, Args)]
pub struct DriftArgs {
    /// Statistics summaries, oldest first.
    #[arg(long, num_args = 1.., required = true)]
    pub stats: Vec<PathBuf>,
    #[arg(long, value_enum, default_value = "previous")]
    pub mode: ModeArg,
}

/// Run the drift command.
pub fn run(args: &DriftArgs, ctx: &Context) -> Result<Outcome, Box<dyn std::error::Error>> {
    let mut summaries = Vec::with_capacity(args.stats.len());
    let mut inputs: Vec<InputDigest> = Vec::with_capacity(args.stats.len());
    for path in &args.stats {
        let loaded = load::<DatasetStatistics>("span", path)?;
        summaries.push(loaded.value);
        inputs.push(loaded.digest);
    }
    if summaries.len() < 2 {
        tracing::warn!("drift needs at least two summaries, nothing to compare");
    }

    let steps = compare_sequence(
        &summaries,
        args.mode.into(),
        ComparisonKind::DistributionDrift,
        &ctx.config.validation,
    )?;

    let flagged = steps.iter().any(|s| s.report.has_errors());
    ctx.emit("drift", inputs, &steps, || render_steps(&steps, &args.stats));
    Ok(Outcome::flagged_if(flagged))
}

fn render_steps(steps: &[SequenceStep], paths: &[PathBuf]) -> String {
    if steps.is_empty() {
        return "No comparisons run.".to_string();
    }
    steps
        .iter()
        .map(|step| {
            format!(
                "{} -> {}\n{}",
                paths[step.reference_index].display(),
                paths[step.comparison_index].display(),
                render_report(&step.report)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
