// crates/vigil-cli/src/commands/compare.rs
//
// `vigil compare`: training/serving skew or drift between two summaries.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use vigil_core::DatasetStatistics;
use vigil_drift::{compare, compare_parallel, ComparisonKind};

use super::{Context, Outcome};
use crate::input::load;
use crate::output::render_report;

/// Comparison tag accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// Training (reference) against serving (comparison) data.
    Skew,
    /// An earlier span (reference) against a later one (comparison).
    Drift,
}

impl From<KindArg> for ComparisonKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Skew => ComparisonKind::TrainingServingSkew,
            KindArg::Drift => ComparisonKind::DistributionDrift,
        }
    }
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Reference statistics summary.
    #[arg(long)]
    pub reference: PathBuf,
    /// Comparison statistics summary.
    #[arg(long)]
    pub comparison: PathBuf,
    #[arg(long, value_enum, default_value = "skew")]
    pub kind: KindArg,
    /// Compare features on the rayon thread pool.
    #[arg(long)]
    pub parallel: bool,
}

/// Run the compare command.
pub fn run(args: &CompareArgs, ctx: &Context) -> Result<Outcome, Box<dyn std::error::Error>> {
    let reference = load::<DatasetStatistics>("reference", &args.reference)?;
    let comparison = load::<DatasetStatistics>("comparison", &args.comparison)?;

    let kind = ComparisonKind::from(args.kind);
    let config = &ctx.config.validation;
    let report = if args.parallel {
        compare_parallel(&reference.value, &comparison.value, kind, config)?
    } else {
        compare(&reference.value, &comparison.value, kind, config)?
    };

    ctx.emit(
        "compare",
        vec![reference.digest, comparison.digest],
        &report,
        || render_report(&report),
    );
    Ok(Outcome::flagged_if(report.has_errors()))
}
