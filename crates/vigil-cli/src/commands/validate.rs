// crates/vigil-cli/src/commands/validate.rs
//
// `vigil validate`: check a statistics summary against a schema.

use std::path::PathBuf;

use clap::Args;
use vigil_anomaly::{detect, detect_parallel};
use vigil_core::{DatasetStatistics, Schema};

use super::{Context, Outcome};
use crate::input::load;
use crate::output::render_report;

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Schema document (JSON, or YAML by extension).
    #[arg(long)]
    pub schema: PathBuf,
    /// Statistics summary (JSON, or YAML by extension).
    #[arg(long)]
    pub stats: PathBuf,
    /// Run the per-feature checks on the rayon thread pool.
    #[arg(long)]
    pub parallel: bool,
}

/// Run the validate command.
pub fn run(args: &ValidateArgs, ctx: &Context) -> Result<Outcome, Box<dyn std::error::Error>> {
    let schema = load::<Schema>("schema", &args.schema)?;
    let stats = load::<DatasetStatistics>("statistics", &args.stats)?;

    let config = &ctx.config.validation;
    let report = if args.parallel {
        detect_parallel(&schema.value, &stats.value, config)?
    } else {
        detect(&schema.value, &stats.value, config)?
    };

    ctx.emit("validate", vec![schema.digest, stats.digest], &report, || render_report(&report));
    Ok(Outcome::flagged_if(report.has_errors()))
}
