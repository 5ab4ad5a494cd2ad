// crates/vigil-cli/src/commands/infer.rs
//
// `vigil infer`: derive a starting schema from a statistics summary.
//
// The schema is always written as bare JSON so it can be fed straight back
// into `vigil validate`.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use vigil_anomaly::infer_schema;
use vigil_core::DatasetStatistics;

use super::{Context, Outcome};
use crate::input::load;

#[derive(Debug, Args)]
pub struct InferArgs {
    /// Statistics summary to infer from.
    #[arg(long)]
    pub stats: PathBuf,
    /// Overrides `inference.max_domain_size` from the config file.
    #[arg(long)]
    pub max_domain_size: Option<usize>,
    /// Write the schema here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Run the infer command.
pub fn run(args: &InferArgs, ctx: &Context) -> Result<Outcome, Box<dyn std::error::Error>> {
    let stats = load::<DatasetStatistics>("statistics", &args.stats)?;

    let mut options = ctx.config.inference.clone();
    if let Some(size) = args.max_domain_size {
        options.max_domain_size = size;
    }
    let schema = infer_schema(&stats.value, &options)?;
    let json = serde_json::to_string_pretty(&schema)?;

    let Some(path) = &args.output else {
        println!("{}", json);
        return Ok(Outcome::Clean);
    };

    fs::write(path, &json)?;
    tracing::info!(path = %path.display(), features = schema.len(), "schema written");
    ctx.emit("infer", vec![stats.digest], &schema, || {
        format!("Wrote schema with {} features to {}", schema.len(), path.display())
    });

    Ok(Outcome::Clean)
}
