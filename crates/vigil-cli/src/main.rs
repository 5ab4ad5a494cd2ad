// crates/vigil-cli/src/main.rs
//
// CLI entrypoint for Vigil.
//
// Reads schema, statistics and metrics documents from disk, runs the
// validation core, and prints the resulting report. The process exits
// non-zero when a report carries an ERROR anomaly or a model is not blessed.

mod commands;
mod config;
mod input;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use commands::bless::BlessArgs;
use commands::compare::CompareArgs;
use commands::drift::DriftArgs;
use commands::infer::InferArgs;
use commands::validate::ValidateArgs;
use commands::{Context, Outcome};
use config::{CliConfig, ConfigSource};
use output::OutputFormat;

/// Vigil: data validation and model blessing for ML pipelines.
#[derive(Parser, Debug)]
#[command(
    name = "vigil",
    version = "0.1.0",
    about = "Schema validation, skew/drift detection and model blessing"
)]
struct Cli {
    /// Path to the TOML configuration file (default: ~/.vigil/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value = "table")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Check a statistics summary against a schema.
    Validate(ValidateArgs),

    /// Detect training/serving skew or drift between two summaries.
    Compare(CompareArgs),

    /// Detect drift across a time-ordered list of summaries.
    Drift(DriftArgs),

    /// Infer a starting schema from a statistics summary.
    Infer(InferArgs),

    /// Compare candidate and baseline model metrics against blessing rules.
    Bless(BlessArgs),
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (config, source) = CliConfig::resolve(cli.config.as_deref())?;

    // Logs go to stderr so JSON output on stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match &source {
        ConfigSource::File(path) => tracing::info!("Loaded configuration from {}", path.display()),
        ConfigSource::Defaults { reason } => tracing::warn!("{}. Using default configuration.", reason),
    }

    let ctx = Context {
        config,
        format: cli.format,
    };

    let outcome = match &cli.command {
        Commands::Validate(args) => commands::validate::run(args, &ctx)?,
        Commands::Compare(args) => commands::compare::run(args, &ctx)?,
        Commands::Drift(args) => commands::drift::run(args, &ctx)?,
        Commands::Infer(args) => commands::infer::run(args, &ctx)?,
        Commands::Bless(args) => commands::bless::run(args, &ctx)?,
    };

    Ok(match outcome {
        Outcome::Clean => ExitCode::SUCCESS,
        Outcome::Flagged => ExitCode::FAILURE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_bless_with_globals_after_subcommand() {
        let cli = Cli::try_parse_from([
            "vigil",
            "bless",
            "--candidate",
            "c.json",
            "--baseline",
            "b.json",
            "--rules",
            "r.json",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Bless(ref args) if args.marker_dir.is_none()));
    }

    #[test]
    fn test_parse_drift_many_spans() {
        let cli = Cli::try_parse_from(["vigil", "drift", "--stats", "a.json", "b.json", "c.json", "--mode", "fixed"])
            .unwrap();
        match cli.command {
            Commands::Drift(args) => {
                assert_eq!(args.stats.len(), 3);
                assert_eq!(args.mode, commands::drift::ModeArg::Fixed);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
