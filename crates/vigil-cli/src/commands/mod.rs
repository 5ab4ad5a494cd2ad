// crates/vigil-cli/src/commands/mod.rs
//
// Command module declarations and the state shared by every command.

pub mod bless;
pub mod compare;
pub mod drift;
pub mod infer;
pub mod validate;

use serde::Serialize;

use crate::config::CliConfig;
use crate::input::InputDigest;
use crate::output::{format_json, OutputFormat, ReportEnvelope};

/// Resolved configuration and output mode for one invocation.
pub struct Context {
    pub config: CliConfig,
    pub format: OutputFormat,
}

impl Context {
    /// Print `report` in the selected format. `table` renders the table view.
    pub fn emit<T: Serialize>(
        &self,
        command: &'static str,
        inputs: Vec<InputDigest>,
        report: &T,
        table: impl FnOnce() -> String,
    ) {
        match self.format {
            OutputFormat::Json => println!("{}", format_json(&ReportEnvelope::new(command, inputs, report))),
            OutputFormat::Table => println!("{}", table()),
        }
    }
}

/// Whether a command's findings should fail the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Clean,
    /// An ERROR anomaly was reported or the model was not blessed.
    Flagged,
}

impl Outcome {
    pub fn flagged_if(condition: bool) -> Self {
        if condition {
            Outcome::Flagged
        } else {
            Outcome::Clean
        }
    }
}
