// crates/vigil-cli/src/output.rs
//
// Output formatting utilities for the vigil CLI.
// Supports table and JSON output modes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::{Table, Tabled};
use uuid::Uuid;

use vigil_core::{AnomalyRecord, AnomalyReport};

use crate::input::InputDigest;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// Wraps a report with the identity of the run that produced it.
#[derive(Debug, Serialize)]
pub struct ReportEnvelope<'a, T: Serialize> {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub command: &'static str,
    pub inputs: Vec<InputDigest>,
    pub report: &'a T,
}

impl<'a, T: Serialize> ReportEnvelope<'a, T> {
    pub fn new(command: &'static str, inputs: Vec<InputDigest>, report: &'a T) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            generated_at: Utc::now(),
            command,
            inputs,
            report,
        }
    }
}

/// A row in the anomaly table.
#[derive(Tabled)]
pub struct AnomalyRow {
    #[tabled(rename = "Feature")]
    feature: String,
    #[tabled(rename = "Anomaly")]
    anomaly_type: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Observed")]
    observed: String,
    #[tabled(rename = "Expected")]
    expected: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&AnomalyRecord> for AnomalyRow {
    fn from(record: &AnomalyRecord) -> Self {
        Self {
            feature: record.feature_name.clone(),
            anomaly_type: record.anomaly_type.to_string(),
            severity: record.severity.to_string(),
            observed: record.measured_value.to_string(),
            expected: record.expected_constraint.clone(),
            description: record.short_description.clone(),
        }
    }
}

/// Render a report as a table, or a one-line notice when it is empty.
pub fn render_report(report: &AnomalyReport) -> String {
    if report.is_empty() {
        return "No anomalies found.".to_string();
    }
    let rows: Vec<AnomalyRow> = report.anomalies().iter().map(AnomalyRow::from).collect();
    format!("{}\n{} anomalies", format_table(&rows), report.len())
}
