// crates/vigil-cli/src/commands/bless.rs
//
// `vigil bless`: decide whether a candidate model may replace the baseline.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use vigil_blessing::{evaluate, BlessingMarker, BLESSED_PROPERTY};
use vigil_core::metrics::slice_label;
use vigil_core::{BlessingDecision, BlessingRule, MetricSide, ModelMetrics, RuleFailure};

use super::{Context, Outcome};
use crate::input::load;
use crate::output::format_table;

#[derive(Debug, Args)]
pub struct BlessArgs {
    /// Candidate model metrics.
    #[arg(long)]
    pub candidate: PathBuf,
    /// Baseline model metrics.
    #[arg(long)]
    pub baseline: PathBuf,
    /// Rule list (JSON array).
    #[arg(long)]
    pub rules: PathBuf,
    /// Directory that receives the BLESSED or NOT_BLESSED marker file.
    #[arg(long)]
    pub marker_dir: Option<PathBuf>,
}

/// JSON view of a blessing run.
#[derive(Debug, Serialize)]
struct BlessingOutput<'a> {
    decision: &'a BlessingDecision,
    marker: BlessingMarker,
    custom_properties: BTreeMap<&'static str, i64>,
}

/// A row in the rule outcome table.
#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "Rule")]
    rule: String,
    #[tabled(rename = "Candidate")]
    candidate: String,
    #[tabled(rename = "Baseline")]
    baseline: String,
    #[tabled(rename = "Result")]
    result: String,
}

/// Run the bless command.
pub fn run(args: &BlessArgs, ctx: &Context) -> Result<Outcome, Box<dyn std::error::Error>> {
    let candidate = load::<ModelMetrics>("candidate", &args.candidate)?;
    let baseline = load::<ModelMetrics>("baseline", &args.baseline)?;
    let rules = load::<Vec<BlessingRule>>("rules", &args.rules)?;

    let decision = evaluate(&candidate.value, &baseline.value, &rules.value)?;
    let marker = BlessingMarker::from_decision(&decision);

    if let Some(dir) = &args.marker_dir {
        write_marker(dir, marker)?;
    }

    let output = BlessingOutput {
        decision: &decision,
        marker,
        custom_properties: BTreeMap::from([(BLESSED_PROPERTY, marker.blessed_property())]),
    };
    ctx.emit(
        "bless",
        vec![candidate.digest, baseline.digest, rules.digest],
        &output,
        || render_decision(&decision, marker),
    );

    Ok(Outcome::flagged_if(!decision.blessed))
}

/// Write `marker` into `dir`, removing a stale marker of the other kind.
pub fn write_marker(dir: &Path, marker: BlessingMarker) -> Result<PathBuf, std::io::Error> {
    fs::create_dir_all(dir)?;
    for stale in [BlessingMarker::Blessed, BlessingMarker::NotBlessed] {
        let path = dir.join(stale.file_name());
        if stale != marker && path.exists() {
            fs::remove_file(&path)?;
        }
    }
    let path = dir.join(marker.file_name());
    fs::write(&path, b"")?;
    tracing::info!(path = %path.display(), "blessing marker written");
    Ok(path)
}

fn render_decision(decision: &BlessingDecision, marker: BlessingMarker) -> String {
    let mut text = format!(
        "Model {} vs baseline {}: {} ({}={})",
        decision.model_id,
        decision.baseline_model_id,
        marker,
        BLESSED_PROPERTY,
        marker.blessed_property()
    );

    if !decision.evaluated_rules.is_empty() {
        let rows: Vec<RuleRow> = decision
            .evaluated_rules
            .iter()
            .map(|outcome| RuleRow {
                rule: outcome.rule.to_string(),
                candidate: format_value(outcome.candidate_value),
                baseline: format_value(outcome.baseline_value),
                result: match &outcome.failure {
                    None => "pass".to_string(),
                    Some(RuleFailure::ThresholdNotMet) => "THRESHOLD_NOT_MET".to_string(),
                    Some(RuleFailure::MissingMetric { side }) => format!("MISSING_METRIC ({})", side_label(*side)),
                },
            })
            .collect();
        text.push('\n');
        text.push_str(&format_table(&rows));
    }

    for gap in &decision.slice_gaps {
        text.push_str(&format!(
            "\nslice {} only present in {}",
            slice_label(gap.slice.as_deref()),
            side_label(gap.present_in)
        ));
    }
    text
}

fn format_value(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.4}", v))
}

fn side_label(side: MetricSide) -> &'static str {
    match side {
        MetricSide::Candidate => "candidate",
        MetricSide::Baseline => "baseline",
        MetricSide::Both => "both",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::{Comparator, MetricSet};

    fn temp_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vigil_bless_{}_{}", label, uuid::Uuid::now_v7()))
    }

    #[test]
    fn test_write_marker_replaces_stale_marker() {
        let dir = temp_dir("markers");
        write_marker(&dir, BlessingMarker::Blessed).unwrap();
        assert!(dir.join("BLESSED").exists());

        write_marker(&dir, BlessingMarker::NotBlessed).unwrap();
        assert!(dir.join("NOT_BLESSED").exists());
        assert!(!dir.join("BLESSED").exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_render_decision_lists_rules_and_gaps() {
        let candidate = ModelMetrics::new(
            "cand",
            vec![
                MetricSet::aggregate().with_metric("auc", 0.79),
                MetricSet::for_slice("country=FR").with_metric("auc", 0.7),
            ],
        );
        let baseline = ModelMetrics::new("base", vec![MetricSet::aggregate().with_metric("auc", 0.80)]);
        let rules = vec![BlessingRule::new("auc", Comparator::GreaterOrEqual, 0.0)];
        let decision = evaluate(&candidate, &baseline, &rules).unwrap();
        let text = render_decision(&decision, BlessingMarker::from_decision(&decision));

        assert!(text.starts_with("Model cand vs baseline base: NOT_BLESSED (blessed=0)"));
        assert!(text.contains("THRESHOLD_NOT_MET"));
        assert!(text.contains("0.7900"));
        assert!(text.contains("slice 'country=FR' only present in candidate"));
    }
}
