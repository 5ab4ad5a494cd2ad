// crates/vigil-blessing/src/engine.rs
//
// Rule evaluation for model blessing.
//
// Every rule is evaluated in the order supplied, with no short-circuiting, so
// a rejected model carries the outcome of every rule it was judged by.

use vigil_core::{
    BlessingDecision, BlessingRule, Comparator, MetricSide, ModelMetrics, ModelValidator,
    RuleFailure, RuleOutcome, SliceGap, VigilError,
};

/// Stateless engine; exists so callers can hold a `dyn ModelValidator`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlessingEngine;

impl ModelValidator for BlessingEngine {
    fn bless(
        &self,
        candidate: &ModelMetrics,
        baseline: &ModelMetrics,
        rules: &[BlessingRule],
    ) -> Result<BlessingDecision, VigilError> {
        evaluate(candidate, baseline, rules)
    }
}

/// Decide whether `candidate` may replace `baseline`.
///
/// Only metrics named by `rules` are looked up. A metric absent on either
/// side fails its rule with `MISSING_METRIC`. An empty rule set blesses.
pub fn evaluate(
    candidate: &ModelMetrics,
    baseline: &ModelMetrics,
    rules: &[BlessingRule],
) -> Result<BlessingDecision, VigilError> {
    candidate.validate()?;
    baseline.validate()?;
    for rule in rules {
        validate_rule(rule)?;
    }

    if rules.is_empty() {
        tracing::warn!(model = %candidate.model_id, "no blessing rules supplied, blessing by default");
    }

    let evaluated_rules: Vec<RuleOutcome> = rules
        .iter()
        .map(|rule| evaluate_rule(rule, candidate, baseline))
        .collect();
    let blessed = evaluated_rules.iter().all(|o| o.passed);
    let slice_gaps = slice_gaps(candidate, baseline);

    tracing::info!(
        model = %candidate.model_id,
        baseline = %baseline.model_id,
        rules = evaluated_rules.len(),
        failed = evaluated_rules.iter().filter(|o| !o.passed).count(),
        slice_gaps = slice_gaps.len(),
        blessed,
        "blessing evaluated"
    );

    Ok(BlessingDecision {
        model_id: candidate.model_id.clone(),
        baseline_model_id: baseline.model_id.clone(),
        blessed,
        evaluated_rules,
        slice_gaps,
    })
}

fn validate_rule(rule: &BlessingRule) -> Result<(), VigilError> {
    if rule.metric.is_empty() {
        return Err(VigilError::InvalidRule("rule metric name must not be empty".to_string()));
    }
    if !rule.margin.is_finite() || rule.margin < 0.0 {
        return Err(VigilError::InvalidRule(format!(
            "rule '{}': margin must be a non-negative finite number, got {}",
            rule, rule.margin
        )));
    }
    Ok(())
}

fn evaluate_rule(rule: &BlessingRule, candidate: &ModelMetrics, baseline: &ModelMetrics) -> RuleOutcome {
    let slice = rule.slice.as_deref();
    let candidate_value = candidate.value(&rule.metric, slice);
    let baseline_value = baseline.value(&rule.metric, slice);

    let (passed, failure) = match (candidate_value, baseline_value) {
        (Some(c), Some(b)) => {
            if compare(rule.comparator, c, b, rule.margin) {
                (true, None)
            } else {
                (false, Some(RuleFailure::ThresholdNotMet))
            }
        }
        (None, Some(_)) => missing(MetricSide::Candidate),
        (Some(_), None) => missing(MetricSide::Baseline),
        (None, None) => missing(MetricSide::Both),
    };

    tracing::debug!(%rule, passed, ?candidate_value, ?baseline_value, "rule evaluated");

    RuleOutcome {
        rule: rule.clone(),
        passed,
        candidate_value,
        baseline_value,
        failure,
    }
}

fn missing(side: MetricSide) -> (bool, Option<RuleFailure>) {
    (false, Some(RuleFailure::MissingMetric { side }))
}

/// Relative slack so a value landing exactly on the margin is not failed by
/// binary rounding (e.g. `0.81 - 0.80 > 0.01`).
const COMPARE_EPS: f64 = 1e-9;

fn compare(comparator: Comparator, candidate: f64, baseline: f64, margin: f64) -> bool {
    let slack = COMPARE_EPS * candidate.abs().max(baseline.abs()).max(1.0);
    match comparator {
        Comparator::GreaterOrEqual => candidate >= baseline - margin - slack,
        Comparator::LessOrEqual => candidate <= baseline + margin + slack,
        Comparator::WithinMargin => (candidate - baseline).abs() <= margin + slack,
    }
}

/// Slices carried by only one side, candidate-only first.
fn slice_gaps(candidate: &ModelMetrics, baseline: &ModelMetrics) -> Vec<SliceGap> {
    let mut gaps = slices_only_in(candidate, baseline, MetricSide::Candidate);
    gaps.extend(slices_only_in(baseline, candidate, MetricSide::Baseline));
    gaps
}

fn slices_only_in(side: &ModelMetrics, other: &ModelMetrics, present_in: MetricSide) -> Vec<SliceGap> {
    side.slice_ids()
        .filter(|s| other.slice(*s).is_none())
        .map(|s| SliceGap {
            slice: s.map(str::to_string),
            present_in,
        })
        .collect()
}
