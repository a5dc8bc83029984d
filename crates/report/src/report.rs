//! ValidationReport -- aggregated view of the quarantine of one run.
//!
//! Every catalogue rule is listed, including rules that never fired, so
//! two reports over different snapshots always line up row for row.

use larder_core::{PipelineOutcome, QuarantineEntry, RuleId, Severity};
use serde::Serialize;

/// Example payloads kept per rule unless configured otherwise.
pub const DEFAULT_EXAMPLE_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub example_limit: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            example_limit: DEFAULT_EXAMPLE_LIMIT,
        }
    }
}

/// One offending record shown for human inspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleExample {
    pub record_key: String,
    pub detail: String,
    pub record: serde_json::Value,
}

/// Issue count and examples for a single rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSummary {
    pub rule: RuleId,
    pub severity: Severity,
    pub count: usize,
    pub examples: Vec<RuleExample>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeverityTotal {
    pub severity: Severity,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub run_time: String,
    pub records_processed: usize,
    /// Distinct records with at least one violation.
    pub records_flagged: usize,
    pub total_issues: usize,
    /// Fraction of processed records with zero violations.
    pub health_score: f64,
    /// Critical, High, Medium, Low.
    pub severity_totals: Vec<SeverityTotal>,
    /// Ordered by severity, then catalogue order.
    pub rules: Vec<RuleSummary>,
}

impl ValidationReport {
    pub fn severity_total(&self, severity: Severity) -> usize {
        self.severity_totals
            .iter()
            .find(|t| t.severity == severity)
            .map_or(0, |t| t.count)
    }

    /// Issues whose severity is `threshold` or more serious.
    pub fn issues_at_or_above(&self, threshold: Severity) -> usize {
        self.severity_totals
            .iter()
            .filter(|t| t.severity <= threshold)
            .map(|t| t.count)
            .sum()
    }

    pub fn rule(&self, rule: RuleId) -> Option<&RuleSummary> {
        self.rules.iter().find(|r| r.rule == rule)
    }
}

/// Build the report for `outcome`. `run_time` is supplied by the caller
/// so that the report stays a pure function of the run.
pub fn build_report(
    outcome: &PipelineOutcome,
    run_time: &str,
    options: &ReportOptions,
) -> ValidationReport {
    let quarantine = &outcome.quarantine;
    let processed = outcome.stats.records_processed;
    let flagged = quarantine.flagged_records().len();

    let mut rules: Vec<RuleSummary> = RuleId::CATALOGUE
        .iter()
        .map(|&rule| RuleSummary {
            rule,
            severity: rule.severity(),
            count: quarantine.count(rule),
            examples: quarantine
                .for_rule(rule)
                .take(options.example_limit)
                .map(example)
                .collect(),
        })
        .collect();
    // Stable sort keeps catalogue order within a severity.
    rules.sort_by_key(|r| r.severity);

    let severity_totals = Severity::ALL
        .iter()
        .map(|&severity| SeverityTotal {
            severity,
            count: rules
                .iter()
                .filter(|r| r.severity == severity)
                .map(|r| r.count)
                .sum(),
        })
        .collect();

    ValidationReport {
        run_time: run_time.to_string(),
        records_processed: processed,
        records_flagged: flagged,
        total_issues: quarantine.len(),
        health_score: health_score(processed, flagged),
        severity_totals,
        rules,
    }
}

fn example(entry: &QuarantineEntry) -> RuleExample {
    RuleExample {
        record_key: entry.record_key.clone(),
        detail: entry.detail.clone(),
        record: entry.record.clone(),
    }
}

fn health_score(processed: usize, flagged: usize) -> f64 {
    if processed == 0 {
        return 1.0;
    }
    processed.saturating_sub(flagged) as f64 / processed as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_core::run_documents;
    use serde_json::{json, Value};

    fn recipe(id: &str) -> Value {
        json!({
            "id": id,
            "title": "Aloo Paratha",
            "cuisine": "Indian",
            "difficulty": "Hard",
            "prep_time_min": 20,
            "cook_time_min": 30,
            "total_time_min": 50,
            "ingredients": [{"name": "Potato", "quantity": "3", "unit": "pcs"}],
            "steps": [{"step_number": 1, "text": "Boil potatoes."}]
        })
    }

    fn orphan(id: &str) -> Value {
        json!({"id": id, "user_id": "u1", "recipe_id": "ghost-42", "type": "view"})
    }

    #[test]
    fn test_empty_run_is_perfectly_healthy() {
        let outcome = run_documents(&[], &[], &[]).unwrap();
        let report = build_report(&outcome, "2024-01-01T00:00:00Z", &ReportOptions::default());
        assert_eq!(report.records_processed, 0);
        assert_eq!(report.total_issues, 0);
        assert_eq!(report.health_score, 1.0);
        assert_eq!(report.rules.len(), RuleId::CATALOGUE.len());
        assert!(report.rules.iter().all(|r| r.count == 0 && r.examples.is_empty()));
    }

    #[test]
    fn test_rules_ordered_by_severity_then_catalogue() {
        let outcome = run_documents(&[], &[], &[]).unwrap();
        let report = build_report(&outcome, "t", &ReportOptions::default());
        let order: Vec<RuleId> = report.rules.iter().map(|r| r.rule).collect();
        assert_eq!(
            order,
            vec![
                RuleId::OrphanInteractions,
                RuleId::NegativeTimeValues,
                RuleId::InvalidTimeFormat,
                RuleId::InvalidSteps,
                RuleId::InvalidInteractions,
                RuleId::MissingRecipeColumns,
                RuleId::InvalidDifficultyValues,
                RuleId::InvalidIngredients,
                RuleId::DuplicateRecipeIds,
                RuleId::DuplicateInteractionIds,
            ]
        );
        let totals: Vec<Severity> = report.severity_totals.iter().map(|t| t.severity).collect();
        assert_eq!(totals, Severity::ALL.to_vec());
    }

    #[test]
    fn test_examples_are_capped() {
        let interactions: Vec<Value> = (0..5).map(|i| orphan(&format!("i{}", i))).collect();
        let outcome = run_documents(&[recipe("r1")], &[], &interactions).unwrap();
        let report = build_report(&outcome, "t", &ReportOptions::default());

        let orphans = report.rule(RuleId::OrphanInteractions).unwrap();
        assert_eq!(orphans.count, 5);
        assert_eq!(orphans.examples.len(), DEFAULT_EXAMPLE_LIMIT);
        assert_eq!(orphans.examples[0].record["recipe_id"], "ghost-42");
        assert_eq!(report.severity_total(Severity::Critical), 5);

        let one = build_report(&outcome, "t", &ReportOptions { example_limit: 1 });
        assert_eq!(one.rule(RuleId::OrphanInteractions).unwrap().examples.len(), 1);
    }

    #[test]
    fn test_health_score_counts_distinct_records() {
        let mut bad = recipe("r2");
        bad["cook_time_min"] = json!(-5);
        bad["difficulty"] = json!("Extreme");
        let outcome = run_documents(&[recipe("r1"), bad], &[], &[]).unwrap();
        let report = build_report(&outcome, "t", &ReportOptions::default());

        // 2 recipes + 2 ingredients + 2 steps
        assert_eq!(report.records_processed, 6);
        assert_eq!(report.total_issues, 2);
        assert_eq!(report.records_flagged, 1);
        assert!((report.health_score - 5.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_issues_at_or_above_threshold() {
        let mut bad = recipe("r2");
        bad["difficulty"] = json!("Extreme");
        bad["prep_time_min"] = json!(-1);
        let outcome = run_documents(&[recipe("r1"), bad], &[], &[orphan("i1")]).unwrap();
        let report = build_report(&outcome, "t", &ReportOptions::default());

        assert_eq!(report.issues_at_or_above(Severity::Critical), 1);
        assert_eq!(report.issues_at_or_above(Severity::High), 2);
        assert_eq!(report.issues_at_or_above(Severity::Medium), 2);
        assert_eq!(report.issues_at_or_above(Severity::Low), 3);
    }

    #[test]
    fn test_json_form_matches_struct() {
        let outcome = run_documents(&[recipe("r1")], &[], &[orphan("i1")]).unwrap();
        let report = build_report(&outcome, "2024-01-01T00:00:00Z", &ReportOptions::default());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["run_time"], "2024-01-01T00:00:00Z");
        assert_eq!(json["total_issues"], 1);
        assert_eq!(json["rules"][0]["rule"], "orphan_interactions");
        assert_eq!(json["rules"][0]["severity"], "Critical");
        assert_eq!(json["severity_totals"][0]["count"], 1);
    }
}
