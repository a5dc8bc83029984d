//! Markdown narrative for a [`ValidationReport`].

use crate::report::ValidationReport;
use larder_core::Severity;

impl ValidationReport {
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();

        out.push_str("# Validation Report\n\n");
        out.push_str(&format!("Run time: {}\n\n", self.run_time));

        heading(&mut out, "Summary");
        out.push_str("| Metric | Value |\n");
        out.push_str("|--------|-------|\n");
        out.push_str(&format!(
            "| Records processed | {} |\n",
            self.records_processed
        ));
        out.push_str(&format!("| Records flagged | {} |\n", self.records_flagged));
        out.push_str(&format!("| Total issues | {} |\n", self.total_issues));
        out.push_str(&format!(
            "| Health score | {:.2}% |\n\n",
            self.health_score * 100.0
        ));

        heading(&mut out, "Issues by Severity");
        for total in &self.severity_totals {
            out.push_str(&format!(
                "- {}: {} ({})\n",
                total.severity,
                total.count,
                percent(total.count, self.total_issues)
            ));
        }
        out.push('\n');

        for severity in Severity::ALL {
            let rules: Vec<_> = self
                .rules
                .iter()
                .filter(|r| r.severity == severity && r.count > 0)
                .collect();
            if rules.is_empty() {
                continue;
            }
            heading(&mut out, &format!("{} Issues", severity));
            for rule in rules {
                out.push_str(&format!("### `{}` ({})\n\n", rule.rule, rule.count));
                for ex in &rule.examples {
                    let record = serde_json::to_string(&ex.record).unwrap_or_default();
                    out.push_str(&format!(
                        "- `{}`: {}\n  `{}`\n",
                        ex.record_key, ex.detail, record
                    ));
                }
                if rule.count > rule.examples.len() {
                    out.push_str(&format!(
                        "- ... and {} more\n",
                        rule.count - rule.examples.len()
                    ));
                }
                out.push('\n');
            }
        }

        if self.total_issues == 0 {
            out.push_str("No issues found.\n");
        }

        out
    }
}

fn heading(out: &mut String, title: &str) {
    out.push_str(&format!("## {}\n\n", title));
}

fn percent(part: usize, whole: usize) -> String {
    if whole == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", part as f64 * 100.0 / whole as f64)
}
