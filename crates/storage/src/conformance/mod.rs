//! Conformance test suite for `RunStore` implementations.
//!
//! A backend-agnostic suite that any `RunStore` implementation can run
//! to verify correctness. It covers:
//!
//! - **Snapshot**: every store written every run, fresh snapshot per run
//! - **Tables**: fixed headers, one line per accepted row
//! - **Round trip**: report and manifest read back as written
//!
//! # Usage
//!
//! ```ignore
//! use larder_storage::conformance::run_conformance_suite;
//!
//! #[test]
//! fn my_store_conformance() {
//!     let report = run_conformance_suite(MyStore::new);
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod roundtrip;
mod snapshot;
mod tables;

use std::fmt;

use larder_core::{run_documents, PipelineOutcome};
use larder_report::{build_report, ReportOptions, ValidationReport};
use serde_json::json;

use crate::record::RunManifest;
use crate::traits::{RunArtifacts, RunStore};

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "snapshot", "tables").
    pub category: String,
    pub name: String,
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        let (passed, message) = match result {
            Ok(()) => (true, None),
            Err(msg) => (false, Some(msg)),
        };
        TestResult {
            category: category.to_string(),
            name: name.to_string(),
            passed,
            message,
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full conformance suite against a storage backend.
///
/// The `factory` function is called once per test to create a fresh, empty
/// store, ensuring test isolation.
pub fn run_conformance_suite<S, F>(factory: F) -> ConformanceReport
where
    S: RunStore,
    F: Fn() -> S,
{
    let mut results = Vec::new();

    results.extend(snapshot::run_snapshot_tests(&factory));
    results.extend(tables::run_table_tests(&factory));
    results.extend(roundtrip::run_roundtrip_tests(&factory));

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers: fixture runs ────────────────────────────────────────────────────

/// One clean recipe, one duplicate, one negative-time recipe and one
/// orphaned interaction.
fn messy_outcome() -> Result<PipelineOutcome, String> {
    let recipe = |id: &str, cook: i64| {
        json!({
            "id": id,
            "title": "Masala Chai",
            "cuisine": "Indian",
            "difficulty": "Easy",
            "prep_time_min": 2,
            "cook_time_min": cook,
            "total_time_min": 10,
            "ingredients": [{"name": "Tea", "quantity": "2", "unit": "tsp"}],
            "steps": [{"step_number": 1, "text": "Boil, with ginger."}]
        })
    };
    run_documents(
        &[recipe("r1", 8), recipe("r1", 8), recipe("r2", -5)],
        &[],
        &[
            json!({"id": "i1", "user_id": "u1", "recipe_id": "r1", "type": "like"}),
            json!({"id": "i2", "user_id": "u1", "recipe_id": "ghost-42", "type": "view"}),
        ],
    )
    .map_err(|e| e.to_string())
}

fn clean_outcome() -> Result<PipelineOutcome, String> {
    run_documents(&[], &[], &[]).map_err(|e| e.to_string())
}

fn report_for(outcome: &PipelineOutcome) -> ValidationReport {
    build_report(outcome, "2025-01-01T00:00:00Z", &ReportOptions::default())
}

fn manifest_for(outcome: &PipelineOutcome) -> RunManifest {
    RunManifest::new(outcome, "2025-01-01T00:00:00Z", "ab".repeat(32), 12)
}

fn write_outcome<S: RunStore>(store: &mut S, outcome: &PipelineOutcome) -> Result<(), String> {
    let report = report_for(outcome);
    let manifest = manifest_for(outcome);
    store
        .write_run(&RunArtifacts {
            accepted: &outcome.accepted,
            quarantine: &outcome.quarantine,
            report: &report,
            manifest: &manifest,
        })
        .map_err(|e| e.to_string())
}
