//! Report and manifest round-trip conformance tests.

use super::{manifest_for, messy_outcome, report_for, write_outcome, TestResult};
use crate::traits::RunStore;

pub(super) fn run_roundtrip_tests<S, F>(factory: &F) -> Vec<TestResult>
where
    S: RunStore,
    F: Fn() -> S,
{
    vec![
        TestResult::from_result(
            "roundtrip",
            "report_counts_survive",
            report_counts_survive(factory),
        ),
        TestResult::from_result(
            "roundtrip",
            "manifest_reads_back_equal",
            manifest_reads_back_equal(factory),
        ),
    ]
}

fn report_counts_survive<S, F>(factory: &F) -> Result<(), String>
where
    S: RunStore,
    F: Fn() -> S,
{
    let mut s = factory();
    let outcome = messy_outcome()?;
    write_outcome(&mut s, &outcome)?;

    let expected = serde_json::to_value(report_for(&outcome)).map_err(|e| e.to_string())?;
    let written = s
        .read_report()
        .map_err(|e| e.to_string())?
        .ok_or("report was not written")?;
    for key in ["records_processed", "records_flagged", "total_issues", "severity_totals"] {
        if written[key] != expected[key] {
            return Err(format!(
                "report {}: expected {}, got {}",
                key, expected[key], written[key]
            ));
        }
    }
    Ok(())
}

fn manifest_reads_back_equal<S, F>(factory: &F) -> Result<(), String>
where
    S: RunStore,
    F: Fn() -> S,
{
    let mut s = factory();
    let outcome = messy_outcome()?;
    write_outcome(&mut s, &outcome)?;

    let written = s
        .read_manifest()
        .map_err(|e| e.to_string())?
        .ok_or("manifest was not written")?;
    let expected = manifest_for(&outcome);
    if written != expected {
        return Err(format!("expected {:?}, got {:?}", expected, written));
    }
    Ok(())
}
