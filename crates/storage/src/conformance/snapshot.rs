//! Snapshot conformance tests.
//!
//! Verifies that a run writes every quarantine store, that a second run
//! replaces the first rather than accumulating, and that nothing is
//! readable before the first write.

use larder_core::QuarantineStore;

use super::{clean_outcome, messy_outcome, write_outcome, TestResult};
use crate::csv::Table;
use crate::traits::RunStore;

pub(super) fn run_snapshot_tests<S, F>(factory: &F) -> Vec<TestResult>
where
    S: RunStore,
    F: Fn() -> S,
{
    vec![
        TestResult::from_result(
            "snapshot",
            "fresh_store_reads_nothing",
            fresh_store_reads_nothing(factory),
        ),
        TestResult::from_result(
            "snapshot",
            "every_store_written_even_when_empty",
            every_store_written_even_when_empty(factory),
        ),
        TestResult::from_result(
            "snapshot",
            "entries_land_in_their_store",
            entries_land_in_their_store(factory),
        ),
        TestResult::from_result(
            "snapshot",
            "second_run_replaces_first",
            second_run_replaces_first(factory),
        ),
    ]
}

fn fresh_store_reads_nothing<S, F>(factory: &F) -> Result<(), String>
where
    S: RunStore,
    F: Fn() -> S,
{
    let s = factory();
    for store in QuarantineStore::ALL {
        if s.read_quarantine(store).map_err(|e| e.to_string())?.is_some() {
            return Err(format!("store {} readable before any write", store));
        }
    }
    if s.read_table(Table::Recipes).map_err(|e| e.to_string())?.is_some() {
        return Err("recipe table readable before any write".to_string());
    }
    if s.read_manifest().map_err(|e| e.to_string())?.is_some() {
        return Err("manifest readable before any write".to_string());
    }
    Ok(())
}

fn every_store_written_even_when_empty<S, F>(factory: &F) -> Result<(), String>
where
    S: RunStore,
    F: Fn() -> S,
{
    let mut s = factory();
    let outcome = clean_outcome()?;
    write_outcome(&mut s, &outcome)?;

    for store in QuarantineStore::ALL {
        match s.read_quarantine(store).map_err(|e| e.to_string())? {
            Some(entries) if entries.is_empty() => {}
            Some(entries) => {
                return Err(format!("store {} has {} entries", store, entries.len()))
            }
            None => return Err(format!("store {} was not written", store)),
        }
    }
    Ok(())
}

fn entries_land_in_their_store<S, F>(factory: &F) -> Result<(), String>
where
    S: RunStore,
    F: Fn() -> S,
{
    let mut s = factory();
    let outcome = messy_outcome()?;
    write_outcome(&mut s, &outcome)?;

    for store in QuarantineStore::ALL {
        let written = s
            .read_quarantine(store)
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("store {} was not written", store))?;
        let expected = outcome.quarantine.in_store(store).count();
        if written.len() != expected {
            return Err(format!(
                "store {}: expected {} entries, got {}",
                store,
                expected,
                written.len()
            ));
        }
        for entry in &written {
            if entry["store"] != store.as_str() {
                return Err(format!("entry in {} tagged {}", store, entry["store"]));
            }
            if !entry["violated_rule"].is_string() || !entry["record"].is_object() {
                return Err(format!("entry in {} lacks rule or record", store));
            }
        }
    }
    Ok(())
}

fn second_run_replaces_first<S, F>(factory: &F) -> Result<(), String>
where
    S: RunStore,
    F: Fn() -> S,
{
    let mut s = factory();
    write_outcome(&mut s, &messy_outcome()?)?;
    write_outcome(&mut s, &clean_outcome()?)?;

    for store in QuarantineStore::ALL {
        let entries = s
            .read_quarantine(store)
            .map_err(|e| e.to_string())?
            .unwrap_or_default();
        if !entries.is_empty() {
            return Err(format!(
                "store {} kept {} entries from the previous run",
                store,
                entries.len()
            ));
        }
    }
    Ok(())
}
