use larder_core::{AcceptedTables, QuarantineSet, QuarantineStore};
use larder_report::ValidationReport;
use serde_json::Value;

use crate::csv::Table;
use crate::error::StorageError;
use crate::record::RunManifest;

/// Everything one pipeline run persists.
#[derive(Debug, Clone, Copy)]
pub struct RunArtifacts<'a> {
    pub accepted: &'a AcceptedTables,
    pub quarantine: &'a QuarantineSet,
    pub report: &'a ValidationReport,
    pub manifest: &'a RunManifest,
}

/// The storage trait for pipeline run output.
///
/// ## Snapshot Semantics
///
/// Every write replaces what the previous run left behind. A run never
/// appends to an earlier quarantine: after `write_quarantine` each of
/// the five stores holds exactly the entries of the given set, and a
/// store with no entries is written as empty rather than left stale.
///
/// Read methods return `None` for artifacts that were never written.
pub trait RunStore {
    /// Write the four accepted tables.
    fn write_accepted(&mut self, tables: &AcceptedTables) -> Result<(), StorageError>;

    /// Write all quarantine stores, including empty ones.
    fn write_quarantine(&mut self, quarantine: &QuarantineSet) -> Result<(), StorageError>;

    /// Write the report in both its narrative and structured form.
    fn write_report(&mut self, report: &ValidationReport) -> Result<(), StorageError>;

    fn write_manifest(&mut self, manifest: &RunManifest) -> Result<(), StorageError>;

    /// Accepted table as CSV text.
    fn read_table(&self, table: Table) -> Result<Option<String>, StorageError>;

    /// Quarantine entries of one store, as written.
    fn read_quarantine(&self, store: QuarantineStore) -> Result<Option<Vec<Value>>, StorageError>;

    /// Structured form of the last written report.
    fn read_report(&self) -> Result<Option<Value>, StorageError>;

    fn read_manifest(&self) -> Result<Option<RunManifest>, StorageError>;

    /// Persist a complete run: tables, quarantine, report, then manifest.
    fn write_run(&mut self, run: &RunArtifacts<'_>) -> Result<(), StorageError> {
        self.write_accepted(run.accepted)?;
        self.write_quarantine(run.quarantine)?;
        self.write_report(run.report)?;
        self.write_manifest(run.manifest)
    }
}
