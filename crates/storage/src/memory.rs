use std::collections::BTreeMap;

use larder_core::{AcceptedTables, QuarantineSet, QuarantineStore};
use larder_report::ValidationReport;
use serde_json::Value;

use crate::csv::{encode_table, Table};
use crate::error::StorageError;
use crate::record::RunManifest;
use crate::traits::RunStore;

/// In-memory backend, used by the conformance suite and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: BTreeMap<Table, String>,
    quarantine: BTreeMap<QuarantineStore, Vec<Value>>,
    report_markdown: Option<String>,
    report_json: Option<Value>,
    manifest: Option<RunManifest>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report_markdown(&self) -> Option<&str> {
        self.report_markdown.as_deref()
    }
}

impl RunStore for MemoryStore {
    fn write_accepted(&mut self, tables: &AcceptedTables) -> Result<(), StorageError> {
        self.tables = Table::ALL
            .iter()
            .map(|&t| (t, encode_table(t, tables)))
            .collect();
        Ok(())
    }

    fn write_quarantine(&mut self, quarantine: &QuarantineSet) -> Result<(), StorageError> {
        let mut stores = BTreeMap::new();
        for store in QuarantineStore::ALL {
            let entries = quarantine
                .in_store(store)
                .map(serde_json::to_value)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| StorageError::json(store.file_stem(), e))?;
            stores.insert(store, entries);
        }
        self.quarantine = stores;
        Ok(())
    }

    fn write_report(&mut self, report: &ValidationReport) -> Result<(), StorageError> {
        let json =
            serde_json::to_value(report).map_err(|e| StorageError::json("report", e))?;
        self.report_markdown = Some(report.to_markdown());
        self.report_json = Some(json);
        Ok(())
    }

    fn write_manifest(&mut self, manifest: &RunManifest) -> Result<(), StorageError> {
        self.manifest = Some(manifest.clone());
        Ok(())
    }

    fn read_table(&self, table: Table) -> Result<Option<String>, StorageError> {
        Ok(self.tables.get(&table).cloned())
    }

    fn read_quarantine(&self, store: QuarantineStore) -> Result<Option<Vec<Value>>, StorageError> {
        Ok(self.quarantine.get(&store).cloned())
    }

    fn read_report(&self) -> Result<Option<Value>, StorageError> {
        Ok(self.report_json.clone())
    }

    fn read_manifest(&self) -> Result<Option<RunManifest>, StorageError> {
        Ok(self.manifest.clone())
    }
}
