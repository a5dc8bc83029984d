use std::fs;
use std::path::{Path, PathBuf};

use larder_core::{AcceptedTables, QuarantineSet, QuarantineStore};
use larder_report::ValidationReport;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::csv::{encode_table, Table};
use crate::error::StorageError;
use crate::record::RunManifest;
use crate::traits::RunStore;

pub const ETL_DIR: &str = "etl";
pub const BAD_DATA_DIR: &str = "bad_data";
pub const VALIDATION_DIR: &str = "validation";
pub const MANIFEST_FILE: &str = "_etl_manifest.json";
pub const REPORT_MARKDOWN_FILE: &str = "validation_report.md";
pub const REPORT_JSON_FILE: &str = "validation_results.json";

/// Directory-backed store.
///
/// Layout under `root`:
///
/// ```text
/// etl/         recipe.csv ingredients.csv steps.csv interactions.csv _etl_manifest.json
/// bad_data/    bad_recipes.json bad_ingredients.json bad_steps.json
///              bad_interactions.json duplicate_recipes.json
/// validation/  validation_report.md validation_results.json
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn table_path(&self, table: Table) -> PathBuf {
        self.root.join(ETL_DIR).join(table.file_name())
    }

    pub fn quarantine_path(&self, store: QuarantineStore) -> PathBuf {
        self.root
            .join(BAD_DATA_DIR)
            .join(format!("{}.json", store.file_stem()))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(ETL_DIR).join(MANIFEST_FILE)
    }

    pub fn report_paths(&self) -> (PathBuf, PathBuf) {
        let dir = self.root.join(VALIDATION_DIR);
        (dir.join(REPORT_MARKDOWN_FILE), dir.join(REPORT_JSON_FILE))
    }
}

impl RunStore for DirectoryStore {
    fn write_accepted(&mut self, tables: &AcceptedTables) -> Result<(), StorageError> {
        for table in Table::ALL {
            write_file(&self.table_path(table), &encode_table(table, tables))?;
        }
        debug!(
            recipes = tables.recipes.len(),
            ingredients = tables.ingredients.len(),
            steps = tables.steps.len(),
            interactions = tables.interactions.len(),
            "wrote accepted tables"
        );
        Ok(())
    }

    fn write_quarantine(&mut self, quarantine: &QuarantineSet) -> Result<(), StorageError> {
        for store in QuarantineStore::ALL {
            let entries: Vec<_> = quarantine.in_store(store).collect();
            write_json(&self.quarantine_path(store), &entries)?;
        }
        info!(
            entries = quarantine.len(),
            dir = %self.root.join(BAD_DATA_DIR).display(),
            "wrote quarantine snapshot"
        );
        Ok(())
    }

    fn write_report(&mut self, report: &ValidationReport) -> Result<(), StorageError> {
        let (markdown, json) = self.report_paths();
        write_file(&markdown, &report.to_markdown())?;
        write_json(&json, report)
    }

    fn write_manifest(&mut self, manifest: &RunManifest) -> Result<(), StorageError> {
        write_json(&self.manifest_path(), manifest)
    }

    fn read_table(&self, table: Table) -> Result<Option<String>, StorageError> {
        read_file(&self.table_path(table))
    }

    fn read_quarantine(&self, store: QuarantineStore) -> Result<Option<Vec<Value>>, StorageError> {
        read_json(&self.quarantine_path(store))
    }

    fn read_report(&self) -> Result<Option<Value>, StorageError> {
        read_json(&self.report_paths().1)
    }

    fn read_manifest(&self) -> Result<Option<RunManifest>, StorageError> {
        read_json(&self.manifest_path())
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| StorageError::io(path, e))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    let mut pretty = serde_json::to_string_pretty(value).map_err(|e| StorageError::json(path, e))?;
    pretty.push('\n');
    write_file(path, &pretty)
}

fn read_file(path: &Path) -> Result<Option<String>, StorageError> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StorageError::io(path, e)),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    match read_file(path)? {
        Some(s) => serde_json::from_str(&s)
            .map(Some)
            .map_err(|e| StorageError::json(path, e)),
        None => Ok(None),
    }
}
