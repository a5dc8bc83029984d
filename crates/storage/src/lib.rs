//! larder-storage: persistence for pipeline runs.
//!
//! The [`RunStore`] trait writes accepted tables, the quarantine
//! snapshot, the validation report and the run manifest. Two backends
//! ship here: [`DirectoryStore`] (CSV and JSON files on disk) and
//! [`MemoryStore`]. The export loader turns a document-store export
//! directory into the raw collections the pipeline consumes.

pub mod conformance;
pub mod csv;
mod directory;
mod error;
mod loader;
mod memory;
mod record;
mod traits;

pub use csv::{encode_table, Table};
pub use directory::DirectoryStore;
pub use error::StorageError;
pub use loader::{load_export, ExportSnapshot};
pub use memory::MemoryStore;
pub use record::{input_fingerprint, RunManifest};
pub use traits::{RunArtifacts, RunStore};
