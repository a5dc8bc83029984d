//! larder-documents: typed intermediate representation for raw documents.
//!
//! Provides typed structs for the three document collections (recipes,
//! users, interactions) handed over by the extraction step, and a single
//! `from_documents()` entry point that decodes `serde_json::Value`
//! mappings into a `DocumentBatch`.
//!
//! Every field is optional at this layer. Absent or wrongly typed fields
//! are represented explicitly (`None`, `Numeric::Absent`,
//! `Numeric::Malformed`) so that later stages can classify them instead
//! of tripping over them. The only decoding failure is a collection
//! element that is not a mapping at all.

pub mod decode;
pub mod types;

pub use decode::{from_documents, Collection, DocumentError};
pub use types::*;
