//! Export-snapshot loader.
//!
//! Reads `recipes.json`, `users.json` and `interactions.json` from an
//! export directory. Each file holds either an array of documents or an
//! object keyed by document id, the shape a document-store export
//! produces. Keyed objects are flattened to their values in key order,
//! and the key is injected as `id` where the document carries none.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::record::input_fingerprint;

pub const RECIPES_FILE: &str = "recipes.json";
pub const USERS_FILE: &str = "users.json";
pub const INTERACTIONS_FILE: &str = "interactions.json";

/// The three raw collections of one export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportSnapshot {
    pub recipes: Vec<Value>,
    pub users: Vec<Value>,
    pub interactions: Vec<Value>,
}

impl ExportSnapshot {
    pub fn fingerprint(&self) -> String {
        input_fingerprint(&self.recipes, &self.users, &self.interactions)
    }
}

/// A missing file is an empty collection, but the directory itself must
/// exist.
pub fn load_export(dir: &Path) -> Result<ExportSnapshot, StorageError> {
    if !dir.is_dir() {
        return Err(StorageError::io(
            dir,
            io::Error::new(ErrorKind::NotFound, "export directory not found"),
        ));
    }
    let snapshot = ExportSnapshot {
        recipes: load_collection(&dir.join(RECIPES_FILE))?,
        users: load_collection(&dir.join(USERS_FILE))?,
        interactions: load_collection(&dir.join(INTERACTIONS_FILE))?,
    };
    debug!(
        recipes = snapshot.recipes.len(),
        users = snapshot.users.len(),
        interactions = snapshot.interactions.len(),
        dir = %dir.display(),
        "loaded export"
    );
    Ok(snapshot)
}

/// A missing file is an empty collection.
fn load_collection(path: &Path) -> Result<Vec<Value>, StorageError> {
    let text = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "export file missing, treating as empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(StorageError::io(path, e)),
    };

    let value: Value = serde_json::from_str(&text).map_err(|e| StorageError::json(path, e))?;
    match value {
        Value::Array(docs) => Ok(docs),
        Value::Object(keyed) => Ok(keyed
            .into_iter()
            .map(|(key, mut doc)| {
                if let Value::Object(fields) = &mut doc {
                    let has_id = match fields.get("id") {
                        None | Some(Value::Null) => false,
                        Some(Value::String(id)) => !id.trim().is_empty(),
                        Some(_) => true,
                    };
                    if !has_id {
                        fields.insert("id".to_string(), Value::String(key));
                    }
                }
                doc
            })
            .collect()),
        other => Err(StorageError::NotACollection {
            path: path.to_path_buf(),
            found: kind_name(&other),
        }),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, value: &Value) {
        fs::write(dir.join(name), value.to_string()).unwrap();
    }

    #[test]
    fn missing_files_are_empty_collections() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), RECIPES_FILE, &json!([{"id": "r1"}]));

        let snapshot = load_export(dir.path()).unwrap();
        assert_eq!(snapshot.recipes.len(), 1);
        assert!(snapshot.users.is_empty());
        assert!(snapshot.interactions.is_empty());
    }

    #[test]
    fn keyed_objects_flatten_and_inject_id() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            RECIPES_FILE,
            &json!({
                "r2": {"title": "Poha"},
                "r1": {"id": "kept", "title": "Upma"}
            }),
        );

        let snapshot = load_export(dir.path()).unwrap();
        // serde_json maps iterate in key order.
        assert_eq!(snapshot.recipes[0]["id"], "kept");
        assert_eq!(snapshot.recipes[1]["id"], "r2");
        assert_eq!(snapshot.recipes[1]["title"], "Poha");
    }

    #[test]
    fn keyed_objects_keep_non_string_ids() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            RECIPES_FILE,
            &json!({
                "a": {"id": 42},
                "b": {"id": null},
                "c": {"id": "  "}
            }),
        );

        let snapshot = load_export(dir.path()).unwrap();
        assert_eq!(snapshot.recipes[0]["id"], 42);
        assert_eq!(snapshot.recipes[1]["id"], "b");
        assert_eq!(snapshot.recipes[2]["id"], "c");
    }

    #[test]
    fn missing_export_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("exprot");

        let err = load_export(&missing).unwrap_err();
        match err {
            StorageError::Io { path, source } => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_document_values_pass_through_keyed_objects() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), USERS_FILE, &json!({"u1": "not a user"}));
        let snapshot = load_export(dir.path()).unwrap();
        assert_eq!(snapshot.users, vec![json!("not a user")]);
    }

    #[test]
    fn scalar_top_level_is_rejected() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), INTERACTIONS_FILE, &json!("oops"));

        let err = load_export(dir.path()).unwrap_err();
        match err {
            StorageError::NotACollection { path, found } => {
                assert!(path.ends_with(INTERACTIONS_FILE));
                assert_eq!(found, "string");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_json_names_the_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(RECIPES_FILE), "[{").unwrap();
        let err = load_export(dir.path()).unwrap_err();
        assert!(matches!(err, StorageError::Json { .. }));
        assert!(err.to_string().contains(RECIPES_FILE));
    }

    #[test]
    fn fingerprint_tracks_content() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), RECIPES_FILE, &json!([{"id": "r1"}]));
        let first = load_export(dir.path()).unwrap().fingerprint();
        assert_eq!(first, load_export(dir.path()).unwrap().fingerprint());

        write(dir.path(), RECIPES_FILE, &json!([{"id": "r2"}]));
        assert_ne!(first, load_export(dir.path()).unwrap().fingerprint());
    }
}
