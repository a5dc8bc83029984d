//! Decoding raw document collections into typed structs.
//!
//! The main entry point is [`from_documents`], which takes the three
//! collections as `&[serde_json::Value]` and produces a [`DocumentBatch`].

use crate::types::*;
use serde_json::{Map, Value};
use std::fmt;

/// The source collection a document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Recipes,
    Users,
    Interactions,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Collection::Recipes => "recipes",
            Collection::Users => "users",
            Collection::Interactions => "interactions",
        };
        f.write_str(name)
    }
}

/// Errors during document decoding. Any of these aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    /// A collection element is not a mapping, so no schema can be applied.
    #[error("{collection}[{index}] is not a document: found {found}")]
    NotADocument {
        collection: Collection,
        index: usize,
        found: &'static str,
    },
}

/// Decode the three raw collections of one extraction snapshot.
///
/// Element order is preserved; later stages depend on it for
/// first-occurrence deduplication.
pub fn from_documents(
    recipes: &[Value],
    users: &[Value],
    interactions: &[Value],
) -> Result<DocumentBatch, DocumentError> {
    let recipes = recipes
        .iter()
        .enumerate()
        .map(|(i, v)| as_document(v, Collection::Recipes, i).map(parse_recipe))
        .collect::<Result<Vec<_>, _>>()?;

    let users = users
        .iter()
        .enumerate()
        .map(|(i, v)| as_document(v, Collection::Users, i).map(parse_user))
        .collect::<Result<Vec<_>, _>>()?;

    let interactions = interactions
        .iter()
        .enumerate()
        .map(|(i, v)| as_document(v, Collection::Interactions, i).map(parse_interaction))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DocumentBatch {
        recipes,
        users,
        interactions,
    })
}

// ── Parsing helpers ─────────────────────────────────────────────────

fn as_document(
    value: &Value,
    collection: Collection,
    index: usize,
) -> Result<&Map<String, Value>, DocumentError> {
    value.as_object().ok_or(DocumentError::NotADocument {
        collection,
        index,
        found: kind_name(value),
    })
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

/// Scalar-to-text conversion. Nested values keep their compact JSON form.
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn text(obj: &Map<String, Value>, field: &str) -> Option<String> {
    obj.get(field).and_then(as_text)
}

fn first_text(obj: &Map<String, Value>, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .filter_map(|f| text(obj, f))
        .find(|s| !s.trim().is_empty())
}

fn numeric(value: Option<&Value>) -> Numeric {
    match value {
        None | Some(Value::Null) => Numeric::Absent,
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v.is_finite() => Numeric::Value(v),
            _ => Numeric::Malformed(n.to_string()),
        },
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Numeric::Absent;
            }
            match trimmed.parse::<f64>() {
                Ok(v) if v.is_finite() => Numeric::Value(v),
                _ => Numeric::Malformed(s.clone()),
            }
        }
        Some(other) => Numeric::Malformed(other.to_string()),
    }
}

fn text_list(obj: &Map<String, Value>, field: &str) -> Option<Vec<String>> {
    obj.get(field)
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(as_text).collect())
}

fn parse_ingredient(entry: &Value) -> IngredientDocument {
    match entry.as_object() {
        Some(obj) => IngredientDocument {
            name: text(obj, "name"),
            quantity: text(obj, "quantity"),
            unit: text(obj, "unit"),
        },
        None => IngredientDocument {
            name: as_text(entry),
            quantity: None,
            unit: None,
        },
    }
}

fn parse_step(entry: &Value) -> StepDocument {
    match entry.as_object() {
        Some(obj) => StepDocument {
            step_number: numeric(obj.get("step_number")),
            text: first_text(obj, &["step_text", "description", "text"]),
            bare: false,
        },
        None => StepDocument {
            step_number: Numeric::Absent,
            text: as_text(entry),
            bare: true,
        },
    }
}

fn parse_recipe(obj: &Map<String, Value>) -> RecipeDocument {
    let ingredients = obj
        .get("ingredients")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().map(parse_ingredient).collect());

    let steps = obj
        .get("steps")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().map(parse_step).collect());

    RecipeDocument {
        id: first_text(obj, &["id", "slug"]),
        title: text(obj, "title"),
        cuisine: text(obj, "cuisine"),
        difficulty: text(obj, "difficulty"),
        prep_time_min: numeric(obj.get("prep_time_min")),
        cook_time_min: numeric(obj.get("cook_time_min")),
        total_time_min: numeric(obj.get("total_time_min")),
        ingredients,
        steps,
        tags: text_list(obj, "tags"),
        occasion: text_list(obj, "occasion"),
        nutrition_groups: text_list(obj, "nutrition_groups"),
        created_by: first_text(obj, &["created_by", "author"]),
        created_at: text(obj, "created_at"),
    }
}

fn parse_user(obj: &Map<String, Value>) -> UserDocument {
    UserDocument {
        id: text(obj, "id"),
        name: first_text(obj, &["name", "display_name"]),
        created_at: text(obj, "created_at"),
    }
}

fn parse_interaction(obj: &Map<String, Value>) -> InteractionDocument {
    let metadata = match obj.get("metadata") {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(v) => v.clone(),
    };

    let rating = match numeric(obj.get("rating")) {
        Numeric::Absent => numeric(metadata.get("rating")),
        other => other,
    };

    InteractionDocument {
        id: text(obj, "id"),
        user_id: text(obj, "user_id"),
        recipe_id: text(obj, "recipe_id"),
        interaction_type: text(obj, "type"),
        rating,
        timestamp: text(obj, "timestamp"),
        metadata,
    }
}
