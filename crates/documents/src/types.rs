//! Typed structs representing decoded source documents.
//!
//! Text fields are `Option<String>`; numeric fields are [`Numeric`] so a
//! value that failed to parse is carried forward with its original text.
//! Fields whose shape varies by document (interaction metadata) stay
//! as `serde_json::Value`.

use serde::{Serialize, Serializer};

/// A numeric field as found in a source document.
#[derive(Debug, Clone, PartialEq)]
pub enum Numeric {
    /// A finite number, either a JSON number or text that parsed as one.
    Value(f64),
    /// Missing, null, or blank text.
    Absent,
    /// Present but not a finite number. Holds the original text.
    Malformed(String),
}

impl Numeric {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Numeric::Value(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Numeric::Absent)
    }
}

impl Serialize for Numeric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Numeric::Value(v) => serializer.serialize_f64(*v),
            Numeric::Absent => serializer.serialize_none(),
            Numeric::Malformed(raw) => serializer.serialize_str(raw),
        }
    }
}

/// All three decoded collections of one extraction snapshot.
#[derive(Debug, Clone, Default)]
pub struct DocumentBatch {
    pub recipes: Vec<RecipeDocument>,
    pub users: Vec<UserDocument>,
    pub interactions: Vec<InteractionDocument>,
}

// ── Recipe ──────────────────────────────────────────────────────────

/// A recipe document prior to normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDocument {
    /// `id`, or `slug` when `id` is missing.
    pub id: Option<String>,
    pub title: Option<String>,
    pub cuisine: Option<String>,
    pub difficulty: Option<String>,
    pub prep_time_min: Numeric,
    pub cook_time_min: Numeric,
    pub total_time_min: Numeric,
    /// `None` when the field is absent or not an array.
    pub ingredients: Option<Vec<IngredientDocument>>,
    /// `None` when the field is absent or not an array.
    pub steps: Option<Vec<StepDocument>>,
    pub tags: Option<Vec<String>>,
    pub occasion: Option<Vec<String>>,
    pub nutrition_groups: Option<Vec<String>>,
    /// `created_by`, falling back to `author`.
    pub created_by: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientDocument {
    pub name: Option<String>,
    /// Kept as text: "1/2", "200" and "0.5" are all legal quantities.
    pub quantity: Option<String>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepDocument {
    pub step_number: Numeric,
    pub text: Option<String>,
    /// True when the array entry was a bare string rather than an object.
    pub bare: bool,
}

// ── User ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct UserDocument {
    pub id: Option<String>,
    pub name: Option<String>,
    pub created_at: Option<String>,
}

// ── Interaction ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionDocument {
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub recipe_id: Option<String>,
    pub interaction_type: Option<String>,
    /// Top-level `rating`, falling back to `metadata.rating`.
    pub rating: Numeric,
    pub timestamp: Option<String>,
    /// Opaque; its shape depends on the interaction type.
    pub metadata: serde_json::Value,
}
