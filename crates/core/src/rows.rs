//! Flat, schema-fixed rows produced by the Normalizer.
//!
//! Every row carries the `position` of its source document so that
//! duplicate handling and parent/child exclusion never rely on identifier
//! equality alone. Fields that may be missing in the source stay
//! `Option` here; the Validator decides what that means.

use larder_documents::Numeric;
use serde::Serialize;

/// One row per recipe document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeRow {
    pub position: usize,
    pub id: Option<String>,
    pub title: Option<String>,
    pub cuisine: Option<String>,
    pub difficulty: Option<String>,
    pub prep_time_min: Numeric,
    pub cook_time_min: Numeric,
    pub total_time_min: Numeric,
    /// Comma-joined; empty when the source array was absent.
    pub tags: String,
    pub occasion: String,
    pub nutrition_groups: String,
    pub created_by: Option<String>,
    pub created_at: Option<String>,
}

/// One row per (recipe, ingredient) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientRow {
    pub recipe_position: usize,
    pub recipe_id: Option<String>,
    /// Index within the recipe's ingredient array.
    pub position: usize,
    pub ingredient_name: Option<String>,
    pub quantity: Option<String>,
    pub unit: Option<String>,
}

/// One row per (recipe, step) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRow {
    pub recipe_position: usize,
    pub recipe_id: Option<String>,
    /// Index within the recipe's step array.
    pub position: usize,
    /// `None` when the source step number could not be resolved.
    pub step_number: Option<u32>,
    pub step_text: Option<String>,
}

/// One row per interaction document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionRow {
    pub position: usize,
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub recipe_id: Option<String>,
    #[serde(rename = "type")]
    pub interaction_type: Option<String>,
    pub rating: Numeric,
    pub timestamp: Option<String>,
    /// Compact JSON of the source metadata object.
    pub metadata_json: String,
}

/// Output of the Normalizer: all row-sets of one run, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    pub recipes: Vec<RecipeRow>,
    pub ingredients: Vec<IngredientRow>,
    pub steps: Vec<StepRow>,
    pub interactions: Vec<InteractionRow>,
    pub users_read: usize,
}

impl NormalizedBatch {
    pub fn record_count(&self) -> usize {
        self.recipes.len() + self.ingredients.len() + self.steps.len() + self.interactions.len()
    }
}

/// The four validated row-sets handed to downstream analytics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcceptedTables {
    pub recipes: Vec<RecipeRow>,
    pub ingredients: Vec<IngredientRow>,
    pub steps: Vec<StepRow>,
    pub interactions: Vec<InteractionRow>,
}

/// Returns true for `None`, empty, or whitespace-only text.
pub(crate) fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}
