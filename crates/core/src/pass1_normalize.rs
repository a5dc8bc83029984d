//! Pass 1: Normalization -- explode nested documents into flat row-sets.
//!
//! The Normalizer never rejects anything. Missing, negative or
//! unparseable values are passed through unchanged so that Pass 3 can
//! classify them; an absent ingredient or step array simply yields zero
//! child rows.

use crate::rows::*;
use crate::rules::DIFFICULTIES;
use larder_documents::{
    DocumentBatch, IngredientDocument, InteractionDocument, Numeric, RecipeDocument, StepDocument,
};
use tracing::debug;

/// Separator for flattened array fields.
pub const DELIMITER: &str = ",";

pub fn normalize(batch: &DocumentBatch) -> NormalizedBatch {
    let mut out = NormalizedBatch {
        users_read: batch.users.len(),
        ..NormalizedBatch::default()
    };

    for (position, doc) in batch.recipes.iter().enumerate() {
        let (recipe, ingredients, steps) = normalize_recipe(position, doc);
        out.recipes.push(recipe);
        out.ingredients.extend(ingredients);
        out.steps.extend(steps);
    }

    out.interactions = batch
        .interactions
        .iter()
        .enumerate()
        .map(|(position, doc)| normalize_interaction(position, doc))
        .collect();

    debug!(
        recipes = out.recipes.len(),
        ingredients = out.ingredients.len(),
        steps = out.steps.len(),
        interactions = out.interactions.len(),
        "pass 1: normalized batch"
    );

    out
}

/// Produce exactly one recipe row plus its ingredient and step rows.
pub fn normalize_recipe(
    position: usize,
    doc: &RecipeDocument,
) -> (RecipeRow, Vec<IngredientRow>, Vec<StepRow>) {
    let id = identifier(&doc.id);
    let recipe = RecipeRow {
        position,
        id: id.clone(),
        title: doc.title.clone(),
        cuisine: doc.cuisine.clone(),
        difficulty: doc.difficulty.as_deref().map(canonical_difficulty),
        prep_time_min: doc.prep_time_min.clone(),
        cook_time_min: doc.cook_time_min.clone(),
        total_time_min: doc.total_time_min.clone(),
        tags: join(doc.tags.as_deref()),
        occasion: join(doc.occasion.as_deref()),
        nutrition_groups: join(doc.nutrition_groups.as_deref()),
        created_by: doc.created_by.clone(),
        created_at: doc.created_at.clone(),
    };

    let ingredients = doc
        .ingredients
        .iter()
        .flatten()
        .enumerate()
        .map(|(i, ing)| IngredientRow {
            recipe_position: position,
            recipe_id: id.clone(),
            position: i,
            ingredient_name: ing.name.clone(),
            quantity: ing.quantity.clone(),
            unit: ing.unit.clone(),
        })
        .collect();

    let steps = doc
        .steps
        .iter()
        .flatten()
        .enumerate()
        .map(|(i, step)| StepRow {
            recipe_position: position,
            recipe_id: id.clone(),
            position: i,
            step_number: resolve_step_number(step, i),
            step_text: step.text.clone(),
        })
        .collect();

    (recipe, ingredients, steps)
}

pub fn normalize_interaction(position: usize, doc: &InteractionDocument) -> InteractionRow {
    InteractionRow {
        position,
        id: identifier(&doc.id),
        user_id: identifier(&doc.user_id),
        recipe_id: identifier(&doc.recipe_id),
        interaction_type: doc.interaction_type.clone(),
        rating: doc.rating.clone(),
        timestamp: doc.timestamp.clone(),
        metadata_json: doc.metadata.to_string(),
    }
}

/// Identifiers and foreign keys are stored trimmed, so rows, dedup keys
/// and the accepted id set all compare the same string.
fn identifier(raw: &Option<String>) -> Option<String> {
    raw.as_deref().map(|s| s.trim().to_string())
}

fn join(values: Option<&[String]>) -> String {
    values.map(|v| v.join(DELIMITER)).unwrap_or_default()
}

/// In-domain spellings are canonicalized; anything else is left as-is.
fn canonical_difficulty(raw: &str) -> String {
    let trimmed = raw.trim();
    DIFFICULTIES
        .iter()
        .find(|d| d.eq_ignore_ascii_case(trimmed))
        .map(|d| d.to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Integers >= 1 resolve to themselves; a bare string step resolves to
/// its 1-based ordinal. Everything else stays unresolved.
fn resolve_step_number(step: &StepDocument, index: usize) -> Option<u32> {
    if step.bare {
        return u32::try_from(index + 1).ok();
    }
    match step.step_number {
        Numeric::Value(v) if v >= 1.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) => {
            Some(v as u32)
        }
        _ => None,
    }
}

// ── Reassembly ──────────────────────────────────────────────────────

/// The nested arrays of one recipe rebuilt from flat rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeParts {
    pub ingredients: Vec<IngredientDocument>,
    pub steps: Vec<StepDocument>,
}

/// Re-aggregate the ingredient and step rows of `recipe_id`.
///
/// Ingredients keep explosion order; steps are sorted by step number.
pub fn reassemble(tables: &AcceptedTables, recipe_id: &str) -> RecipeParts {
    let belongs = |id: &Option<String>| id.as_deref() == Some(recipe_id);

    let mut ingredient_rows: Vec<&IngredientRow> = tables
        .ingredients
        .iter()
        .filter(|r| belongs(&r.recipe_id))
        .collect();
    ingredient_rows.sort_by_key(|r| r.position);

    let mut step_rows: Vec<&StepRow> = tables
        .steps
        .iter()
        .filter(|r| belongs(&r.recipe_id))
        .collect();
    step_rows.sort_by_key(|r| (r.step_number.is_none(), r.step_number, r.position));

    RecipeParts {
        ingredients: ingredient_rows
            .into_iter()
            .map(|r| IngredientDocument {
                name: r.ingredient_name.clone(),
                quantity: r.quantity.clone(),
                unit: r.unit.clone(),
            })
            .collect(),
        steps: step_rows
            .into_iter()
            .map(|r| StepDocument {
                step_number: r
                    .step_number
                    .map(|n| Numeric::Value(f64::from(n)))
                    .unwrap_or(Numeric::Absent),
                text: r.step_text.clone(),
                bare: false,
            })
            .collect(),
    }
}
