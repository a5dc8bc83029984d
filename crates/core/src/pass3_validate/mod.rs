//! Pass 3: Rule-based validation -- partition rows into accepted and
//! quarantined sets.
//!
//! Runs in two phases. Phase A validates recipes together with their
//! ingredient and step rows and produces [`AcceptedRecipeIds`], which
//! only this phase can construct. Phase B validates interactions and
//! requires that set, so interactions can never be checked against a
//! recipe set that is still changing.

mod interaction;
mod recipe;

use crate::quarantine::{
    ingredient_key, interaction_key, recipe_key, step_key, QuarantineEntry, QuarantineSet,
    QuarantineStore,
};
use crate::rows::{IngredientRow, InteractionRow, RecipeRow, StepRow};
use crate::rules::Rule;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// The child rows of one recipe, visible to recipe-level rules.
pub struct RecipeScope<'a> {
    pub ingredients: Vec<&'a IngredientRow>,
    pub steps: Vec<&'a StepRow>,
}

/// Identifiers of every accepted recipe, fixed once Phase A completes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcceptedRecipeIds(BTreeSet<String>);

impl AcceptedRecipeIds {
    pub(crate) fn from_ids(ids: impl IntoIterator<Item = String>) -> Self {
        AcceptedRecipeIds(ids.into_iter().collect())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Phase A output.
#[derive(Debug, Clone, Default)]
pub struct RecipeVerdict {
    pub recipes: Vec<RecipeRow>,
    pub ingredients: Vec<IngredientRow>,
    pub steps: Vec<StepRow>,
    pub accepted_ids: AcceptedRecipeIds,
    pub quarantine: QuarantineSet,
    /// Valid ingredient rows dropped because their parent was not accepted.
    pub cascaded_ingredients: usize,
    pub cascaded_steps: usize,
}

/// Phase B output.
#[derive(Debug, Clone, Default)]
pub struct InteractionVerdict {
    pub interactions: Vec<InteractionRow>,
    pub quarantine: QuarantineSet,
}

/// Phase A: validate deduplicated recipes with all ingredient and step rows.
///
/// Child rows whose parent is absent from `recipes` (removed as a
/// duplicate) are never accepted.
pub fn validate_recipes(
    recipes: &[RecipeRow],
    ingredients: &[IngredientRow],
    steps: &[StepRow],
) -> RecipeVerdict {
    let mut ingredients_by_recipe: HashMap<usize, Vec<&IngredientRow>> = HashMap::new();
    for row in ingredients {
        ingredients_by_recipe
            .entry(row.recipe_position)
            .or_default()
            .push(row);
    }
    let mut steps_by_recipe: HashMap<usize, Vec<&StepRow>> = HashMap::new();
    for row in steps {
        steps_by_recipe.entry(row.recipe_position).or_default().push(row);
    }

    let recipe_rules = recipe::recipe_rules();
    let ingredient_rules: Vec<Box<dyn Rule<IngredientRow, ()>>> =
        vec![Box::new(recipe::IngredientComplete)];
    let step_rules: Vec<Box<dyn Rule<StepRow, ()>>> = vec![Box::new(recipe::StepComplete)];

    let mut verdict = RecipeVerdict::default();
    let mut accepted_positions: HashSet<usize> = HashSet::new();
    let mut flagged_ingredients = 0usize;
    let mut flagged_steps = 0usize;

    for row in recipes {
        let scope = RecipeScope {
            ingredients: ingredients_by_recipe
                .get(&row.position)
                .cloned()
                .unwrap_or_default(),
            steps: steps_by_recipe.get(&row.position).cloned().unwrap_or_default(),
        };

        let mut rejected = false;
        for rule in &recipe_rules {
            if let Some(detail) = rule.check(row, &scope) {
                rejected = true;
                verdict.quarantine.push(QuarantineEntry::new(
                    QuarantineStore::Recipes,
                    recipe_key(row.position),
                    rule.id(),
                    detail,
                    row,
                ));
            }
        }

        for child in &scope.ingredients {
            let mut flagged = false;
            for rule in &ingredient_rules {
                if let Some(detail) = rule.check(child, &()) {
                    flagged = true;
                    verdict.quarantine.push(QuarantineEntry::new(
                        QuarantineStore::Ingredients,
                        ingredient_key(child.recipe_position, child.position),
                        rule.id(),
                        detail,
                        *child,
                    ));
                }
            }
            flagged_ingredients += usize::from(flagged);
        }

        for child in &scope.steps {
            let mut flagged = false;
            for rule in &step_rules {
                if let Some(detail) = rule.check(child, &()) {
                    flagged = true;
                    verdict.quarantine.push(QuarantineEntry::new(
                        QuarantineStore::Steps,
                        step_key(child.recipe_position, child.position),
                        rule.id(),
                        detail,
                        *child,
                    ));
                }
            }
            flagged_steps += usize::from(flagged);
        }

        if !rejected {
            accepted_positions.insert(row.position);
            verdict.recipes.push(row.clone());
        }
    }

    verdict.ingredients = ingredients
        .iter()
        .filter(|r| accepted_positions.contains(&r.recipe_position))
        .cloned()
        .collect();
    verdict.steps = steps
        .iter()
        .filter(|r| accepted_positions.contains(&r.recipe_position))
        .cloned()
        .collect();

    verdict.cascaded_ingredients =
        ingredients.len() - verdict.ingredients.len() - flagged_ingredients;
    verdict.cascaded_steps = steps.len() - verdict.steps.len() - flagged_steps;

    verdict.accepted_ids = AcceptedRecipeIds::from_ids(
        verdict
            .recipes
            .iter()
            .filter_map(|r| r.id.as_deref().map(|id| id.trim().to_string())),
    );

    debug!(
        accepted = verdict.recipes.len(),
        rejected = recipes.len() - verdict.recipes.len(),
        entries = verdict.quarantine.len(),
        "pass 3a: validated recipes"
    );

    verdict
}

/// Phase B: validate interactions against the finalized recipe set.
pub fn validate_interactions(
    interactions: &[InteractionRow],
    accepted: &AcceptedRecipeIds,
) -> InteractionVerdict {
    let rules = interaction::interaction_rules();
    let mut verdict = InteractionVerdict::default();

    for row in interactions {
        let mut rejected = false;
        for rule in &rules {
            if let Some(detail) = rule.check(row, accepted) {
                rejected = true;
                verdict.quarantine.push(QuarantineEntry::new(
                    QuarantineStore::Interactions,
                    interaction_key(row.position),
                    rule.id(),
                    detail,
                    row,
                ));
            }
        }
        if !rejected {
            verdict.interactions.push(row.clone());
        }
    }

    debug!(
        accepted = verdict.interactions.len(),
        entries = verdict.quarantine.len(),
        "pass 3b: validated interactions"
    );

    verdict
}
