//! Three-pass pipeline: documents -> accepted tables + quarantine.
//!
//! A thin orchestrator that calls each pass in order. Deterministic: the
//! same batch always yields the same outcome.

use crate::pass1_normalize;
use crate::pass2_dedupe;
use crate::pass3_validate;
use crate::quarantine::{QuarantineSet, QuarantineStore};
use crate::rows::AcceptedTables;
use larder_documents::{from_documents, DocumentBatch, DocumentError};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

/// Row and document counts of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub recipes_read: usize,
    pub users_read: usize,
    pub interactions_read: usize,
    pub ingredient_rows: usize,
    pub step_rows: usize,
    /// Recipe, ingredient, step and interaction rows, duplicates included.
    pub records_processed: usize,
    pub cascaded_ingredients: usize,
    pub cascaded_steps: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineOutcome {
    pub accepted: AcceptedTables,
    pub quarantine: QuarantineSet,
    pub stats: RunStats,
}

impl PipelineOutcome {
    pub fn duplicate_recipes(&self) -> usize {
        self.quarantine
            .in_store(QuarantineStore::DuplicateRecipes)
            .count()
    }
}

/// Run normalization, deduplication and validation over one batch.
pub fn run(batch: &DocumentBatch) -> PipelineOutcome {
    // Pass 1: explode nested documents
    let normalized = pass1_normalize::normalize(batch);

    // Pass 2: recipe deduplication
    let recipes = pass2_dedupe::dedupe_recipes(&normalized.recipes);

    // Pass 3a: recipes with their children; fixes the accepted id set
    let recipe_verdict =
        pass3_validate::validate_recipes(&recipes.kept, &normalized.ingredients, &normalized.steps);

    // Pass 2 + 3b: interactions against the finalized recipe set
    let interactions = pass2_dedupe::dedupe_interactions(&normalized.interactions);
    let interaction_verdict =
        pass3_validate::validate_interactions(&interactions.kept, &recipe_verdict.accepted_ids);

    let mut quarantine = recipes.duplicates;
    quarantine.append(recipe_verdict.quarantine);
    quarantine.append(interactions.duplicates);
    quarantine.append(interaction_verdict.quarantine);

    let stats = RunStats {
        recipes_read: batch.recipes.len(),
        users_read: normalized.users_read,
        interactions_read: batch.interactions.len(),
        ingredient_rows: normalized.ingredients.len(),
        step_rows: normalized.steps.len(),
        records_processed: normalized.record_count(),
        cascaded_ingredients: recipe_verdict.cascaded_ingredients,
        cascaded_steps: recipe_verdict.cascaded_steps,
    };

    let outcome = PipelineOutcome {
        accepted: AcceptedTables {
            recipes: recipe_verdict.recipes,
            ingredients: recipe_verdict.ingredients,
            steps: recipe_verdict.steps,
            interactions: interaction_verdict.interactions,
        },
        quarantine,
        stats,
    };

    info!(
        recipes = outcome.accepted.recipes.len(),
        interactions = outcome.accepted.interactions.len(),
        quarantined = outcome.quarantine.len(),
        "pipeline complete"
    );

    outcome
}

/// Decode raw collections and run the pipeline. Fails only when a
/// collection element is not a mapping.
pub fn run_documents(
    recipes: &[Value],
    users: &[Value],
    interactions: &[Value],
) -> Result<PipelineOutcome, DocumentError> {
    let batch = from_documents(recipes, users, interactions)?;
    Ok(run(&batch))
}
