//! larder-core: normalization, deduplication and validation of recipe
//! platform documents.
//!
//! Turns a [`DocumentBatch`] into four accepted row-sets plus a
//! quarantine of rejected records, each tagged with the rule it violated.
//!
//! # Public API
//!
//! - [`run()`] / [`run_documents()`] -- the full three-pass pipeline
//! - [`PipelineOutcome`] -- accepted tables, quarantine and run statistics
//! - [`QuarantineSet`], [`QuarantineEntry`] -- rejected records
//! - [`RuleId`], [`Severity`] -- the rule catalogue
//!
//! Individual pass entry functions are also re-exported for selective
//! pipeline execution.

pub mod pass1_normalize;
pub mod pass2_dedupe;
pub mod pass3_validate;
pub mod pipeline;
pub mod quarantine;
pub mod rows;
pub mod rules;

// ── Convenience re-exports: key types ────────────────────────────────

pub use larder_documents::{DocumentBatch, DocumentError, Numeric};
pub use pass2_dedupe::{Deduplicated, DuplicateRecipe};
pub use pass3_validate::{AcceptedRecipeIds, InteractionVerdict, RecipeVerdict};
pub use pipeline::{PipelineOutcome, RunStats};
pub use quarantine::{QuarantineEntry, QuarantineSet, QuarantineStore};
pub use rows::{AcceptedTables, IngredientRow, InteractionRow, NormalizedBatch, RecipeRow, StepRow};
pub use rules::{RuleId, Severity, DIFFICULTIES, INTERACTION_TYPES};

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use pass1_normalize::{normalize, reassemble, RecipeParts};
pub use pass2_dedupe::{dedupe_interactions, dedupe_recipes};
pub use pass3_validate::{validate_interactions, validate_recipes};
pub use pipeline::{run, run_documents};
