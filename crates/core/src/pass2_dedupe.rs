//! Pass 2: Deduplication -- first occurrence wins.
//!
//! Rows are grouped by identifier. The first row in input order is kept;
//! every later row with the same identifier is quarantined. Ties are never
//! resolved by content. Rows with a blank identifier are not grouped and
//! are left for Pass 3 to flag.

use crate::quarantine::{interaction_key, recipe_key, QuarantineEntry, QuarantineSet, QuarantineStore};
use crate::rows::{InteractionRow, RecipeRow};
use crate::rules::RuleId;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// A removed duplicate recipe, as stored in the duplicate store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateRecipe {
    pub id: String,
    pub position: usize,
    /// Position of the row that was kept.
    pub kept_position: usize,
    pub recipe: RecipeRow,
}

/// Rows that survived deduplication plus the quarantined duplicates.
#[derive(Debug, Clone, Default)]
pub struct Deduplicated<T> {
    pub kept: Vec<T>,
    pub duplicates: QuarantineSet,
}

pub fn dedupe_recipes(rows: &[RecipeRow]) -> Deduplicated<RecipeRow> {
    let mut out = Deduplicated {
        kept: Vec::with_capacity(rows.len()),
        duplicates: QuarantineSet::new(),
    };

    for (row, kept_position) in first_occurrence(rows, |r| r.id.as_deref(), |r| r.position) {
        match kept_position {
            None => out.kept.push(row.clone()),
            Some(kept_position) => {
                let id = row.id.clone().unwrap_or_default();
                let detail = format!(
                    "recipe id '{}' already taken by position {}",
                    id, kept_position
                );
                let record = DuplicateRecipe {
                    id,
                    position: row.position,
                    kept_position,
                    recipe: row.clone(),
                };
                out.duplicates.push(QuarantineEntry::new(
                    QuarantineStore::DuplicateRecipes,
                    recipe_key(row.position),
                    RuleId::DuplicateRecipeIds,
                    detail,
                    &record,
                ));
            }
        }
    }

    debug!(
        kept = out.kept.len(),
        duplicates = out.duplicates.len(),
        "pass 2: deduplicated recipes"
    );
    out
}

pub fn dedupe_interactions(rows: &[InteractionRow]) -> Deduplicated<InteractionRow> {
    let mut out = Deduplicated {
        kept: Vec::with_capacity(rows.len()),
        duplicates: QuarantineSet::new(),
    };

    for (row, kept_position) in first_occurrence(rows, |r| r.id.as_deref(), |r| r.position) {
        match kept_position {
            None => out.kept.push(row.clone()),
            Some(kept_position) => {
                let detail = format!(
                    "interaction id '{}' already taken by position {}",
                    row.id.as_deref().unwrap_or_default(),
                    kept_position
                );
                out.duplicates.push(QuarantineEntry::new(
                    QuarantineStore::Interactions,
                    interaction_key(row.position),
                    RuleId::DuplicateInteractionIds,
                    detail,
                    row,
                ));
            }
        }
    }

    debug!(
        kept = out.kept.len(),
        duplicates = out.duplicates.len(),
        "pass 2: deduplicated interactions"
    );
    out
}

/// Pair each row with the position of an earlier row sharing its id, if any.
fn first_occurrence<'a, T>(
    rows: &'a [T],
    id: impl Fn(&T) -> Option<&str>,
    position: impl Fn(&T) -> usize,
) -> Vec<(&'a T, Option<usize>)> {
    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    rows.iter()
        .map(|row| {
            let key = id(row).map(str::trim).filter(|k| !k.is_empty());
            let earlier = key.and_then(|k| match first_seen.get(k) {
                Some(&p) => Some(p),
                None => {
                    first_seen.insert(k, position(row));
                    None
                }
            });
            (row, earlier)
        })
        .collect()
}
