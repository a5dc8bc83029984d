//! End-to-end behavior of the three-pass pipeline over small document
//! snapshots.

use larder_core::{
    reassemble, run, run_documents, DocumentError, PipelineOutcome, QuarantineStore, RuleId,
    Severity, DIFFICULTIES,
};
use larder_documents::{from_documents, Collection, Numeric};
use serde_json::{json, Value};
use std::collections::HashSet;

fn recipe(id: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Recipe {}", id),
        "cuisine": "Indian",
        "difficulty": "Medium",
        "prep_time_min": 10,
        "cook_time_min": 20,
        "total_time_min": 30,
        "tags": ["vegetarian", "weeknight"],
        "ingredients": [
            {"name": "Onion", "quantity": "1", "unit": "pcs"},
            {"name": "Ghee", "quantity": "1/2", "unit": "tbsp"}
        ],
        "steps": [
            {"step_number": 1, "step_text": "Chop onion."},
            {"step_number": 2, "step_text": "Fry in ghee."}
        ],
        "created_by": "u1"
    })
}

fn interaction(id: &str, recipe_id: &str, kind: &str) -> Value {
    json!({
        "id": id,
        "user_id": "u1",
        "recipe_id": recipe_id,
        "type": kind,
        "timestamp": "2024-05-01T10:00:00Z",
        "metadata": {"device": "mobile"}
    })
}

fn outcome(recipes: &[Value], interactions: &[Value]) -> PipelineOutcome {
    run_documents(recipes, &[json!({"id": "u1", "name": "Asha"})], interactions).unwrap()
}

fn accepted_ingredient_owners(out: &PipelineOutcome) -> HashSet<String> {
    out.accepted
        .ingredients
        .iter()
        .filter_map(|r| r.recipe_id.clone())
        .collect()
}

#[test]
fn negative_cook_time_quarantines_recipe_and_children() {
    let mut bad = recipe("r2");
    bad["cook_time_min"] = json!(-5);
    let out = outcome(&[recipe("r1"), bad], &[]);

    let entries: Vec<_> = out.quarantine.for_rule(RuleId::NegativeTimeValues).collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, Severity::High);
    assert_eq!(entries[0].store, QuarantineStore::Recipes);
    assert_eq!(entries[0].record["id"], "r2");
    assert_eq!(entries[0].record["cook_time_min"], -5.0);

    assert!(out
        .accepted
        .recipes
        .iter()
        .all(|r| r.id.as_deref() != Some("r2")));
    assert!(!accepted_ingredient_owners(&out).contains("r2"));
    assert!(out
        .accepted
        .steps
        .iter()
        .all(|r| r.recipe_id.as_deref() != Some("r2")));
    assert_eq!(out.stats.cascaded_ingredients, 2);
    assert_eq!(out.stats.cascaded_steps, 2);
}

#[test]
fn shared_identifier_keeps_first_and_quarantines_second() {
    let mut second = recipe("r1");
    second["title"] = json!("A more complete copy");
    let out = outcome(&[recipe("r1"), second], &[]);

    assert_eq!(out.accepted.recipes.len(), 1);
    assert_eq!(out.accepted.recipes[0].title.as_deref(), Some("Recipe r1"));
    assert_eq!(out.quarantine.count(RuleId::DuplicateRecipeIds), 1);
    assert_eq!(out.duplicate_recipes(), 1);

    let dup = out
        .quarantine
        .in_store(QuarantineStore::DuplicateRecipes)
        .next()
        .unwrap();
    assert_eq!(dup.record["id"], "r1");
    assert_eq!(dup.record["position"], 1);
    assert_eq!(dup.record["recipe"]["title"], "A more complete copy");

    // The duplicate's children never reach the accepted tables.
    assert_eq!(out.accepted.ingredients.len(), 2);
    assert!(out.accepted.ingredients.iter().all(|r| r.recipe_position == 0));
}

#[test]
fn unknown_recipe_reference_is_a_critical_orphan() {
    let out = outcome(
        &[recipe("r1")],
        &[
            interaction("i1", "r1", "view"),
            interaction("i2", "ghost-42", "like"),
        ],
    );

    let orphans: Vec<_> = out.quarantine.for_rule(RuleId::OrphanInteractions).collect();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].severity, Severity::Critical);
    assert_eq!(orphans[0].record["recipe_id"], "ghost-42");
    assert_eq!(
        out.quarantine
            .entries()
            .iter()
            .filter(|e| e.severity == Severity::Critical)
            .count(),
        1
    );
    assert_eq!(out.accepted.interactions.len(), 1);
}

#[test]
fn empty_steps_rejects_recipe_and_excludes_valid_ingredients() {
    let mut bad = recipe("r1");
    bad["steps"] = json!([]);
    let out = outcome(&[bad], &[]);

    let entries: Vec<_> = out.quarantine.for_rule(RuleId::InvalidSteps).collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, Severity::Medium);
    assert!(out.accepted.recipes.is_empty());
    assert!(out.accepted.ingredients.is_empty());
    // The ingredients themselves are fine, so they are not quarantined.
    assert_eq!(out.quarantine.in_store(QuarantineStore::Ingredients).count(), 0);
    assert_eq!(out.stats.cascaded_ingredients, 2);
}

#[test]
fn interaction_to_quarantined_recipe_is_orphaned() {
    let mut bad = recipe("r1");
    bad["difficulty"] = json!("Extreme");
    let out = outcome(&[bad], &[interaction("i1", "r1", "rating")]);

    assert_eq!(out.quarantine.count(RuleId::InvalidDifficultyValues), 1);
    assert_eq!(out.quarantine.count(RuleId::OrphanInteractions), 1);
    assert!(out.accepted.interactions.is_empty());
}

#[test]
fn padded_identifiers_join_on_their_trimmed_form() {
    let padded = recipe(" r1 ");
    let out = outcome(
        &[padded, recipe("r1")],
        &[interaction("i1", "r1", "view"), interaction("i2", " r1", "like")],
    );

    assert_eq!(out.accepted.recipes.len(), 1);
    assert_eq!(out.accepted.recipes[0].id.as_deref(), Some("r1"));
    assert_eq!(out.quarantine.count(RuleId::DuplicateRecipeIds), 1);

    let recipe_ids: HashSet<String> = out
        .accepted
        .recipes
        .iter()
        .filter_map(|r| r.id.clone())
        .collect();
    assert!(accepted_ingredient_owners(&out).is_subset(&recipe_ids));
    assert!(out
        .accepted
        .steps
        .iter()
        .all(|s| s.recipe_id.as_deref() == Some("r1")));

    assert_eq!(out.accepted.interactions.len(), 2);
    for row in &out.accepted.interactions {
        let target = row.recipe_id.clone().unwrap();
        assert!(recipe_ids.contains(&target), "{target:?} not accepted");
    }
}

#[test]
fn duplicate_interactions_are_removed_before_validation() {
    let out = outcome(
        &[recipe("r1")],
        &[
            interaction("i1", "r1", "view"),
            interaction("i1", "r1", "like"),
        ],
    );
    assert_eq!(out.accepted.interactions.len(), 1);
    assert_eq!(
        out.accepted.interactions[0].interaction_type.as_deref(),
        Some("view")
    );
    let entry = out
        .quarantine
        .for_rule(RuleId::DuplicateInteractionIds)
        .next()
        .unwrap();
    assert_eq!(entry.store, QuarantineStore::Interactions);
}

/// A messy snapshot exercising every rule at once.
fn messy_snapshot() -> (Vec<Value>, Vec<Value>) {
    let mut negative = recipe("r2");
    negative["prep_time_min"] = json!(-1);
    let mut untimed = recipe("r3");
    untimed["total_time_min"] = json!("NaN");
    let mut no_title = recipe("r4");
    no_title["title"] = Value::Null;
    let mut half_ingredient = recipe("r5");
    half_ingredient["ingredients"][1] = json!({"name": "Salt"});
    let mut no_ingredients = recipe("r6");
    no_ingredients.as_object_mut().unwrap().remove("ingredients");
    let mut extreme = recipe("r8");
    extreme["difficulty"] = json!("Extreme");
    let mut silent_step = recipe("r9");
    silent_step["steps"][1] = json!({"step_number": 2});

    let recipes = vec![
        recipe("r1"),
        negative,
        untimed,
        no_title,
        half_ingredient,
        no_ingredients,
        recipe("r1"),
        recipe("r7"),
        extreme,
        silent_step,
    ];
    let interactions = vec![
        interaction("i1", "r1", "view"),
        interaction("i2", "r2", "like"),
        interaction("i3", "r7", "share"),
        json!({"id": "i4", "user_id": "u1", "type": "view"}),
        interaction("i5", "ghost-42", "attempt"),
        interaction("i1", "r7", "view"),
    ];
    (recipes, interactions)
}

#[test]
fn accepted_output_upholds_invariants() {
    let (recipes, interactions) = messy_snapshot();
    let out = outcome(&recipes, &interactions);

    let accepted_ids: Vec<&str> = out
        .accepted
        .recipes
        .iter()
        .filter_map(|r| r.id.as_deref())
        .collect();
    assert_eq!(accepted_ids, vec!["r1", "r7"]);

    let unique: HashSet<&str> = accepted_ids.iter().copied().collect();
    assert_eq!(unique.len(), accepted_ids.len());

    for r in &out.accepted.recipes {
        for t in [&r.prep_time_min, &r.cook_time_min, &r.total_time_min] {
            assert!(matches!(t, Numeric::Value(v) if *v >= 0.0));
        }
        assert!(DIFFICULTIES.contains(&r.difficulty.as_deref().unwrap()));
        let id = r.id.as_deref();
        assert!(out.accepted.ingredients.iter().any(|i| i.recipe_id.as_deref() == id));
        assert!(out.accepted.steps.iter().any(|s| s.recipe_id.as_deref() == id));
    }

    for i in &out.accepted.ingredients {
        assert!(unique.contains(i.recipe_id.as_deref().unwrap()));
    }
    for s in &out.accepted.steps {
        assert!(unique.contains(s.recipe_id.as_deref().unwrap()));
    }
    for i in &out.accepted.interactions {
        assert!(unique.contains(i.recipe_id.as_deref().unwrap()));
    }
    assert_eq!(out.accepted.interactions.len(), 1);
}

#[test]
fn every_catalogue_rule_fires_on_messy_snapshot() {
    let (recipes, interactions) = messy_snapshot();
    let out = outcome(&recipes, &interactions);
    for rule in RuleId::CATALOGUE {
        assert!(out.quarantine.count(rule) > 0, "{} never fired", rule);
    }
    assert_eq!(
        out.quarantine.in_store(QuarantineStore::Ingredients).count(),
        1
    );
    assert_eq!(out.quarantine.in_store(QuarantineStore::Steps).count(), 1);
}

#[test]
fn rerun_on_same_snapshot_is_identical() {
    let (recipes, interactions) = messy_snapshot();
    let first = outcome(&recipes, &interactions);
    let second = outcome(&recipes, &interactions);

    assert_eq!(first.accepted, second.accepted);
    assert_eq!(
        serde_json::to_string(&first.quarantine).unwrap(),
        serde_json::to_string(&second.quarantine).unwrap()
    );
    assert_eq!(first.stats, second.stats);
}

#[test]
fn reassembly_restores_nested_arrays() {
    let mut doc = recipe("r1");
    doc["steps"] = json!([
        {"step_number": 2, "step_text": "Fry in ghee."},
        {"step_number": 1, "step_text": "Chop onion."},
        {"step_number": 3, "step_text": "Serve hot."}
    ]);
    let batch = from_documents(&[doc], &[], &[]).unwrap();
    let out = run(&batch);
    assert_eq!(out.accepted.recipes.len(), 1);

    let parts = reassemble(&out.accepted, "r1");
    let original = &batch.recipes[0];
    assert_eq!(Some(parts.ingredients), original.ingredients.clone());

    let mut expected = original.steps.clone().unwrap();
    expected.sort_by(|a, b| {
        a.step_number
            .as_f64()
            .partial_cmp(&b.step_number.as_f64())
            .unwrap()
    });
    assert_eq!(parts.steps, expected);
}

#[test]
fn record_count_includes_children_and_duplicates() {
    let out = outcome(
        &[recipe("r1"), recipe("r1")],
        &[interaction("i1", "r1", "view")],
    );
    assert_eq!(out.stats.recipes_read, 2);
    assert_eq!(out.stats.users_read, 1);
    assert_eq!(out.stats.ingredient_rows, 4);
    assert_eq!(out.stats.step_rows, 4);
    assert_eq!(out.stats.records_processed, 2 + 4 + 4 + 1);
}

#[test]
fn everything_quarantined_is_still_a_complete_run() {
    let out = outcome(&[json!({}), json!({"id": "x"})], &[json!({})]);
    assert!(out.accepted.recipes.is_empty());
    assert!(out.accepted.interactions.is_empty());
    assert!(!out.quarantine.is_empty());
}

#[test]
fn non_mapping_document_aborts_the_run() {
    let err = run_documents(&[recipe("r1"), json!("not a recipe")], &[], &[]).unwrap_err();
    assert_eq!(
        err,
        DocumentError::NotADocument {
            collection: Collection::Recipes,
            index: 1,
            found: "string",
        }
    );
    assert_eq!(err.to_string(), "recipes[1] is not a document: found string");
}
