//! Quarantine model: rejected records tagged with the rule they violated.
//!
//! A record that violates two rules appears twice, once per rule, each
//! time with its full snapshot attached.

use crate::rules::{RuleId, Severity};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The logical store an entry belongs to, one per source entity type
/// plus a dedicated store for duplicate recipe identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuarantineStore {
    Recipes,
    Ingredients,
    Steps,
    Interactions,
    DuplicateRecipes,
}

impl QuarantineStore {
    pub const ALL: [QuarantineStore; 5] = [
        QuarantineStore::Recipes,
        QuarantineStore::Ingredients,
        QuarantineStore::Steps,
        QuarantineStore::Interactions,
        QuarantineStore::DuplicateRecipes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QuarantineStore::Recipes => "recipes",
            QuarantineStore::Ingredients => "ingredients",
            QuarantineStore::Steps => "steps",
            QuarantineStore::Interactions => "interactions",
            QuarantineStore::DuplicateRecipes => "duplicate_recipes",
        }
    }

    /// File stem used by persistent backends.
    pub fn file_stem(self) -> &'static str {
        match self {
            QuarantineStore::Recipes => "bad_recipes",
            QuarantineStore::Ingredients => "bad_ingredients",
            QuarantineStore::Steps => "bad_steps",
            QuarantineStore::Interactions => "bad_interactions",
            QuarantineStore::DuplicateRecipes => "duplicate_recipes",
        }
    }
}

impl fmt::Display for QuarantineStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rejected record under one violated rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuarantineEntry {
    /// SHA-256 over store, rule and record snapshot. Stable across runs
    /// for unchanged input.
    pub entry_id: String,
    pub store: QuarantineStore,
    /// Identifies the source record, e.g. `recipe:3` or `step:3.1`.
    pub record_key: String,
    pub violated_rule: RuleId,
    pub severity: Severity,
    pub detail: String,
    /// Full field set of the offending row.
    pub record: Value,
}

impl QuarantineEntry {
    pub fn new<T: Serialize>(
        store: QuarantineStore,
        record_key: String,
        rule: RuleId,
        detail: impl Into<String>,
        record: &T,
    ) -> Self {
        // Rows hold only strings, numbers and options, which always
        // serialize; Null is unreachable for them.
        let record = serde_json::to_value(record).unwrap_or(Value::Null);
        let entry_id = fingerprint(store, rule, &record);
        QuarantineEntry {
            entry_id,
            store,
            record_key,
            violated_rule: rule,
            severity: rule.severity(),
            detail: detail.into(),
            record,
        }
    }
}

fn fingerprint(store: QuarantineStore, rule: RuleId, record: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(store.as_str().as_bytes());
    hasher.update([0x1f]);
    hasher.update(rule.as_str().as_bytes());
    hasher.update([0x1f]);
    hasher.update(record.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

pub(crate) fn recipe_key(position: usize) -> String {
    format!("recipe:{}", position)
}

pub(crate) fn ingredient_key(recipe_position: usize, position: usize) -> String {
    format!("ingredient:{}.{}", recipe_position, position)
}

pub(crate) fn step_key(recipe_position: usize, position: usize) -> String {
    format!("step:{}.{}", recipe_position, position)
}

pub(crate) fn interaction_key(position: usize) -> String {
    format!("interaction:{}", position)
}

/// All quarantine entries of one run, in deterministic order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QuarantineSet {
    entries: Vec<QuarantineEntry>,
}

impl QuarantineSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: QuarantineEntry) {
        self.entries.push(entry);
    }

    pub fn append(&mut self, other: QuarantineSet) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[QuarantineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of a single store, in run order.
    pub fn in_store(&self, store: QuarantineStore) -> impl Iterator<Item = &QuarantineEntry> {
        self.entries.iter().filter(move |e| e.store == store)
    }

    /// Entries triggered by a single rule, in run order.
    pub fn for_rule(&self, rule: RuleId) -> impl Iterator<Item = &QuarantineEntry> {
        self.entries.iter().filter(move |e| e.violated_rule == rule)
    }

    pub fn count(&self, rule: RuleId) -> usize {
        self.for_rule(rule).count()
    }

    /// Per-rule entry counts. Rules without entries are omitted.
    pub fn counts_by_rule(&self) -> BTreeMap<RuleId, usize> {
        let mut counts = BTreeMap::new();
        for e in &self.entries {
            *counts.entry(e.violated_rule).or_insert(0) += 1;
        }
        counts
    }

    /// Distinct records with at least one entry.
    pub fn flagged_records(&self) -> BTreeSet<&str> {
        self.entries.iter().map(|e| e.record_key.as_str()).collect()
    }
}
