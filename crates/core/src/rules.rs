//! The rule catalogue: identifiers, severities and the `Rule` contract.

use serde::Serialize;
use std::fmt;

/// Descriptive classification of a violation. Never affects acceptance.
///
/// Variant order is report order: `Critical` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }

    /// Case-insensitive parse of a severity label.
    pub fn parse(label: &str) -> Option<Severity> {
        Severity::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Difficulty domain, in canonical spelling.
pub const DIFFICULTIES: [&str; 3] = ["Easy", "Medium", "Hard"];

/// Interaction type domain.
pub const INTERACTION_TYPES: [&str; 4] = ["view", "like", "rating", "attempt"];

/// Identifier of a validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    MissingRecipeColumns,
    NegativeTimeValues,
    InvalidTimeFormat,
    InvalidDifficultyValues,
    InvalidIngredients,
    InvalidSteps,
    DuplicateRecipeIds,
    InvalidInteractions,
    DuplicateInteractionIds,
    OrphanInteractions,
}

impl RuleId {
    /// Every rule, in catalogue order.
    pub const CATALOGUE: [RuleId; 10] = [
        RuleId::MissingRecipeColumns,
        RuleId::NegativeTimeValues,
        RuleId::InvalidTimeFormat,
        RuleId::InvalidDifficultyValues,
        RuleId::InvalidIngredients,
        RuleId::InvalidSteps,
        RuleId::DuplicateRecipeIds,
        RuleId::InvalidInteractions,
        RuleId::DuplicateInteractionIds,
        RuleId::OrphanInteractions,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuleId::MissingRecipeColumns => "missing_recipe_columns",
            RuleId::NegativeTimeValues => "negative_time_values",
            RuleId::InvalidTimeFormat => "invalid_time_format",
            RuleId::InvalidDifficultyValues => "invalid_difficulty_values",
            RuleId::InvalidIngredients => "invalid_ingredients",
            RuleId::InvalidSteps => "invalid_steps",
            RuleId::DuplicateRecipeIds => "duplicate_recipe_ids",
            RuleId::InvalidInteractions => "invalid_interactions",
            RuleId::DuplicateInteractionIds => "duplicate_interaction_ids",
            RuleId::OrphanInteractions => "orphan_interactions",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            RuleId::OrphanInteractions => Severity::Critical,
            RuleId::NegativeTimeValues | RuleId::InvalidTimeFormat => Severity::High,
            RuleId::InvalidSteps | RuleId::InvalidInteractions => Severity::Medium,
            RuleId::MissingRecipeColumns
            | RuleId::InvalidDifficultyValues
            | RuleId::InvalidIngredients
            | RuleId::DuplicateRecipeIds
            | RuleId::DuplicateInteractionIds => Severity::Low,
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single catalogue rule evaluated against one row.
///
/// `S` is whatever context the rule needs beyond the row itself: the
/// child rows of a recipe, or the finalized accepted recipe id set for
/// interactions. Returns a human-readable detail when violated.
pub trait Rule<R, S> {
    fn id(&self) -> RuleId;

    fn check(&self, row: &R, scope: &S) -> Option<String>;
}
