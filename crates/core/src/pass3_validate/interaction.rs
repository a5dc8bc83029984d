//! Interaction rules, including the one cross-entity rule.

use super::AcceptedRecipeIds;
use crate::rows::{is_blank, InteractionRow};
use crate::rules::{Rule, RuleId, INTERACTION_TYPES};

/// Interaction rules in evaluation order.
pub(super) fn interaction_rules() -> Vec<Box<dyn Rule<InteractionRow, AcceptedRecipeIds>>> {
    vec![Box::new(RequiredFields), Box::new(OrphanReference)]
}

pub(super) struct RequiredFields;

impl Rule<InteractionRow, AcceptedRecipeIds> for RequiredFields {
    fn id(&self) -> RuleId {
        RuleId::InvalidInteractions
    }

    fn check(&self, row: &InteractionRow, _: &AcceptedRecipeIds) -> Option<String> {
        let mut problems: Vec<String> = [
            ("id", &row.id),
            ("user_id", &row.user_id),
            ("recipe_id", &row.recipe_id),
        ]
        .into_iter()
        .filter(|(_, v)| is_blank(v))
        .map(|(name, _)| format!("missing {}", name))
        .collect();

        match row.interaction_type.as_deref().map(str::trim) {
            Some(t) if INTERACTION_TYPES.contains(&t) => {}
            Some(t) => problems.push(format!("type '{}' not in {{{}}}", t, INTERACTION_TYPES.join(", "))),
            None => problems.push("missing type".to_string()),
        }

        (!problems.is_empty()).then(|| problems.join("; "))
    }
}

/// Referential integrity against the finalized accepted recipe set. A
/// recipe that exists only in quarantine is not a valid target.
pub(super) struct OrphanReference;

impl Rule<InteractionRow, AcceptedRecipeIds> for OrphanReference {
    fn id(&self) -> RuleId {
        RuleId::OrphanInteractions
    }

    fn check(&self, row: &InteractionRow, accepted: &AcceptedRecipeIds) -> Option<String> {
        match row.recipe_id.as_deref().map(str::trim) {
            Some(id) if accepted.contains(id) => None,
            Some(id) if !id.is_empty() => {
                Some(format!("recipe '{}' not in accepted recipe set", id))
            }
            _ => Some("no recipe_id to resolve".to_string()),
        }
    }
}
