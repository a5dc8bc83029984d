use larder_core::PipelineOutcome;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Summary of one pipeline run, written next to the accepted tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    /// RFC 3339 timestamp string.
    pub timestamp: String,
    /// SHA-256 over the three input collections.
    pub input_fingerprint: String,
    pub recipes_read: usize,
    pub users_read: usize,
    pub interactions_read: usize,
    pub accepted_recipes: usize,
    pub accepted_ingredients: usize,
    pub accepted_steps: usize,
    pub accepted_interactions: usize,
    pub quarantined_entries: usize,
    pub duplicate_recipes: usize,
    pub cascaded_ingredients: usize,
    pub cascaded_steps: usize,
    pub elapsed_ms: u64,
}

impl RunManifest {
    pub fn new(
        outcome: &PipelineOutcome,
        timestamp: &str,
        input_fingerprint: String,
        elapsed_ms: u64,
    ) -> Self {
        let stats = &outcome.stats;
        let accepted = &outcome.accepted;
        RunManifest {
            timestamp: timestamp.to_string(),
            input_fingerprint,
            recipes_read: stats.recipes_read,
            users_read: stats.users_read,
            interactions_read: stats.interactions_read,
            accepted_recipes: accepted.recipes.len(),
            accepted_ingredients: accepted.ingredients.len(),
            accepted_steps: accepted.steps.len(),
            accepted_interactions: accepted.interactions.len(),
            quarantined_entries: outcome.quarantine.len(),
            duplicate_recipes: outcome.duplicate_recipes(),
            cascaded_ingredients: stats.cascaded_ingredients,
            cascaded_steps: stats.cascaded_steps,
            elapsed_ms,
        }
    }
}

/// Compute the SHA-256 fingerprint of an input snapshot from the compact
/// JSON form of each collection.
pub fn input_fingerprint(recipes: &[Value], users: &[Value], interactions: &[Value]) -> String {
    let mut hasher = Sha256::new();
    for collection in [recipes, users, interactions] {
        for doc in collection {
            hasher.update(doc.to_string().as_bytes());
            hasher.update([0x1f]);
        }
        hasher.update([0x1e]);
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fingerprint_is_stable_and_order_sensitive() {
        let a = [json!({"id": "r1"})];
        let b = [json!({"id": "r2"})];
        let first = input_fingerprint(&a, &[], &b);
        assert_eq!(first, input_fingerprint(&a, &[], &b));
        assert_eq!(first.len(), 64);
        assert_ne!(first, input_fingerprint(&b, &[], &a));
        // Moving a document between collections changes the fingerprint.
        assert_ne!(first, input_fingerprint(&a, &b, &[]));
    }
}
