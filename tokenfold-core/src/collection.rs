use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::error::CollectionError;
use crate::field_name::FieldNamePolicy;
use crate::group::GroupKey;
use crate::join::JoinedToken;

/// The normalized output handed to the policy evaluator.
///
/// `entries` maps each derived field name to its joined token; the evaluator
/// does membership tests on the names, attribute access into claims, and
/// set-membership tests on sequence claims. `total_token_count` counts the
/// original input tokens, not the groups they joined into. Iteration order
/// is the field names' lexicographic order, so structurally identical
/// requests always serialize identically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenCollection {
    pub entries: BTreeMap<String, JoinedToken>,
    pub total_token_count: usize,
}

impl TokenCollection {
    pub fn get(&self, field_name: &str) -> Option<&JoinedToken> {
        self.entries.get(field_name)
    }

    pub fn contains(&self, field_name: &str) -> bool {
        self.entries.contains_key(field_name)
    }
}

/// Name every joined token and assemble the final collection.
///
/// The only failure mode is two distinct group keys reducing to one field
/// name; that aborts assembly entirely, with both keys in the error. No
/// partial collection is ever returned.
pub fn assemble_collection(
    joined: BTreeMap<GroupKey, JoinedToken>,
    total_token_count: usize,
    policy: &FieldNamePolicy,
) -> Result<TokenCollection, CollectionError> {
    let mut entries: BTreeMap<String, JoinedToken> = BTreeMap::new();
    let mut named: BTreeMap<String, GroupKey> = BTreeMap::new();

    for (key, token) in joined {
        let field_name = policy.field_name(&key);
        if let Some(first) = named.get(&field_name) {
            return Err(CollectionError::FieldNameCollision {
                field_name,
                first: first.clone(),
                second: key,
            });
        }
        named.insert(field_name.clone(), key);
        entries.insert(field_name, token);
    }

    debug!(entries = entries.len(), total_token_count, "assembled token collection");
    Ok(TokenCollection {
        entries,
        total_token_count,
    })
}
