use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::entity::TokenEntity;

/// The partition key for joining: exact, case-sensitive issuer and mapping.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GroupKey {
    pub issuer: String,
    pub token_type: String,
}

impl GroupKey {
    pub fn new(issuer: impl Into<String>, token_type: impl Into<String>) -> Self {
        GroupKey {
            issuer: issuer.into(),
            token_type: token_type.into(),
        }
    }

    pub fn of(entity: &TokenEntity) -> Self {
        GroupKey {
            issuer: entity.issuer.clone(),
            token_type: entity.token_type.clone(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.issuer, self.token_type)
    }
}

/// Partition entities by (issuer, token type).
///
/// Single pass; entities keep their original input-array order within each
/// group, which the joining engine relies on for its tie-breaks. Groups
/// iterate in key order so downstream output is order-independent of the
/// input arrangement.
pub fn group_entities(entities: Vec<TokenEntity>) -> BTreeMap<GroupKey, Vec<TokenEntity>> {
    let mut groups: BTreeMap<GroupKey, Vec<TokenEntity>> = BTreeMap::new();
    for entity in entities {
        groups.entry(GroupKey::of(&entity)).or_default().push(entity);
    }
    groups
}
