use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::trace;

use crate::claims::ExtractedClaims;
use crate::entity::TokenEntity;
use crate::group::GroupKey;

/// The single entity produced by merging every token in one group.
pub type JoinedToken = TokenEntity;

/// Merge one group of entities into a single joined token.
///
/// Members must all share `key`'s issuer and token type, in their original
/// input-array order; grouping guarantees both. Merge rules per claim, over
/// the union of keys present in any member, in first-seen key order:
///
/// * `exp` (all integers): maximum — the join stays valid as long as any
///   constituent is.
/// * `iat` (all integers): minimum — earliest issued time.
/// * every occurrence an array: set union, de-duplicated, first-seen element
///   order scanning members in group order.
/// * anything else (identical scalars, conflicting scalars, mixed shapes):
///   the earliest member's value wins.
///
/// A singleton group joins to a byte-equivalent copy of its sole member,
/// id included. Larger groups get an id hashed over the *sorted* member
/// ids, so the joined identity is invariant under input permutation.
pub fn join_group(
    key: &GroupKey,
    members: Vec<TokenEntity>,
    validated_at: DateTime<Utc>,
) -> JoinedToken {
    debug_assert!(!members.is_empty(), "grouping never emits an empty group");

    if members.len() == 1 {
        let mut sole = members.into_iter().next().unwrap();
        sole.validated_at = validated_at;
        return sole;
    }

    trace!(issuer = %key.issuer, token_type = %key.token_type, members = members.len(), "joining group");

    let mut merged: Map<String, Value> = Map::new();
    for member in &members {
        for (claim, _) in member.claims.iter() {
            if merged.contains_key(claim) {
                continue;
            }
            let occurrences: Vec<&Value> = members
                .iter()
                .filter_map(|m| m.claims.get(claim))
                .collect();
            merged.insert(claim.clone(), merge_claim(claim, &occurrences));
        }
    }

    JoinedToken {
        id: joined_id(&members),
        token_type: key.token_type.clone(),
        issuer: key.issuer.clone(),
        claims: ExtractedClaims::from_map_unchecked(merged),
        validated_at,
    }
}

fn merge_claim(claim: &str, occurrences: &[&Value]) -> Value {
    let as_integers: Option<Vec<i64>> = occurrences.iter().map(|v| v.as_i64()).collect();
    if let Some(timestamps) = as_integers {
        match claim {
            // Latest expiration and earliest issuance win.
            "exp" => return Value::from(timestamps.into_iter().max().unwrap_or_default()),
            "iat" => return Value::from(timestamps.into_iter().min().unwrap_or_default()),
            _ => {}
        }
    }

    if occurrences.iter().all(|v| v.is_array()) {
        let mut union: Vec<Value> = Vec::new();
        for occurrence in occurrences {
            for element in occurrence.as_array().into_iter().flatten() {
                if !union.contains(element) {
                    union.push(element.clone());
                }
            }
        }
        return Value::Array(union);
    }

    // Identical values, conflicting scalars, and mixed shapes all resolve
    // to first-occurrence precedence in group order.
    (*occurrences.first().expect("claim occurs in at least one member")).clone()
}

/// Identity of a multi-member join: digest of the sorted constituent ids.
///
/// Sorting removes the dependence on group order, so permuting the input
/// token array never changes the joined id.
fn joined_id(members: &[TokenEntity]) -> String {
    let mut ids: Vec<&str> = members.iter().map(|m| m.id.as_str()).collect();
    ids.sort_unstable();

    let mut hasher = Sha256::new();
    for id in ids {
        hasher.update(id.as_bytes());
        hasher.update([0u8]);
    }
    format!("tfj_{}", hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entity(mapping: &str, claims: Value) -> TokenEntity {
        let map = claims.as_object().unwrap().clone();
        TokenEntity::new(
            mapping,
            ExtractedClaims::from_map(map).unwrap(),
            Utc::now(),
        )
    }

    fn dolphin_key() -> GroupKey {
        GroupKey::new("idp.dolphin.sea", "Jans::Access_Token")
    }

    #[test]
    fn test_singleton_join_is_identity() {
        let member = entity(
            "Jans::Access_Token",
            json!({"iss": "idp.dolphin.sea", "jti": "t1", "scope": ["read"], "n": 7}),
        );
        let expected_claims = member.claims.clone();
        let now = Utc::now();

        let joined = join_group(&dolphin_key(), vec![member], now);
        assert_eq!(joined.id, "t1");
        assert_eq!(joined.claims, expected_claims);
        assert_eq!(joined.validated_at, now);
    }

    #[test]
    fn test_sequence_claims_union_in_first_seen_order() {
        let a = entity(
            "Jans::Access_Token",
            json!({"iss": "idp.dolphin.sea", "scope": ["read:profile", "openid"]}),
        );
        let b = entity(
            "Jans::Access_Token",
            json!({"iss": "idp.dolphin.sea", "scope": ["write:calendar", "openid"]}),
        );

        let joined = join_group(&dolphin_key(), vec![a, b], Utc::now());
        assert_eq!(
            joined.claims.get("scope"),
            Some(&json!(["read:profile", "openid", "write:calendar"]))
        );
    }

    #[test]
    fn test_exp_takes_max_and_iat_takes_min() {
        let a = entity(
            "Jans::Access_Token",
            json!({"iss": "idp.dolphin.sea", "exp": 1709856000, "iat": 1709852400}),
        );
        let b = entity(
            "Jans::Access_Token",
            json!({"iss": "idp.dolphin.sea", "exp": 1709859600, "iat": 1709848800}),
        );

        let joined = join_group(&dolphin_key(), vec![a, b], Utc::now());
        assert_eq!(joined.claims.get("exp"), Some(&json!(1709859600)));
        assert_eq!(joined.claims.get("iat"), Some(&json!(1709848800)));
    }

    #[test]
    fn test_scalar_conflict_first_occurrence_wins() {
        let a = entity(
            "Jans::Access_Token",
            json!({"iss": "idp.dolphin.sea", "location": "miami"}),
        );
        let b = entity(
            "Jans::Access_Token",
            json!({"iss": "idp.dolphin.sea", "location": "havana"}),
        );

        let joined = join_group(&dolphin_key(), vec![a, b], Utc::now());
        assert_eq!(joined.claims.get("location"), Some(&json!("miami")));
    }

    #[test]
    fn test_mixed_shape_claim_falls_back_to_first_occurrence() {
        let a = entity(
            "Jans::Access_Token",
            json!({"iss": "idp.dolphin.sea", "aud": "app-1"}),
        );
        let b = entity(
            "Jans::Access_Token",
            json!({"iss": "idp.dolphin.sea", "aud": ["app-1", "app-2"]}),
        );

        let joined = join_group(&dolphin_key(), vec![a, b], Utc::now());
        assert_eq!(joined.claims.get("aud"), Some(&json!("app-1")));
    }

    #[test]
    fn test_claim_in_single_member_copies_through() {
        let a = entity("Jans::Access_Token", json!({"iss": "idp.dolphin.sea"}));
        let b = entity(
            "Jans::Access_Token",
            json!({"iss": "idp.dolphin.sea", "device": {"os": "ios"}}),
        );

        let joined = join_group(&dolphin_key(), vec![a, b], Utc::now());
        assert_eq!(joined.claims.get("device"), Some(&json!({"os": "ios"})));
    }

    #[test]
    fn test_joined_id_invariant_under_member_permutation() {
        let a = entity(
            "Jans::Access_Token",
            json!({"iss": "idp.dolphin.sea", "jti": "aaa"}),
        );
        let b = entity(
            "Jans::Access_Token",
            json!({"iss": "idp.dolphin.sea", "jti": "bbb"}),
        );
        let now = Utc::now();

        let forward = join_group(&dolphin_key(), vec![a.clone(), b.clone()], now);
        let reverse = join_group(&dolphin_key(), vec![b, a], now);
        assert!(forward.id.starts_with("tfj_"));
        assert_eq!(forward.id, reverse.id);
    }

    #[test]
    fn test_union_of_keys_keeps_first_seen_key_order() {
        let a = entity(
            "Jans::Access_Token",
            json!({"iss": "idp.dolphin.sea", "alpha": 1}),
        );
        let b = entity(
            "Jans::Access_Token",
            json!({"iss": "idp.dolphin.sea", "beta": 2, "alpha": 1}),
        );

        let joined = join_group(&dolphin_key(), vec![a, b], Utc::now());
        let keys: Vec<&String> = joined.claims.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["iss", "alpha", "beta"]);
    }
}
