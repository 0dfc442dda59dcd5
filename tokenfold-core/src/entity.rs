use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::claims::ExtractedClaims;

/// One validated token, normalized into the uniform entity model.
///
/// Entities exist only for the lifetime of a single pipeline invocation;
/// nothing is persisted or shared across requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenEntity {
    /// Stable identifier: the token's `jti` when present, otherwise a
    /// digest of issuer, mapping, and the full claim set.
    pub id: String,
    /// The caller-declared mapping string, verbatim (e.g. `Jans::Access_Token`).
    pub token_type: String,
    /// The token's `iss` claim.
    pub issuer: String,
    /// Every claim from the payload, untouched.
    pub claims: ExtractedClaims,
    /// When the batch this entity belongs to finished validating.
    pub validated_at: DateTime<Utc>,
}

impl TokenEntity {
    /// Wrap one extracted claim set into an entity.
    ///
    /// Pure and infallible: validation failures are caught upstream, and the
    /// extractor guarantees a string `iss` claim is present.
    pub fn new(mapping: &str, claims: ExtractedClaims, validated_at: DateTime<Utc>) -> Self {
        let issuer = claims
            .issuer()
            .unwrap_or_default()
            .to_string();
        let id = match claims.token_id() {
            Some(jti) => jti.to_string(),
            None => derived_entity_id(&issuer, mapping, &claims),
        };
        TokenEntity {
            id,
            token_type: mapping.to_string(),
            issuer,
            claims,
            validated_at,
        }
    }
}

/// Digest-based id for tokens without a `jti` claim.
///
/// Hashes issuer, mapping, and the claim set with top-level keys sorted, so
/// re-processing identical input always reproduces the same id.
fn derived_entity_id(issuer: &str, mapping: &str, claims: &ExtractedClaims) -> String {
    let mut hasher = Sha256::new();
    hasher.update(issuer.as_bytes());
    hasher.update([0u8]);
    hasher.update(mapping.as_bytes());
    hasher.update([0u8]);

    let mut keys: Vec<&String> = claims.iter().map(|(key, _)| key).collect();
    keys.sort_unstable();
    for key in keys {
        hasher.update(key.as_bytes());
        hasher.update([0u8]);
        // Claim values hash via their JSON text; object key order inside a
        // value is the payload's own order, which identical input repeats.
        if let Some(value) = claims.get(key) {
            hasher.update(value.to_string().as_bytes());
            hasher.update([0u8]);
        }
    }

    format!("tf_{}", hex::encode(hasher.finalize()))
}
