use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ValidationErrorKind;

/// The decoded claim set of one token, kept verbatim.
///
/// Claims stay exactly as the token carried them: no renaming, no dropping,
/// no semantic reinterpretation. Values are arbitrary JSON shapes (scalar,
/// sequence, or nested record) and keys iterate in payload order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExtractedClaims(Map<String, Value>);

impl ExtractedClaims {
    /// Decode the payload segment of a compact-serialization JWT.
    ///
    /// The caller is expected to have already validated the token through
    /// its validation collaborator; this function only decodes. The payload
    /// must have the `header.payload.signature` shape, a base64url payload
    /// segment, and a JSON object inside it, and must carry a string `iss`
    /// claim (grouping is impossible without one).
    ///
    /// # Errors
    ///
    /// * `MalformedPayload` - wrong segment count, bad base64, or non-object JSON
    /// * `MissingIssuerClaim` - `iss` absent or not a string
    pub fn from_payload(payload: &str) -> Result<Self, ValidationErrorKind> {
        let segments: Vec<&str> = payload.split('.').collect();
        let claims_segment = match segments.as_slice() {
            [_header, claims, _signature] => *claims,
            _ => return Err(ValidationErrorKind::MalformedPayload),
        };

        let claims_bytes = URL_SAFE_NO_PAD
            .decode(claims_segment)
            .map_err(|_| ValidationErrorKind::MalformedPayload)?;

        let claims: Value = serde_json::from_slice(&claims_bytes)
            .map_err(|_| ValidationErrorKind::MalformedPayload)?;

        let map = match claims {
            Value::Object(map) => map,
            _ => return Err(ValidationErrorKind::MalformedPayload),
        };

        let extracted = Self(map);
        if extracted.issuer().is_none() {
            return Err(ValidationErrorKind::MissingIssuerClaim);
        }
        Ok(extracted)
    }

    /// Build a claim set directly from a decoded JSON object.
    ///
    /// Used by validation collaborators that already hold the decoded
    /// payload. The same `iss` requirement applies.
    pub fn from_map(map: Map<String, Value>) -> Result<Self, ValidationErrorKind> {
        let extracted = Self(map);
        if extracted.issuer().is_none() {
            return Err(ValidationErrorKind::MissingIssuerClaim);
        }
        Ok(extracted)
    }

    /// The token's `iss` claim, when present as a string.
    pub fn issuer(&self) -> Option<&str> {
        self.0.get("iss").and_then(Value::as_str)
    }

    /// The token's `jti` claim, when present as a string.
    pub fn token_id(&self) -> Option<&str> {
        self.0.get("jti").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn from_map_unchecked(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encode_payload(claims: &Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap());
        format!("{header}.{body}.sig")
    }

    #[test]
    fn test_decode_preserves_every_claim() {
        let claims = json!({
            "iss": "idp.dolphin.sea",
            "sub": "user123",
            "scope": ["read:profile", "write:calendar"],
            "address": {"city": "miami", "zip": "33101"},
            "exp": 1709856000,
            "active": true,
        });
        let extracted = ExtractedClaims::from_payload(&encode_payload(&claims)).unwrap();

        assert_eq!(extracted.len(), 6);
        assert_eq!(extracted.issuer(), Some("idp.dolphin.sea"));
        assert_eq!(extracted.get("scope"), Some(&json!(["read:profile", "write:calendar"])));
        assert_eq!(extracted.get("address"), Some(&json!({"city": "miami", "zip": "33101"})));
        assert_eq!(extracted.get("exp"), Some(&json!(1709856000)));
        assert_eq!(extracted.get("active"), Some(&json!(true)));
    }

    #[test]
    fn test_decode_keeps_payload_key_order() {
        let claims = json!({"iss": "a.example", "zulu": 1, "alpha": 2});
        let extracted = ExtractedClaims::from_payload(&encode_payload(&claims)).unwrap();
        let keys: Vec<&String> = extracted.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["iss", "zulu", "alpha"]);
    }

    #[test]
    fn test_wrong_segment_count_is_malformed() {
        for payload in ["onlyone", "two.parts", "a.b.c.d"] {
            assert_eq!(
                ExtractedClaims::from_payload(payload),
                Err(ValidationErrorKind::MalformedPayload),
                "payload {payload:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_bad_base64_is_malformed() {
        assert_eq!(
            ExtractedClaims::from_payload("head.!!not-base64!!.sig"),
            Err(ValidationErrorKind::MalformedPayload)
        );
    }

    #[test]
    fn test_non_object_payload_is_malformed() {
        let body = URL_SAFE_NO_PAD.encode(b"[1,2,3]");
        assert_eq!(
            ExtractedClaims::from_payload(&format!("h.{body}.s")),
            Err(ValidationErrorKind::MalformedPayload)
        );
    }

    #[test]
    fn test_missing_issuer_is_fatal() {
        let claims = json!({"sub": "user123"});
        assert_eq!(
            ExtractedClaims::from_payload(&encode_payload(&claims)),
            Err(ValidationErrorKind::MissingIssuerClaim)
        );

        // A non-string iss is just as unusable for grouping.
        let claims = json!({"iss": 42});
        assert_eq!(
            ExtractedClaims::from_payload(&encode_payload(&claims)),
            Err(ValidationErrorKind::MissingIssuerClaim)
        );
    }
}
