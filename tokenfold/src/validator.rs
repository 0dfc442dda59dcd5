use chrono::Utc;
use serde::{Deserialize, Serialize};

use tokenfold_core::{ExtractedClaims, ValidationErrorKind};

/// One token as supplied by the caller: an opaque payload string plus its
/// declared type mapping (e.g. `Jans::Access_Token`, `Acme::DolphinToken`).
/// Mappings are arbitrary namespaced identifiers; there is no registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInput {
    pub mapping: String,
    pub payload: String,
}

impl TokenInput {
    pub fn new(mapping: impl Into<String>, payload: impl Into<String>) -> Self {
        TokenInput {
            mapping: mapping.into(),
            payload: payload.into(),
        }
    }
}

/// The external validation collaborator seam.
///
/// Implementations own signature verification, expiry/not-before checks, and
/// revocation lookups (which may involve network I/O for keys or status).
/// The pipeline calls `validate` once per token, concurrently, and only
/// decodes claims after a success. Implementations must be side-effect free
/// with respect to the pipeline: a failure for one token never depends on
/// the other tokens in the batch.
pub trait TokenValidator {
    fn validate(
        &self,
        payload: &str,
    ) -> impl std::future::Future<Output = Result<(), ValidationErrorKind>> + Send;
}

/// A claims-only validator for development and tests.
///
/// Decodes the payload and enforces `exp` and `nbf` against the current
/// clock, with optional leeway. Performs no signature or revocation checks
/// whatsoever; never wire it to anything that matters.
#[derive(Debug, Clone, Default)]
pub struct UnverifiedValidator {
    leeway_secs: i64,
}

impl UnverifiedValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept clock skew of up to `secs` seconds on `exp` and `nbf`.
    pub fn with_leeway(secs: i64) -> Self {
        UnverifiedValidator { leeway_secs: secs }
    }
}

impl TokenValidator for UnverifiedValidator {
    async fn validate(&self, payload: &str) -> Result<(), ValidationErrorKind> {
        let claims = ExtractedClaims::from_payload(payload)?;
        let now = Utc::now().timestamp();

        if let Some(exp) = claims.get("exp").and_then(|v| v.as_i64()) {
            if exp.saturating_add(self.leeway_secs) < now {
                return Err(ValidationErrorKind::ExpiredToken);
            }
        }
        if let Some(nbf) = claims.get("nbf").and_then(|v| v.as_i64()) {
            if nbf.saturating_sub(self.leeway_secs) > now {
                return Err(ValidationErrorKind::NotYetValid);
            }
        }
        Ok(())
    }
}
