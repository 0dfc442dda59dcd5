use thiserror::Error;

use crate::group::GroupKey;

/// Why a single token failed validation.
///
/// Every kind is fatal to the whole batch: the pipeline never builds a
/// partial collection around a bad token.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    #[error("token has expired")]
    ExpiredToken,

    #[error("token is not yet valid")]
    NotYetValid,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has been revoked")]
    Revoked,

    #[error("token payload is malformed")]
    MalformedPayload,

    #[error("token is missing the 'iss' claim")]
    MissingIssuerClaim,
}

/// Errors raised while assembling the final collection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// Two distinct (issuer, token type) groups reduced to the same
    /// policy-facing field name. Both keys are surfaced for diagnosis;
    /// nothing is ever silently overwritten.
    #[error("field name '{field_name}' generated for both {first} and {second}")]
    FieldNameCollision {
        field_name: String,
        first: GroupKey,
        second: GroupKey,
    },
}
