use thiserror::Error;

use tokenfold_core::{CollectionError, ValidationErrorKind};

/// Errors that can abort a pipeline invocation.
///
/// Every variant fails the whole batch; no partial collection is ever
/// observable. Errors carry the failing index and kind but never raw token
/// payload bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// One token failed validation or claim extraction.
    #[error("token at index {index} failed validation: {kind}")]
    Validation {
        index: usize,
        kind: ValidationErrorKind,
    },

    /// Collection assembly failed (field-name collision).
    #[error(transparent)]
    Collection(#[from] CollectionError),
}

impl PipelineError {
    pub(crate) fn validation(index: usize, kind: ValidationErrorKind) -> Self {
        PipelineError::Validation { index, kind }
    }
}
