//! # Tokenfold
//!
//! Deterministic JWT batch normalization for authorization-policy evaluation.
//!
//! Tokenfold takes a batch of bearer tokens with caller-declared type
//! mappings, validates each one through a pluggable collaborator, and folds
//! them into a single [`TokenCollection`]: one joined entity per
//! (issuer, mapping) group, exposed under a stable, human-readable field
//! name that policy authors can rely on.
//!
//! This crate combines functionality from:
//! - `tokenfold-core`: claim extraction, entities, grouping, joining,
//!   field naming, collection assembly
//! - the [`Pipeline`] in this crate: concurrent all-or-nothing validation
//!   and orchestration of the core steps
//!
//! ## Guarantees
//!
//! - **Fail closed**: one bad token rejects the whole batch; no partial
//!   collection is ever observable
//! - **Deterministic**: identical requests always produce identical
//!   collections, regardless of validation scheduling or input order
//! - **Verbatim claims**: nothing is renamed, dropped, or reinterpreted
//!
//! ## Usage
//!
//! ```no_run
//! use tokenfold::{Pipeline, TokenInput, UnverifiedValidator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tokenfold::PipelineError> {
//!     let pipeline = Pipeline::new(UnverifiedValidator::new());
//!
//!     let inputs = vec![
//!         TokenInput::new("Jans::Access_Token", "HEADER.PAYLOAD.SIGNATURE"),
//!         TokenInput::new("Jans::Id_Token", "HEADER.PAYLOAD.SIGNATURE"),
//!     ];
//!
//!     let collection = pipeline.build_collection(&inputs).await?;
//!     if let Some(token) = collection.get("dolphin_sea_access_token") {
//!         println!("scopes: {:?}", token.claims.get("scope"));
//!     }
//!     Ok(())
//! }
//! ```

mod error;
mod pipeline;
mod validator;

pub use error::PipelineError;
pub use pipeline::Pipeline;
pub use validator::{TokenInput, TokenValidator, UnverifiedValidator};

// Re-export the core model so callers need only this crate.
pub use tokenfold_core::{
    assemble_collection,
    group_entities,
    join_group,
    CollectionError,
    ExtractedClaims,
    FieldNamePolicy,
    GroupKey,
    JoinedToken,
    TokenCollection,
    TokenEntity,
    ValidationErrorKind,
};
