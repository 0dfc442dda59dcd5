//! # Tokenfold Core
//!
//! Deterministic normalization core for batches of validated JWTs.
//!
//! This crate converts heterogeneous, schema-less claim sets into a uniform
//! entity model, joins tokens sharing an issuer and mapping into one entity
//! per group, and assembles the result into a policy-queryable
//! [`TokenCollection`]. It has no networking dependencies and performs no
//! cryptography; signature, expiry, and revocation checks belong to the
//! validation collaborator wired in by the `tokenfold` facade crate.
//!
//! ## Guarantees
//!
//! - Every claim survives verbatim: no renaming, dropping, or reinterpretation
//! - Joining is commutative: permuting the input token array never changes
//!   the collection, its field names, or the joined ids
//! - Field names are unique by construction; a collision is a hard error,
//!   never a silent overwrite
//! - Nothing outlives one invocation: no caches, no shared state
//!
//! ## Usage
//!
//! ```
//! use tokenfold_core::{
//!     assemble_collection, group_entities, join_group, ExtractedClaims,
//!     FieldNamePolicy, TokenEntity,
//! };
//! use chrono::Utc;
//!
//! # fn main() -> Result<(), tokenfold_core::CollectionError> {
//! let payload = "eyJhbGciOiJub25lIn0.eyJpc3MiOiJpZHAuZG9scGhpbi5zZWEifQ.x";
//! let claims = ExtractedClaims::from_payload(payload).expect("decodable payload");
//!
//! let validated_at = Utc::now();
//! let entities = vec![TokenEntity::new("Jans::Access_Token", claims, validated_at)];
//!
//! let joined = group_entities(entities)
//!     .into_iter()
//!     .map(|(key, members)| {
//!         let token = join_group(&key, members, validated_at);
//!         (key, token)
//!     })
//!     .collect();
//!
//! let collection = assemble_collection(joined, 1, &FieldNamePolicy::default())?;
//! assert!(collection.contains("dolphin_sea_access_token"));
//! # Ok(())
//! # }
//! ```

mod claims;
mod collection;
mod entity;
mod error;
mod field_name;
mod group;
mod join;

pub use claims::ExtractedClaims;
pub use collection::{assemble_collection, TokenCollection};
pub use entity::TokenEntity;
pub use error::{CollectionError, ValidationErrorKind};
pub use field_name::FieldNamePolicy;
pub use group::{group_entities, GroupKey};
pub use join::{join_group, JoinedToken};
