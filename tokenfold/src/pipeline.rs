use std::collections::BTreeMap;

use chrono::Utc;
use futures::future;
use tracing::{debug, info};

use tokenfold_core::{
    assemble_collection, group_entities, join_group, ExtractedClaims, FieldNamePolicy, GroupKey,
    JoinedToken, TokenCollection, TokenEntity,
};

use crate::error::PipelineError;
use crate::validator::{TokenInput, TokenValidator};

/// The batch normalization pipeline.
///
/// One `Pipeline` is cheap to construct and holds no per-request state; the
/// validator and naming policy are the only configuration. Every invocation
/// of [`Pipeline::build_collection`] is independent, and nothing survives it.
pub struct Pipeline<V> {
    validator: V,
    policy: FieldNamePolicy,
}

impl<V: TokenValidator> Pipeline<V> {
    pub fn new(validator: V) -> Self {
        Pipeline {
            validator,
            policy: FieldNamePolicy::default(),
        }
    }

    /// Replace the default field-naming tables.
    pub fn with_policy(mut self, policy: FieldNamePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Validate, normalize, group, join, and assemble one batch.
    ///
    /// Each input is validated concurrently by the collaborator; results are
    /// collected in original array order, never completion order, which is
    /// what keeps grouping and joining deterministic under any scheduling.
    /// Validation is all-or-nothing: the first failure cancels the remaining
    /// in-flight validations and the whole batch is rejected with that
    /// token's index. Dropping the returned future cancels every in-flight
    /// validation with it.
    ///
    /// An empty batch succeeds with an empty collection.
    pub async fn build_collection(
        &self,
        inputs: &[TokenInput],
    ) -> Result<TokenCollection, PipelineError> {
        debug!(tokens = inputs.len(), "validating token batch");

        let validations = inputs.iter().enumerate().map(|(index, input)| async move {
            self.validator
                .validate(&input.payload)
                .await
                .map_err(|kind| PipelineError::validation(index, kind))?;
            ExtractedClaims::from_payload(&input.payload)
                .map_err(|kind| PipelineError::validation(index, kind))
        });
        let claim_sets = future::try_join_all(validations).await?;

        // Single barrier: one wall-clock timestamp for the whole response.
        let validated_at = Utc::now();

        let entities: Vec<TokenEntity> = inputs
            .iter()
            .zip(claim_sets)
            .map(|(input, claims)| TokenEntity::new(&input.mapping, claims, validated_at))
            .collect();

        let joined: BTreeMap<GroupKey, JoinedToken> = group_entities(entities)
            .into_iter()
            .map(|(key, members)| {
                let token = join_group(&key, members, validated_at);
                (key, token)
            })
            .collect();

        let collection = assemble_collection(joined, inputs.len(), &self.policy)?;
        info!(
            tokens = collection.total_token_count,
            entries = collection.entries.len(),
            "token batch normalized"
        );
        Ok(collection)
    }
}
