//! # Storage
//!
//! Persistent storage for the catalog and per-scope evaluation state.

mod redb_store;

pub use redb_store::RedbStore;

use crate::score::CategoryScore;
use crate::types::{ArquimetroError, CategoryId, EvaluationScope, QuestionId, ResponseOptionId};
use std::collections::BTreeMap;

/// Storage of recorded responses and computed category results.
///
/// Both upserts are idempotent: repeating a call with the same arguments
/// leaves the store unchanged.
pub trait EvaluationStore {
    /// Responses recorded for a scope (empty for an unknown scope).
    fn user_responses(
        &self,
        scope: &EvaluationScope,
    ) -> Result<BTreeMap<QuestionId, ResponseOptionId>, ArquimetroError>;

    /// Record or overwrite the response to one question.
    fn upsert_response(
        &mut self,
        scope: &EvaluationScope,
        question: QuestionId,
        option: ResponseOptionId,
    ) -> Result<(), ArquimetroError>;

    /// Record or overwrite the computed result of one category.
    fn upsert_category_result(
        &mut self,
        scope: &EvaluationScope,
        category: CategoryId,
        score: &CategoryScore,
    ) -> Result<(), ArquimetroError>;

    /// Results recorded for a scope.
    fn category_results(
        &self,
        scope: &EvaluationScope,
    ) -> Result<BTreeMap<CategoryId, CategoryScore>, ArquimetroError>;

    /// Every scope with at least one recorded response.
    fn scopes(&self) -> Result<Vec<EvaluationScope>, ArquimetroError>;
}
