//! # Local Backend
//!
//! The backend boundary served by an embedded redb store.

use arquimetro_core::{
    ArquimetroError, Catalog, CatalogMutation, CatalogStore, CategoryId, CategoryScore,
    EvaluationScope, EvaluationStore, MutationOutcome, QuestionId, RedbStore, ResponseOptionId,
};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared handle to a `RedbStore`.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    store: Arc<RwLock<RedbStore>>,
}

impl LocalBackend {
    pub fn new(store: RedbStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    pub fn open(path: &Path) -> Result<Self, ArquimetroError> {
        Ok(Self::new(RedbStore::open(path)?))
    }

    /// A store that lives only in memory.
    pub fn in_memory() -> Result<Self, ArquimetroError> {
        Ok(Self::new(RedbStore::in_memory()?))
    }

    pub async fn fetch_catalog(&self) -> Result<Catalog, ArquimetroError> {
        self.store.read().await.snapshot()
    }

    pub async fn fetch_user_responses(
        &self,
        scope: &EvaluationScope,
    ) -> Result<BTreeMap<QuestionId, ResponseOptionId>, ArquimetroError> {
        self.store.read().await.user_responses(scope)
    }

    pub async fn upsert_response(
        &self,
        scope: &EvaluationScope,
        question: QuestionId,
        option: ResponseOptionId,
    ) -> Result<(), ArquimetroError> {
        self.store
            .write()
            .await
            .upsert_response(scope, question, option)
    }

    pub async fn upsert_category_result(
        &self,
        scope: &EvaluationScope,
        category: CategoryId,
        score: &CategoryScore,
    ) -> Result<(), ArquimetroError> {
        self.store
            .write()
            .await
            .upsert_category_result(scope, category, score)
    }

    pub async fn category_results(
        &self,
        scope: &EvaluationScope,
    ) -> Result<BTreeMap<CategoryId, CategoryScore>, ArquimetroError> {
        self.store.read().await.category_results(scope)
    }

    pub async fn apply_mutation(
        &self,
        mutation: CatalogMutation,
    ) -> Result<MutationOutcome, ArquimetroError> {
        self.store.write().await.apply_mutation(mutation)
    }
}
