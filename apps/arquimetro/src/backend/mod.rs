//! # Backend Boundary
//!
//! Where the catalog and recorded evaluations live. The server talks to one
//! `Backend`, either the embedded redb store or a hosted REST backend.
//!
//! Every operation is asynchronous and returns a `Result`; callers handle
//! both branches. Failures of the hosted backend surface as
//! `ArquimetroError::Backend` with a `retryable` flag.

mod local;
pub mod records;
mod remote;

pub use local::LocalBackend;
pub use remote::{RemoteBackend, RetryPolicy};

use crate::config::Config;
use arquimetro_core::{
    ArquimetroError, Catalog, CatalogMutation, CategoryId, CategoryScore, EvaluationScope,
    MutationOutcome, QuestionId, ResponseOptionId,
};
use std::collections::BTreeMap;
use std::path::Path;

/// The backend in use.
#[derive(Debug, Clone)]
pub enum Backend {
    Local(LocalBackend),
    Remote(RemoteBackend),
}

impl Backend {
    /// The hosted backend when configured, the redb store at `database`
    /// otherwise.
    pub fn from_config(config: &Config, database: &Path) -> Result<Self, ArquimetroError> {
        match config.remote() {
            Some(remote) => {
                tracing::info!("Using remote backend at {}", remote.url);
                Ok(Backend::Remote(RemoteBackend::new(remote)?))
            }
            None => {
                tracing::info!("Using local backend at {:?}", database);
                Ok(Backend::Local(LocalBackend::open(database)?))
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Backend::Local(_) => "local",
            Backend::Remote(_) => "remote",
        }
    }

    pub async fn fetch_catalog(&self) -> Result<Catalog, ArquimetroError> {
        match self {
            Backend::Local(b) => b.fetch_catalog().await,
            Backend::Remote(b) => b.fetch_catalog().await,
        }
    }

    pub async fn fetch_user_responses(
        &self,
        scope: &EvaluationScope,
    ) -> Result<BTreeMap<QuestionId, ResponseOptionId>, ArquimetroError> {
        match self {
            Backend::Local(b) => b.fetch_user_responses(scope).await,
            Backend::Remote(b) => b.fetch_user_responses(scope).await,
        }
    }

    pub async fn upsert_response(
        &self,
        scope: &EvaluationScope,
        question: QuestionId,
        option: ResponseOptionId,
    ) -> Result<(), ArquimetroError> {
        match self {
            Backend::Local(b) => b.upsert_response(scope, question, option).await,
            Backend::Remote(b) => b.upsert_response(scope, question, option).await,
        }
    }

    pub async fn upsert_category_result(
        &self,
        scope: &EvaluationScope,
        category: CategoryId,
        score: &CategoryScore,
    ) -> Result<(), ArquimetroError> {
        match self {
            Backend::Local(b) => b.upsert_category_result(scope, category, score).await,
            Backend::Remote(b) => b.upsert_category_result(scope, category, score).await,
        }
    }

    pub async fn category_results(
        &self,
        scope: &EvaluationScope,
    ) -> Result<BTreeMap<CategoryId, CategoryScore>, ArquimetroError> {
        match self {
            Backend::Local(b) => b.category_results(scope).await,
            Backend::Remote(b) => b.category_results(scope).await,
        }
    }

    pub async fn apply_mutation(
        &self,
        mutation: CatalogMutation,
    ) -> Result<MutationOutcome, ArquimetroError> {
        match self {
            Backend::Local(b) => b.apply_mutation(mutation).await,
            Backend::Remote(b) => b.apply_mutation(mutation).await,
        }
    }
}
