//! # Remote Backend
//!
//! The backend boundary served by a hosted REST backend.
//!
//! ## Endpoints (relative to the configured base URL)
//!
//! - `GET  /catalog` - `{categories, subcategories, questions, responseOptions}`
//! - `GET  /evaluations/{scope}/responses` - recorded responses
//! - `PUT  /evaluations/{scope}/responses/{question_id}` - upsert one response
//! - `GET  /evaluations/{scope}/results` - recorded category results
//! - `PUT  /evaluations/{scope}/results/{category_id}` - upsert one result
//! - `POST /catalog/mutations` - apply one catalog mutation
//!
//! Every request carries the configured timeout. Reads and upserts are
//! idempotent and retried with linear backoff; mutations are sent once.

use super::records::{catalog_from_json, responses_from_json};
use crate::config::RemoteConfig;
use arquimetro_core::{
    ArquimetroError, Catalog, CatalogMutation, CategoryId, CategoryScore, EvaluationScope,
    MutationOutcome, QuestionId, ResponseOptionId,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

/// Bounded retry with linearly growing delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub max_retries: u32,
    /// Delay before retry `n` is `backoff * n`.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

fn backend_error(message: impl Into<String>, retryable: bool) -> ArquimetroError {
    ArquimetroError::Backend {
        message: message.into(),
        retryable,
    }
}

/// HTTP client for the hosted backend.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    policy: RetryPolicy,
}

impl RemoteBackend {
    pub fn new(config: &RemoteConfig) -> Result<Self, ArquimetroError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| backend_error(format!("Cannot build HTTP client: {}", e), false))?;
        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            policy: RetryPolicy {
                max_retries: config.max_retries,
                backoff: config.backoff(),
            },
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =========================================================================
    // TRANSPORT
    // =========================================================================

    /// Build a request with optional Bearer auth.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method, &url);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    /// Send one request and map the outcome.
    ///
    /// Connection failures, timeouts, 429 and 5xx are retryable; other
    /// statuses are not. An empty success body reads as `null`.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<Value, ArquimetroError> {
        let resp = req.send().await.map_err(|e| {
            let reason = if e.is_timeout() { "timed out" } else { "unreachable" };
            backend_error(format!("Backend {} ({}): {}", reason, self.base_url, e), true)
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let retryable =
                status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS;
            return Err(backend_error(
                format!("Backend returned {}: {}", status.as_u16(), body.trim()),
                retryable,
            ));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| backend_error(format!("Backend response interrupted: {}", e), true))?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes)
            .map_err(|e| backend_error(format!("Backend sent invalid JSON: {}", e), false))
    }

    /// Run `call` until it succeeds, fails permanently, or retries run out.
    async fn with_retry<F, Fut>(&self, operation: &str, mut call: F) -> Result<Value, ArquimetroError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Value, ArquimetroError>>,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Err(e) if e.is_retryable() && attempt < self.policy.max_retries => {
                    attempt += 1;
                    let delay = self.policy.delay(attempt);
                    tracing::warn!(
                        event = "backend_retry",
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Backend call failed, retrying: {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    pub async fn fetch_catalog(&self) -> Result<Catalog, ArquimetroError> {
        let value = self
            .with_retry("fetch_catalog", || {
                self.send(self.request(reqwest::Method::GET, "/catalog"))
            })
            .await?;
        catalog_from_json(&value)
    }

    pub async fn fetch_user_responses(
        &self,
        scope: &EvaluationScope,
    ) -> Result<BTreeMap<QuestionId, ResponseOptionId>, ArquimetroError> {
        let path = format!("/evaluations/{}/responses", scope);
        let value = self
            .with_retry("fetch_user_responses", || {
                self.send(self.request(reqwest::Method::GET, &path))
            })
            .await?;
        responses_from_json(&value)
    }

    pub async fn upsert_response(
        &self,
        scope: &EvaluationScope,
        question: QuestionId,
        option: ResponseOptionId,
    ) -> Result<(), ArquimetroError> {
        let path = format!("/evaluations/{}/responses/{}", scope, question);
        let body = serde_json::json!({
            "question_id": question,
            "response_option_id": option,
        });
        self.with_retry("upsert_response", || {
            self.send(self.request(reqwest::Method::PUT, &path).json(&body))
        })
        .await?;
        Ok(())
    }

    pub async fn upsert_category_result(
        &self,
        scope: &EvaluationScope,
        category: CategoryId,
        score: &CategoryScore,
    ) -> Result<(), ArquimetroError> {
        let path = format!("/evaluations/{}/results/{}", scope, category);
        self.with_retry("upsert_category_result", || {
            self.send(self.request(reqwest::Method::PUT, &path).json(score))
        })
        .await?;
        Ok(())
    }

    pub async fn category_results(
        &self,
        scope: &EvaluationScope,
    ) -> Result<BTreeMap<CategoryId, CategoryScore>, ArquimetroError> {
        let path = format!("/evaluations/{}/results", scope);
        let value = self
            .with_retry("category_results", || {
                self.send(self.request(reqwest::Method::GET, &path))
            })
            .await?;
        if value.is_null() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_value(value).map_err(|e| {
            ArquimetroError::DeserializationError(format!("Invalid category results: {}", e))
        })
    }

    /// Apply one mutation. Sent once: creates are not idempotent.
    pub async fn apply_mutation(
        &self,
        mutation: CatalogMutation,
    ) -> Result<MutationOutcome, ArquimetroError> {
        mutation.validate()?;
        let value = self
            .send(
                self.request(reqwest::Method::POST, "/catalog/mutations")
                    .json(&mutation),
            )
            .await?;
        serde_json::from_value(value).map_err(|e| {
            ArquimetroError::DeserializationError(format!("Invalid mutation outcome: {}", e))
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
