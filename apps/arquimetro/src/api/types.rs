//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use arquimetro_core::{
    ArquimetroError, Category, CategoryAssessment, CategoryId, CategoryProgress, CategoryScore,
    EntityRef, Evaluation, EvaluationScope, Navigation, OverallProgress, QuestionId,
    ResponseOption, ResponseOptionId, Selection,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Catalog and server status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub backend: String,
    pub categories: usize,
    pub subcategories: usize,
    pub questions: usize,
    pub response_options: usize,
    pub active_sessions: usize,
}

// =============================================================================
// EVALUATION REQUESTS
// =============================================================================

/// Start (or resume) the assessment of one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRequest {
    pub category_id: CategoryId,
}

/// Select a response for one question of the active evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectRequest {
    pub question_id: QuestionId,
    pub response_option_id: ResponseOptionId,
}

// =============================================================================
// EVALUATION RESPONSES
// =============================================================================

/// The question under the cursor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: QuestionId,
    pub text: String,
    pub subcategory: String,
    pub options: Vec<ResponseOption>,
    pub selected: Option<ResponseOptionId>,
}

/// Snapshot of the active evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationView {
    pub category_id: CategoryId,
    pub current_index: usize,
    pub total_questions: usize,
    pub answered: usize,
    pub is_complete: bool,
    pub is_finished: bool,
    pub current_question: Option<QuestionView>,
}

impl EvaluationView {
    pub fn from_evaluation(evaluation: &Evaluation) -> Self {
        let current_question = evaluation.current_question().map(|q| QuestionView {
            id: q.id(),
            text: q.question.text.clone(),
            subcategory: q.subcategory_title.clone(),
            options: q.options.clone(),
            selected: evaluation.selected(q.id()),
        });
        Self {
            category_id: evaluation.category_id(),
            current_index: evaluation.current_index(),
            total_questions: evaluation.total_questions(),
            answered: evaluation.answered_count(),
            is_complete: evaluation.is_complete(),
            is_finished: evaluation.is_finished(),
            current_question,
        }
    }
}

/// Response to a persisted selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectResponse {
    pub selection: Selection,
    pub evaluation: EvaluationView,
}

/// Response to a navigation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResponse {
    pub navigation: Navigation,
    pub evaluation: EvaluationView,
    /// Category result, present once the evaluation is finished.
    pub result: Option<CategoryScore>,
}

/// One answer not yet confirmed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingResponse {
    pub question_id: QuestionId,
    pub response_option_id: ResponseOptionId,
}

/// Result of pushing unsynced answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResponse {
    pub synced: usize,
    pub pending: Vec<PendingResponse>,
}

/// One category on the overview screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryOverview {
    pub category: Category,
    pub assessment: CategoryAssessment,
    pub progress: CategoryProgress,
}

/// Overview of every category for one scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewResponse {
    pub scope: EvaluationScope,
    pub overall: OverallProgress,
    pub categories: Vec<CategoryOverview>,
    pub active_category: Option<CategoryId>,
    pub pending: usize,
}

// =============================================================================
// QUERY PARAMETERS
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    /// `json` (default) or `text`.
    pub format: Option<String>,
}

// =============================================================================
// EXPORT / HASH RESPONSES
// =============================================================================

/// Canonical catalog export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResponse {
    /// Base64-encoded canonical bytes.
    pub data: String,
    pub size: usize,
    pub checksum: u64,
}

impl ExportResponse {
    pub fn new(data: &[u8], checksum: u64) -> Self {
        Self {
            data: base64::Engine::encode(&base64::engine::general_purpose::STANDARD, data),
            size: data.len(),
            checksum,
        }
    }
}

/// Catalog hash response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashResponse {
    pub algorithm: String,
    pub hash: String,
    pub checksum: u64,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Error body returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
    pub retryable: bool,
    pub field: Option<String>,
    pub entity: Option<EntityRef>,
}

/// An `ArquimetroError` rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub ArquimetroError);

impl From<ArquimetroError> for ApiError {
    fn from(e: ArquimetroError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ArquimetroError::Validation { .. } | ArquimetroError::DeserializationError(_) => {
                StatusCode::BAD_REQUEST
            }
            ArquimetroError::NotFound(_) => StatusCode::NOT_FOUND,
            ArquimetroError::EmptyCatalog(_) | ArquimetroError::NoActiveEvaluation => {
                StatusCode::CONFLICT
            }
            ArquimetroError::Backend { .. } => StatusCode::BAD_GATEWAY,
            ArquimetroError::SerializationError(_) | ArquimetroError::IoError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn kind(&self) -> &'static str {
        match &self.0 {
            ArquimetroError::Validation { .. } => "validation",
            ArquimetroError::NotFound(_) => "not_found",
            ArquimetroError::EmptyCatalog(_) => "empty_catalog",
            ArquimetroError::NoActiveEvaluation => "no_active_evaluation",
            ArquimetroError::Backend { .. } => "backend",
            ArquimetroError::SerializationError(_) => "serialization",
            ArquimetroError::DeserializationError(_) => "deserialization",
            ArquimetroError::IoError(_) => "io",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), "Request failed: {}", self.0);
        }
        let body = ErrorResponse {
            error: self.0.to_string(),
            kind: self.kind().to_string(),
            retryable: self.0.is_retryable(),
            field: match &self.0 {
                ArquimetroError::Validation { field, .. } => Some((*field).to_string()),
                _ => None,
            },
            entity: match &self.0 {
                ArquimetroError::NotFound(entity) => Some(*entity),
                _ => None,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Handler result type.
pub type ApiResult<T> = Result<Json<T>, ApiError>;
