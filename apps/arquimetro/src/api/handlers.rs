//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Evaluation handlers apply every change to the scope's in-memory
//! `AssessmentSession` first and only then call the backend. A failed
//! backend call returns 502 and leaves the answer in the session, listed as
//! pending until `POST /evaluations/{scope}/sync` succeeds.

use super::{
    AppState,
    types::{
        ApiError, ApiResult, CategoryOverview, EvaluationView, ExportResponse, HashResponse,
        HealthResponse, LimitQuery, NavigationResponse, OverviewResponse, PendingResponse,
        ReportQuery, SelectRequest, SelectResponse, StartRequest, StatusResponse, SyncResponse,
    },
};
use crate::notify::{Notification, Severity};
use arquimetro_core::{
    ArquimetroError, AssessmentReport, AssessmentSession, Catalog, CatalogMutation, CatalogParts,
    CatalogStore, Category, CategoryAssessment, CategoryDraft, CategoryId, CategoryScore,
    EntityRef, EvaluationScope, MutationOutcome, Navigation, OverallProgress, Question,
    QuestionDraft, QuestionId, ResponseOption, ResponseOptionDraft, ResponseOptionId,
    Subcategory, SubcategoryDraft, SubcategoryId,
    export::{canonical_checksum, canonical_crypto_hash, export_canonical},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::collections::BTreeMap;

/// Default number of notifications returned.
const DEFAULT_NOTIFICATION_LIMIT: usize = 20;

// =============================================================================
// HEALTH / STATUS HANDLERS
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

/// Catalog counts and server state.
pub async fn status_handler(State(state): State<AppState>) -> ApiResult<StatusResponse> {
    let catalog = state.backend.fetch_catalog().await?;
    let stats = catalog.stats();
    let active_sessions = state.sessions.read().await.len();

    Ok(Json(StatusResponse {
        backend: state.backend.kind().to_string(),
        categories: stats.categories,
        subcategories: stats.subcategories,
        questions: stats.questions,
        response_options: stats.response_options,
        active_sessions,
    }))
}

// =============================================================================
// CATALOG READ HANDLERS
// =============================================================================

/// Every catalog record, ordered by id.
pub async fn catalog_handler(State(state): State<AppState>) -> ApiResult<CatalogParts> {
    let catalog = state.backend.fetch_catalog().await?;
    Ok(Json(catalog.to_parts()))
}

pub async fn list_categories_handler(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    let catalog = state.backend.fetch_catalog().await?;
    Ok(Json(catalog.list_categories()?))
}

pub async fn get_category_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Category> {
    let catalog = state.backend.fetch_catalog().await?;
    let id = CategoryId(id);
    found(catalog.get_category(id)?, EntityRef::Category(id))
}

pub async fn list_subcategories_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Vec<Subcategory>> {
    let catalog = state.backend.fetch_catalog().await?;
    let id = CategoryId(id);
    require(catalog.get_category(id)?, EntityRef::Category(id))?;
    Ok(Json(catalog.list_subcategories(id)?))
}

pub async fn get_subcategory_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Subcategory> {
    let catalog = state.backend.fetch_catalog().await?;
    let id = SubcategoryId(id);
    found(catalog.get_subcategory(id)?, EntityRef::Subcategory(id))
}

pub async fn list_questions_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Vec<Question>> {
    let catalog = state.backend.fetch_catalog().await?;
    let id = SubcategoryId(id);
    require(catalog.get_subcategory(id)?, EntityRef::Subcategory(id))?;
    Ok(Json(catalog.list_questions(id)?))
}

pub async fn get_question_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Question> {
    let catalog = state.backend.fetch_catalog().await?;
    let id = QuestionId(id);
    found(catalog.get_question(id)?, EntityRef::Question(id))
}

pub async fn list_options_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Vec<ResponseOption>> {
    let catalog = state.backend.fetch_catalog().await?;
    let id = QuestionId(id);
    require(catalog.get_question(id)?, EntityRef::Question(id))?;
    Ok(Json(catalog.list_response_options(id)?))
}

pub async fn get_option_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<ResponseOption> {
    let catalog = state.backend.fetch_catalog().await?;
    let id = ResponseOptionId(id);
    found(catalog.get_response_option(id)?, EntityRef::ResponseOption(id))
}

fn found<T>(record: Option<T>, entity: EntityRef) -> ApiResult<T> {
    record
        .map(Json)
        .ok_or(ApiError(ArquimetroError::NotFound(entity)))
}

/// Fail with `NotFound` when a parent record is missing.
fn require<T>(record: Option<T>, entity: EntityRef) -> Result<(), ApiError> {
    match record {
        Some(_) => Ok(()),
        None => Err(ApiError(ArquimetroError::NotFound(entity))),
    }
}

// =============================================================================
// CATALOG WRITE HANDLERS
// =============================================================================

/// Apply any catalog mutation.
pub async fn mutation_handler(
    State(state): State<AppState>,
    Json(mutation): Json<CatalogMutation>,
) -> ApiResult<MutationOutcome> {
    apply_mutation(&state, mutation).await
}

pub async fn create_category_handler(
    State(state): State<AppState>,
    Json(draft): Json<CategoryDraft>,
) -> ApiResult<MutationOutcome> {
    apply_mutation(&state, CatalogMutation::CreateCategory { draft }).await
}

pub async fn update_category_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(draft): Json<CategoryDraft>,
) -> ApiResult<MutationOutcome> {
    let id = CategoryId(id);
    apply_mutation(&state, CatalogMutation::UpdateCategory { id, draft }).await
}

pub async fn delete_category_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<MutationOutcome> {
    let id = CategoryId(id);
    apply_mutation(&state, CatalogMutation::DeleteCategory { id }).await
}

pub async fn create_subcategory_handler(
    State(state): State<AppState>,
    Json(draft): Json<SubcategoryDraft>,
) -> ApiResult<MutationOutcome> {
    apply_mutation(&state, CatalogMutation::CreateSubcategory { draft }).await
}

pub async fn update_subcategory_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(draft): Json<SubcategoryDraft>,
) -> ApiResult<MutationOutcome> {
    let id = SubcategoryId(id);
    apply_mutation(&state, CatalogMutation::UpdateSubcategory { id, draft }).await
}

pub async fn delete_subcategory_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<MutationOutcome> {
    let id = SubcategoryId(id);
    apply_mutation(&state, CatalogMutation::DeleteSubcategory { id }).await
}

pub async fn create_question_handler(
    State(state): State<AppState>,
    Json(draft): Json<QuestionDraft>,
) -> ApiResult<MutationOutcome> {
    apply_mutation(&state, CatalogMutation::CreateQuestion { draft }).await
}

pub async fn update_question_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(draft): Json<QuestionDraft>,
) -> ApiResult<MutationOutcome> {
    let id = QuestionId(id);
    apply_mutation(&state, CatalogMutation::UpdateQuestion { id, draft }).await
}

pub async fn delete_question_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<MutationOutcome> {
    let id = QuestionId(id);
    apply_mutation(&state, CatalogMutation::DeleteQuestion { id }).await
}

pub async fn create_option_handler(
    State(state): State<AppState>,
    Json(draft): Json<ResponseOptionDraft>,
) -> ApiResult<MutationOutcome> {
    apply_mutation(&state, CatalogMutation::CreateResponseOption { draft }).await
}

pub async fn update_option_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(draft): Json<ResponseOptionDraft>,
) -> ApiResult<MutationOutcome> {
    let id = ResponseOptionId(id);
    apply_mutation(&state, CatalogMutation::UpdateResponseOption { id, draft }).await
}

pub async fn delete_option_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<MutationOutcome> {
    let id = ResponseOptionId(id);
    apply_mutation(&state, CatalogMutation::DeleteResponseOption { id }).await
}

/// Apply a mutation through the backend, then hand the new catalog to every
/// open session. Active evaluations keep their own outline.
async fn apply_mutation(state: &AppState, mutation: CatalogMutation) -> ApiResult<MutationOutcome> {
    let outcome = state.backend.apply_mutation(mutation).await?;
    tracing::info!(event = "catalog_mutation", outcome = ?outcome_ref(&outcome), "Catalog updated");

    match state.backend.fetch_catalog().await {
        Ok(catalog) => {
            let mut sessions = state.sessions.write().await;
            for session in sessions.values_mut() {
                let pruned = session.refresh_catalog(catalog.clone());
                if pruned > 0 {
                    tracing::info!(
                        scope = %session.scope(),
                        pruned,
                        "Dropped responses to removed catalog records"
                    );
                }
            }
        }
        Err(e) => {
            tracing::warn!("Catalog refresh after mutation failed: {}", e);
        }
    }

    Ok(Json(outcome))
}

fn outcome_ref(outcome: &MutationOutcome) -> Option<EntityRef> {
    match outcome {
        MutationOutcome::Saved { record } => Some(record.entity_ref()),
        MutationOutcome::Deleted { summary } => summary.removed.first().copied(),
    }
}

// =============================================================================
// EVALUATION HANDLERS
// =============================================================================

/// Overview of every category for a scope.
pub async fn overview_handler(
    State(state): State<AppState>,
    Path(scope): Path<String>,
) -> ApiResult<OverviewResponse> {
    let scope = parse_scope(scope)?;
    Ok(Json(read_session(&state, &scope, overview).await?))
}

/// Start or resume the assessment of one category.
pub async fn start_handler(
    State(state): State<AppState>,
    Path(scope): Path<String>,
    Json(request): Json<StartRequest>,
) -> ApiResult<EvaluationView> {
    let scope = parse_scope(scope)?;
    ensure_session(&state, &scope).await?;
    let mut sessions = state.sessions.write().await;
    let session = session_mut(&mut sessions, &scope)?;
    let evaluation = session.start_assessment(request.category_id)?;
    Ok(Json(EvaluationView::from_evaluation(evaluation)))
}

/// The active evaluation.
pub async fn current_handler(
    State(state): State<AppState>,
    Path(scope): Path<String>,
) -> ApiResult<EvaluationView> {
    let scope = parse_scope(scope)?;
    let sessions = state.sessions.read().await;
    let session = session_ref(&sessions, &scope)?;
    Ok(Json(active_view(session)?))
}

/// Record a selection and persist it.
pub async fn select_handler(
    State(state): State<AppState>,
    Path(scope): Path<String>,
    Json(request): Json<SelectRequest>,
) -> ApiResult<SelectResponse> {
    let scope = parse_scope(scope)?;
    let (selection, evaluation) = {
        let mut sessions = state.sessions.write().await;
        let session = session_mut(&mut sessions, &scope)?;
        let selection = session.select_response(request.question_id, request.response_option_id)?;
        (selection, active_view(session)?)
    };

    push_response(
        &state,
        &scope,
        selection.question_id,
        selection.response_option_id,
    )
    .await?;

    Ok(Json(SelectResponse {
        selection,
        evaluation,
    }))
}

/// Advance the cursor. Finishing stores the category result.
pub async fn next_handler(
    State(state): State<AppState>,
    Path(scope): Path<String>,
) -> ApiResult<NavigationResponse> {
    let scope = parse_scope(scope)?;
    let (navigation, evaluation, finished) = {
        let mut sessions = state.sessions.write().await;
        let session = session_mut(&mut sessions, &scope)?;
        let navigation = session.next_question()?;
        let view = active_view(session)?;
        let finished = match navigation {
            Navigation::Finished => Some(session.category_assessment(view.category_id)?),
            _ => None,
        };
        (navigation, view, finished)
    };

    let mut result = None;
    if let Some(CategoryAssessment::Scored { score }) = finished {
        sync_pending(&state, &scope).await?;
        if let Err(e) = state
            .backend
            .upsert_category_result(&scope, evaluation.category_id, &score)
            .await
        {
            state.notifier.notify(
                "Falha ao salvar resultado",
                format!(
                    "O resultado da categoria {} não foi salvo: {}",
                    evaluation.category_id, e
                ),
                Severity::Error,
            );
            return Err(e.into());
        }
        state.notifier.notify(
            "Avaliação concluída",
            format!(
                "Média {} - nível {}",
                score.average_score, score.maturity_level
            ),
            Severity::Success,
        );
        result = Some(score);
    }

    Ok(Json(NavigationResponse {
        navigation,
        evaluation,
        result,
    }))
}

/// Move the cursor back one question.
pub async fn previous_handler(
    State(state): State<AppState>,
    Path(scope): Path<String>,
) -> ApiResult<NavigationResponse> {
    let scope = parse_scope(scope)?;
    let mut sessions = state.sessions.write().await;
    let session = session_mut(&mut sessions, &scope)?;
    let navigation = session.previous_question()?;
    Ok(Json(NavigationResponse {
        navigation,
        evaluation: active_view(session)?,
        result: None,
    }))
}

/// Leave the active evaluation and return the overview.
pub async fn back_handler(
    State(state): State<AppState>,
    Path(scope): Path<String>,
) -> ApiResult<OverviewResponse> {
    let scope = parse_scope(scope)?;
    let mut sessions = state.sessions.write().await;
    let session = session_mut(&mut sessions, &scope)?;
    session.back_to_overview();
    let response = overview(session)?;
    close_if_idle(&mut sessions, &scope);
    Ok(Json(response))
}

/// Push answers the backend has not confirmed yet.
pub async fn sync_handler(
    State(state): State<AppState>,
    Path(scope): Path<String>,
) -> ApiResult<SyncResponse> {
    let scope = parse_scope(scope)?;
    let synced = sync_pending(&state, &scope).await.unwrap_or_else(|e| {
        tracing::warn!(scope = %scope, "Sync stopped early: {}", e);
        0
    });
    let mut sessions = state.sessions.write().await;
    let pending = sessions
        .get(&scope)
        .map(AssessmentSession::unsynced)
        .unwrap_or_default()
        .into_iter()
        .map(|(question_id, response_option_id)| PendingResponse {
            question_id,
            response_option_id,
        })
        .collect();
    close_if_idle(&mut sessions, &scope);
    Ok(Json(SyncResponse { synced, pending }))
}

pub async fn progress_handler(
    State(state): State<AppState>,
    Path(scope): Path<String>,
) -> ApiResult<OverallProgress> {
    let scope = parse_scope(scope)?;
    let progress = read_session(&state, &scope, AssessmentSession::overall_progress).await?;
    Ok(Json(progress))
}

pub async fn score_handler(
    State(state): State<AppState>,
    Path((scope, category)): Path<(String, u64)>,
) -> ApiResult<CategoryAssessment> {
    let scope = parse_scope(scope)?;
    let assessment = read_session(&state, &scope, |session| {
        session.category_assessment(CategoryId(category))
    })
    .await?;
    Ok(Json(assessment))
}

/// Category scores stored by the backend for the scope.
pub async fn results_handler(
    State(state): State<AppState>,
    Path(scope): Path<String>,
) -> ApiResult<BTreeMap<CategoryId, CategoryScore>> {
    let scope = parse_scope(scope)?;
    Ok(Json(state.backend.category_results(&scope).await?))
}

/// Report for the export boundary, as JSON or plain text.
pub async fn report_handler(
    State(state): State<AppState>,
    Path(scope): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    let scope = parse_scope(scope)?;
    let report: AssessmentReport = read_session(&state, &scope, AssessmentSession::report).await?;

    match query.format.as_deref() {
        None | Some("json") => Ok(Json(report).into_response()),
        Some("text") => Ok((
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            report.render_text(),
        )
            .into_response()),
        Some(other) => Err(ApiError(ArquimetroError::validation(
            arquimetro_core::EntityKind::Evaluation,
            "format",
            format!("unknown report format '{}'", other),
        ))),
    }
}

// =============================================================================
// NOTIFICATIONS HANDLER
// =============================================================================

pub async fn notifications_handler(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Json<Vec<Notification>> {
    let limit = query.limit.unwrap_or(DEFAULT_NOTIFICATION_LIMIT);
    Json(state.notifier.recent(limit))
}

// =============================================================================
// EXPORT / HASH HANDLERS
// =============================================================================

/// Export the catalog in canonical format.
pub async fn export_handler(State(state): State<AppState>) -> ApiResult<ExportResponse> {
    let catalog = state.backend.fetch_catalog().await?;
    let data = export_canonical(&catalog)?;
    Ok(Json(ExportResponse::new(&data, canonical_checksum(&catalog))))
}

/// BLAKE3 hash of the canonical catalog.
pub async fn hash_handler(State(state): State<AppState>) -> ApiResult<HashResponse> {
    let catalog = state.backend.fetch_catalog().await?;
    Ok(Json(HashResponse {
        algorithm: "blake3".to_string(),
        hash: canonical_crypto_hash(&catalog)?,
        checksum: canonical_checksum(&catalog),
    }))
}

// =============================================================================
// SESSION HELPERS
// =============================================================================

fn parse_scope(raw: String) -> Result<EvaluationScope, ApiError> {
    Ok(EvaluationScope::new(raw)?)
}

/// Load the scope's session from the backend if it is not open yet.
/// Build a session for `scope` from the backend's catalog and responses.
async fn load_session(
    state: &AppState,
    scope: &EvaluationScope,
) -> Result<AssessmentSession, ArquimetroError> {
    let catalog: Catalog = state.backend.fetch_catalog().await?;
    let recorded = state.backend.fetch_user_responses(scope).await?;
    Ok(AssessmentSession::load(scope.clone(), catalog, recorded))
}

/// Open and keep a session for `scope` unless one is already open.
async fn ensure_session(state: &AppState, scope: &EvaluationScope) -> Result<(), ApiError> {
    if state.sessions.read().await.contains_key(scope) {
        return Ok(());
    }

    let session = load_session(state, scope).await?;
    tracing::info!(scope = %scope, "Opened assessment session");

    state
        .sessions
        .write()
        .await
        .entry(scope.clone())
        .or_insert(session);
    Ok(())
}

/// Run a read-only view over the open session of `scope`. A scope with no
/// open session gets a temporary one that is dropped afterwards.
async fn read_session<T>(
    state: &AppState,
    scope: &EvaluationScope,
    view: impl FnOnce(&AssessmentSession) -> Result<T, ArquimetroError>,
) -> Result<T, ApiError> {
    if let Some(session) = state.sessions.read().await.get(scope) {
        return Ok(view(session)?);
    }
    let session = load_session(state, scope).await?;
    Ok(view(&session)?)
}

/// Close the session once nothing is active and nothing waits for sync.
fn close_if_idle(
    sessions: &mut BTreeMap<EvaluationScope, AssessmentSession>,
    scope: &EvaluationScope,
) {
    let idle = sessions
        .get(scope)
        .is_some_and(|s| s.active().is_none() && s.unsynced().is_empty());
    if idle {
        sessions.remove(scope);
        tracing::info!(scope = %scope, "Closed assessment session");
    }
}

fn session_ref<'a>(
    sessions: &'a BTreeMap<EvaluationScope, AssessmentSession>,
    scope: &EvaluationScope,
) -> Result<&'a AssessmentSession, ApiError> {
    sessions
        .get(scope)
        .ok_or(ApiError(ArquimetroError::NoActiveEvaluation))
}

fn session_mut<'a>(
    sessions: &'a mut BTreeMap<EvaluationScope, AssessmentSession>,
    scope: &EvaluationScope,
) -> Result<&'a mut AssessmentSession, ApiError> {
    sessions
        .get_mut(scope)
        .ok_or(ApiError(ArquimetroError::NoActiveEvaluation))
}

fn active_view(session: &AssessmentSession) -> Result<EvaluationView, ApiError> {
    session
        .active()
        .map(EvaluationView::from_evaluation)
        .ok_or(ApiError(ArquimetroError::NoActiveEvaluation))
}

fn overview(session: &AssessmentSession) -> Result<OverviewResponse, ArquimetroError> {
    let overall = session.overall_progress()?;
    let mut categories = Vec::new();
    for category in session.catalog().categories_ordered() {
        categories.push(CategoryOverview {
            category: category.clone(),
            assessment: session.category_assessment(category.id)?,
            progress: session.category_progress(category.id)?,
        });
    }
    Ok(OverviewResponse {
        scope: session.scope().clone(),
        overall,
        categories,
        active_category: session.active().map(|e| e.category_id()),
        pending: session.unsynced().len(),
    })
}

/// Persist one answer; on success clear it from the pending list.
async fn push_response(
    state: &AppState,
    scope: &EvaluationScope,
    question: QuestionId,
    option: ResponseOptionId,
) -> Result<(), ArquimetroError> {
    match state.backend.upsert_response(scope, question, option).await {
        Ok(()) => {
            if let Some(session) = state.sessions.write().await.get_mut(scope) {
                session.mark_synced(question, option);
            }
            Ok(())
        }
        Err(e) => {
            state.notifier.notify(
                "Falha ao salvar resposta",
                format!(
                    "A resposta da questão {} foi mantida e será reenviada: {}",
                    question, e
                ),
                Severity::Error,
            );
            Err(e)
        }
    }
}

/// Push every pending answer of the scope, stopping at the first failure.
async fn sync_pending(state: &AppState, scope: &EvaluationScope) -> Result<usize, ArquimetroError> {
    let pending = match state.sessions.read().await.get(scope) {
        Some(session) => session.unsynced(),
        None => return Ok(0),
    };

    let mut synced = 0;
    for (question, option) in pending {
        push_response(state, scope, question, option).await?;
        synced += 1;
    }
    Ok(synced)
}
