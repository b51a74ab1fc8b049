//! Integration tests for the Arquimetro HTTP API.
//!
//! Uses axum-test to exercise the router without starting a real server.
//! The local backend runs on an in-memory redb store; the hosted backend is
//! faked with mockito.

#![allow(clippy::unwrap_used, clippy::panic)]

use arquimetro::api::{
    AppState, EvaluationView, ExportResponse, HashResponse, HealthResponse, NavigationResponse,
    OverviewResponse, SelectResponse, StatusResponse, SyncResponse, create_router,
};
use arquimetro::backend::{Backend, LocalBackend, RemoteBackend};
use arquimetro::config::{RemoteConfig, ServerConfig};
use arquimetro::notify::{Notification, Notifier, Severity};
use arquimetro_core::{
    CatalogStore, CategoryDraft, CategoryId, DeficiencyType, EvaluationScope, Navigation,
    NavigationBlock, QuestionDraft, QuestionId, RedbStore, ResponseOptionDraft, ResponseOptionId,
    SubcategoryDraft, Weight,
};
use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestServer;
use serde_json::{Value, json};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Ids of the seeded catalog.
struct Seeded {
    category: CategoryId,
    empty_category: CategoryId,
    first: QuestionId,
    first_high: ResponseOptionId,
    first_low: ResponseOptionId,
    second: QuestionId,
    second_only: ResponseOptionId,
}

fn option(
    store: &mut RedbStore,
    question: QuestionId,
    level: u8,
    weight: u32,
    tag: DeficiencyType,
) -> ResponseOptionId {
    store
        .create_response_option(ResponseOptionDraft {
            question_id: question,
            level,
            label: format!("Nível {}", level),
            explanation: String::new(),
            feedback: format!("Retorno do nível {}", level),
            weight: Weight::whole(weight),
            deficiency_types: [tag].into_iter().collect(),
        })
        .unwrap()
        .id
}

/// One category with two questions, plus an empty category.
fn seeded_backend() -> (LocalBackend, Seeded) {
    let mut store = RedbStore::in_memory().unwrap();
    let category = store
        .create_category(CategoryDraft {
            title: "Gestão documental".to_string(),
            sort_order: 1,
            ..CategoryDraft::default()
        })
        .unwrap()
        .id;
    let empty_category = store
        .create_category(CategoryDraft {
            title: "Preservação".to_string(),
            sort_order: 2,
            ..CategoryDraft::default()
        })
        .unwrap()
        .id;
    let subcategory = store
        .create_subcategory(SubcategoryDraft {
            title: "Classificação".to_string(),
            category_id: category,
            sort_order: 1,
        })
        .unwrap()
        .id;
    let question = |store: &mut RedbStore, text: &str, order: i32| {
        store
            .create_question(QuestionDraft {
                text: text.to_string(),
                subcategory_id: subcategory,
                deficiency_types: Default::default(),
                sort_order: order,
            })
            .unwrap()
            .id
    };
    let first = question(&mut store, "Existe plano de classificação?", 1);
    let second = question(&mut store, "Existe tabela de temporalidade?", 2);
    let first_high = option(&mut store, first, 5, 5, DeficiencyType::Tecnica);
    let first_low = option(&mut store, first, 1, 1, DeficiencyType::Ferramental);
    let second_only = option(&mut store, second, 3, 3, DeficiencyType::Comportamental);

    (
        LocalBackend::new(store),
        Seeded {
            category,
            empty_category,
            first,
            first_high,
            first_low,
            second,
            second_only,
        },
    )
}

fn open_settings() -> ServerConfig {
    ServerConfig {
        rate_limit: 0,
        ..ServerConfig::default()
    }
}

fn server_for(backend: Backend, settings: ServerConfig) -> (TestServer, Notifier) {
    let notifier = Notifier::default();
    let state = AppState::new(backend, notifier.clone(), settings);
    (TestServer::new(create_router(state)).unwrap(), notifier)
}

fn seeded_server() -> (TestServer, LocalBackend, Seeded) {
    let (backend, seeded) = seeded_backend();
    let (server, _) = server_for(Backend::Local(backend.clone()), open_settings());
    (server, backend, seeded)
}

fn empty_server() -> TestServer {
    let backend = LocalBackend::in_memory().unwrap();
    server_for(Backend::Local(backend), open_settings()).0
}

fn scope() -> EvaluationScope {
    EvaluationScope::new("arquivo-central").unwrap()
}

// =============================================================================
// HEALTH / STATUS TESTS
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let server = empty_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_status_counts_catalog() {
    let (server, _, _) = seeded_server();

    let response = server.get("/status").await;

    response.assert_status_ok();
    let status: StatusResponse = response.json();
    assert_eq!(status.backend, "local");
    assert_eq!(status.categories, 2);
    assert_eq!(status.subcategories, 1);
    assert_eq!(status.questions, 2);
    assert_eq!(status.response_options, 3);
    assert_eq!(status.active_sessions, 0);
}

// =============================================================================
// CATALOG TESTS
// =============================================================================

#[tokio::test]
async fn test_catalog_listing_is_ordered() {
    let (server, _, seeded) = seeded_server();

    let response = server.get("/categories").await;
    response.assert_status_ok();
    let categories: Value = response.json();
    assert_eq!(categories[0]["title"], "Gestão documental");
    assert_eq!(categories[1]["title"], "Preservação");

    let response = server
        .get(&format!("/questions/{}/options", seeded.first))
        .await;
    response.assert_status_ok();
    let options: Value = response.json();
    // Ordered by level, not by creation.
    assert_eq!(options[0]["id"], json!(seeded.first_low.0));
    assert_eq!(options[1]["id"], json!(seeded.first_high.0));
}

#[tokio::test]
async fn test_unknown_parent_is_not_found() {
    let server = empty_server();

    let response = server.get("/categories/999/subcategories").await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["kind"], "not_found");
    assert_eq!(body["entity"]["kind"], "category");
    assert_eq!(body["entity"]["id"], json!(999));

    let response = server.get("/subcategories/998/questions").await;
    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["entity"]["kind"], "subcategory");

    let response = server.get("/questions/997/options").await;
    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["entity"]["kind"], "question");
}

#[tokio::test]
async fn test_create_and_update_category() {
    let server = empty_server();

    let response = server
        .post("/categories")
        .json(&json!({"title": "Acesso", "sort_order": 3}))
        .await;
    response.assert_status_ok();
    let created: Value = response.json();
    assert_eq!(created["outcome"], "saved");
    let id = created["record"]["record"]["id"].as_u64().unwrap();

    let response = server
        .put(&format!("/categories/{}", id))
        .json(&json!({"title": "Acesso à informação"}))
        .await;
    response.assert_status_ok();

    let response = server.get(&format!("/categories/{}", id)).await;
    response.assert_status_ok();
    let category: Value = response.json();
    assert_eq!(category["title"], "Acesso à informação");
}

#[tokio::test]
async fn test_blank_title_is_bad_request() {
    let server = empty_server();

    let response = server
        .post("/categories")
        .json(&json!({"title": "   "}))
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["kind"], "validation");
    assert_eq!(body["field"], "title");
    assert_eq!(body["retryable"], false);
}

#[tokio::test]
async fn test_option_for_missing_question_is_not_found() {
    let server = empty_server();

    let response = server
        .post("/response-options")
        .json(&json!({
            "question_id": 42,
            "level": 1,
            "label": "Não",
            "feedback": "Crie o instrumento",
            "weight": 1
        }))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_delete_category_cascades() {
    let (server, _, seeded) = seeded_server();

    let response = server
        .delete(&format!("/categories/{}", seeded.category))
        .await;
    response.assert_status_ok();
    let outcome: Value = response.json();
    assert_eq!(outcome["outcome"], "deleted");
    // Category, subcategory, two questions, three options.
    assert_eq!(outcome["summary"]["removed"].as_array().unwrap().len(), 7);

    server
        .get(&format!("/questions/{}", seeded.second))
        .await
        .assert_status_not_found();
    let status: StatusResponse = server.get("/status").await.json();
    assert_eq!(status.categories, 1);
    assert_eq!(status.response_options, 0);
}

// =============================================================================
// EVALUATION TESTS
// =============================================================================

#[tokio::test]
async fn test_full_evaluation_flow() {
    let (server, backend, seeded) = seeded_server();
    let base = format!("/evaluations/{}", scope());

    let response = server
        .post(&format!("{}/start", base))
        .json(&json!({"category_id": seeded.category}))
        .await;
    response.assert_status_ok();
    let view: EvaluationView = response.json();
    assert_eq!(view.total_questions, 2);
    assert_eq!(view.current_index, 0);
    let current = view.current_question.unwrap();
    assert_eq!(current.id, seeded.first);
    assert_eq!(current.subcategory, "Classificação");
    assert_eq!(current.options.len(), 2);

    let response = server
        .post(&format!("{}/select", base))
        .json(&json!({"question_id": seeded.first, "response_option_id": seeded.first_high}))
        .await;
    response.assert_status_ok();
    let selected: SelectResponse = response.json();
    assert_eq!(selected.selection.previous, None);
    assert_eq!(selected.evaluation.answered, 1);

    let moved: NavigationResponse = server.post(&format!("{}/next", base)).await.json();
    assert_eq!(moved.navigation, Navigation::Moved { index: 1 });
    assert!(moved.result.is_none());

    server
        .post(&format!("{}/select", base))
        .json(&json!({"question_id": seeded.second, "response_option_id": seeded.second_only}))
        .await
        .assert_status_ok();

    let response = server.post(&format!("{}/next", base)).await;
    response.assert_status_ok();
    let finished: Value = response.json();
    assert_eq!(finished["navigation"]["navigation"], "finished");
    assert_eq!(finished["result"]["average_score"], json!(4.0));
    assert_eq!(finished["result"]["maturity_level"], "consolidado");
    assert_eq!(finished["result"]["deficiencies"]["tecnica"], 1);
    assert_eq!(finished["result"]["deficiencies"]["comportamental"], 1);
    assert_eq!(finished["result"]["deficiencies"]["ferramental"], 0);

    let recorded = backend.fetch_user_responses(&scope()).await.unwrap();
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[&seeded.first], seeded.first_high);
    let results = backend.category_results(&scope()).await.unwrap();
    assert!(results.contains_key(&seeded.category));

    let stored: Value = server.get(&format!("{}/results", base)).await.json();
    let key = seeded.category.0.to_string();
    assert_eq!(stored[key.as_str()]["maturity_level"], "consolidado");
    assert_eq!(stored[key.as_str()]["answered_questions"], 2);

    let progress: Value = server.get(&format!("{}/progress", base)).await.json();
    // The category in configuration counts toward the total.
    assert_eq!(progress["complete_categories"], 1);
    assert_eq!(progress["total_categories"], 2);
    assert_eq!(progress["percent"], 50);
}

#[tokio::test]
async fn test_next_without_selection_is_blocked() {
    let (server, _, seeded) = seeded_server();
    let base = format!("/evaluations/{}", scope());

    server
        .post(&format!("{}/start", base))
        .json(&json!({"category_id": seeded.category}))
        .await
        .assert_status_ok();

    let response = server.post(&format!("{}/next", base)).await;
    response.assert_status_ok();
    let blocked: NavigationResponse = response.json();
    assert_eq!(
        blocked.navigation,
        Navigation::Blocked {
            reason: NavigationBlock::NoSelection
        }
    );
    assert_eq!(blocked.evaluation.current_index, 0);

    let previous: NavigationResponse = server.post(&format!("{}/previous", base)).await.json();
    assert_eq!(
        previous.navigation,
        Navigation::Blocked {
            reason: NavigationBlock::AtFirstQuestion
        }
    );
}

#[tokio::test]
async fn test_reselection_overwrites() {
    let (server, backend, seeded) = seeded_server();
    let base = format!("/evaluations/{}", scope());

    server
        .post(&format!("{}/start", base))
        .json(&json!({"category_id": seeded.category}))
        .await
        .assert_status_ok();
    for option in [seeded.first_high, seeded.first_low] {
        server
            .post(&format!("{}/select", base))
            .json(&json!({"question_id": seeded.first, "response_option_id": option}))
            .await
            .assert_status_ok();
    }

    let recorded = backend.fetch_user_responses(&scope()).await.unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[&seeded.first], seeded.first_low);

    let score: Value = server
        .get(&format!("{}/categories/{}/score", base, seeded.category))
        .await
        .json();
    assert_eq!(score["state"], "scored");
    assert_eq!(score["score"]["average_score"], json!(1.0));
    assert_eq!(score["score"]["maturity_level"], "nao_estabelecido");
}

#[tokio::test]
async fn test_start_empty_category_is_conflict() {
    let (server, _, seeded) = seeded_server();

    let response = server
        .post(&format!("/evaluations/{}/start", scope()))
        .json(&json!({"category_id": seeded.empty_category}))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["kind"], "empty_catalog");
}

#[tokio::test]
async fn test_select_without_start_is_conflict() {
    let (server, _, seeded) = seeded_server();

    let response = server
        .post(&format!("/evaluations/{}/select", scope()))
        .json(&json!({"question_id": seeded.first, "response_option_id": seeded.first_high}))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["kind"], "no_active_evaluation");
}

#[tokio::test]
async fn test_invalid_scope_is_bad_request() {
    let server = empty_server();

    let response = server.get("/evaluations/a%20b").await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["field"], "scope");

    let response = server.get("/evaluations/.../progress").await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_overview_resumes_recorded_answers() {
    let (backend, seeded) = seeded_backend();
    backend
        .upsert_response(&scope(), seeded.first, seeded.first_low)
        .await
        .unwrap();
    let (server, _) = server_for(Backend::Local(backend), open_settings());

    let response = server.get(&format!("/evaluations/{}", scope())).await;
    response.assert_status_ok();
    let overview: OverviewResponse = response.json();
    assert_eq!(overview.categories.len(), 2);
    assert_eq!(overview.categories[0].progress.answered, 1);
    assert!(overview.categories[1].progress.in_configuration);
    assert!(overview.active_category.is_none());
    assert_eq!(overview.pending, 0);

    // Resuming puts the cursor on the first unanswered question.
    let view: EvaluationView = server
        .post(&format!("/evaluations/{}/start", scope()))
        .json(&json!({"category_id": seeded.category}))
        .await
        .json();
    assert_eq!(view.current_question.unwrap().id, seeded.second);

    let overview: OverviewResponse = server
        .post(&format!("/evaluations/{}/back", scope()))
        .await
        .json();
    assert!(overview.active_category.is_none());
}

#[tokio::test]
async fn test_report_formats() {
    let (server, _, seeded) = seeded_server();
    let base = format!("/evaluations/{}", scope());
    server
        .post(&format!("{}/start", base))
        .json(&json!({"category_id": seeded.category}))
        .await
        .assert_status_ok();
    server
        .post(&format!("{}/select", base))
        .json(&json!({"question_id": seeded.first, "response_option_id": seeded.first_high}))
        .await
        .assert_status_ok();

    let json_report: Value = server.get(&format!("{}/report", base)).await.json();
    assert_eq!(json_report["scope"], "arquivo-central");
    assert_eq!(json_report["categories"].as_array().unwrap().len(), 2);

    let response = server
        .get(&format!("{}/report", base))
        .add_query_param("format", "text")
        .await;
    response.assert_status_ok();
    assert!(response.text().contains("Gestão documental"));

    server
        .get(&format!("{}/report", base))
        .add_query_param("format", "pdf")
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_catalog_change_prunes_session_answers() {
    let (server, _, seeded) = seeded_server();
    let base = format!("/evaluations/{}", scope());
    server
        .post(&format!("{}/start", base))
        .json(&json!({"category_id": seeded.category}))
        .await
        .assert_status_ok();
    server
        .post(&format!("{}/select", base))
        .json(&json!({"question_id": seeded.first, "response_option_id": seeded.first_low}))
        .await
        .assert_status_ok();
    server.post(&format!("{}/back", base)).await.assert_status_ok();

    server
        .delete(&format!("/response-options/{}", seeded.first_low))
        .await
        .assert_status_ok();

    let overview: OverviewResponse = server.get(&base).await.json();
    assert_eq!(overview.categories[0].progress.answered, 0);
}

#[tokio::test]
async fn test_sessions_open_on_start_and_close_on_back() {
    let (backend, seeded) = seeded_backend();
    let state = AppState::new(Backend::Local(backend), Notifier::default(), open_settings());
    let sessions = state.sessions.clone();
    let server = TestServer::new(create_router(state)).unwrap();

    for i in 0..25 {
        let base = format!("/evaluations/visitante-{}", i);
        server.get(&base).await.assert_status_ok();
        server
            .get(&format!("{}/progress", base))
            .await
            .assert_status_ok();
        server
            .get(&format!("{}/categories/{}/score", base, seeded.category))
            .await
            .assert_status_ok();
    }
    assert!(sessions.read().await.is_empty());

    let base = format!("/evaluations/{}", scope());
    server
        .post(&format!("{}/start", base))
        .json(&json!({"category_id": seeded.category}))
        .await
        .assert_status_ok();
    server
        .post(&format!("{}/select", base))
        .json(&json!({"question_id": seeded.first, "response_option_id": seeded.first_high}))
        .await
        .assert_status_ok();
    assert_eq!(sessions.read().await.len(), 1);

    server.post(&format!("{}/back", base)).await.assert_status_ok();
    assert!(sessions.read().await.is_empty());

    // The saved answer is read back from the backend.
    let overview: OverviewResponse = server.get(&base).await.json();
    assert_eq!(overview.categories[0].progress.answered, 1);
}

// =============================================================================
// REMOTE BACKEND FAILURE TESTS
// =============================================================================

fn remote_catalog() -> Value {
    json!({
        "categories": [{"id": 1, "title": "Gestão documental", "sortOrder": 1}],
        "subcategories": [{"id": 2, "title": "Classificação", "categoryId": 1}],
        "questions": [{"id": 3, "text": "Existe plano?", "subcategoryId": 2}],
        "responseOptions": [
            {"id": 4, "questionId": 3, "level": 5, "label": "Sim", "feedback": "Mantenha", "weight": 5}
        ]
    })
}

fn remote_backend(url: String) -> Backend {
    Backend::Remote(
        RemoteBackend::new(&RemoteConfig {
            url,
            max_retries: 0,
            backoff_ms: 1,
            ..RemoteConfig::default()
        })
        .unwrap(),
    )
}

#[tokio::test]
async fn test_failed_save_keeps_answer_pending_until_sync() {
    let mut remote = mockito::Server::new_async().await;
    remote
        .mock("GET", "/catalog")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(remote_catalog().to_string())
        .create_async()
        .await;
    remote
        .mock("GET", "/evaluations/arquivo-central/responses")
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;
    let failing = remote
        .mock("PUT", "/evaluations/arquivo-central/responses/3")
        .with_status(503)
        .with_body("maintenance")
        .create_async()
        .await;

    let (server, notifier) = server_for(remote_backend(remote.url()), open_settings());
    let base = format!("/evaluations/{}", scope());

    server
        .post(&format!("{}/start", base))
        .json(&json!({"category_id": 1}))
        .await
        .assert_status_ok();

    let response = server
        .post(&format!("{}/select", base))
        .json(&json!({"question_id": 3, "response_option_id": 4}))
        .await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["kind"], "backend");
    assert_eq!(body["retryable"], true);

    let notices: Vec<Notification> = notifier.recent(1);
    assert_eq!(notices[0].severity, Severity::Error);

    // The answer survives in the session.
    let view: EvaluationView = server.get(&format!("{}/current", base)).await.json();
    assert_eq!(view.current_question.unwrap().selected, Some(ResponseOptionId(4)));
    let overview: OverviewResponse = server.get(&base).await.json();
    assert_eq!(overview.pending, 1);

    failing.remove_async().await;
    let saved = remote
        .mock("PUT", "/evaluations/arquivo-central/responses/3")
        .match_body(mockito::Matcher::Json(
            json!({"question_id": 3, "response_option_id": 4}),
        ))
        .with_status(204)
        .create_async()
        .await;

    let sync: SyncResponse = server.post(&format!("{}/sync", base)).await.json();
    assert_eq!(sync.synced, 1);
    assert!(sync.pending.is_empty());
    saved.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_backend_is_bad_gateway() {
    let server = server_for(
        remote_backend("http://127.0.0.1:9".to_string()),
        open_settings(),
    )
    .0;

    let response = server.get("/status").await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    server.get("/health").await.assert_status_ok();
}

// =============================================================================
// NOTIFICATION TESTS
// =============================================================================

#[tokio::test]
async fn test_finishing_notifies_success() {
    let (server, _, seeded) = seeded_server();
    let base = format!("/evaluations/{}", scope());
    server
        .post(&format!("{}/start", base))
        .json(&json!({"category_id": seeded.category}))
        .await
        .assert_status_ok();
    for (question, option) in [
        (seeded.first, seeded.first_low),
        (seeded.second, seeded.second_only),
    ] {
        server
            .post(&format!("{}/select", base))
            .json(&json!({"question_id": question, "response_option_id": option}))
            .await
            .assert_status_ok();
        server.post(&format!("{}/next", base)).await.assert_status_ok();
    }

    let response = server
        .get("/notifications")
        .add_query_param("limit", 5)
        .await;
    response.assert_status_ok();
    let notices: Vec<Notification> = response.json();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].severity, Severity::Success);
    assert!(notices[0].description.contains("2.0"));
}

// =============================================================================
// EXPORT / HASH TESTS
// =============================================================================

#[tokio::test]
async fn test_export_and_hash_agree() {
    let (server, _, _) = seeded_server();

    let export: ExportResponse = server.post("/export").await.json();
    let decoded =
        base64::Engine::decode(&base64::engine::general_purpose::STANDARD, &export.data).unwrap();
    assert_eq!(decoded.len(), export.size);

    let hash: HashResponse = server.get("/hash").await.json();
    assert_eq!(hash.algorithm, "blake3");
    assert_eq!(hash.hash.len(), 64);
    assert_eq!(hash.checksum, export.checksum);
}

// =============================================================================
// AUTHENTICATION TESTS
// =============================================================================

fn auth_server(key: &str) -> TestServer {
    let backend = LocalBackend::in_memory().unwrap();
    let settings = ServerConfig {
        api_key: Some(key.to_string()),
        ..open_settings()
    };
    server_for(Backend::Local(backend), settings).0
}

#[tokio::test]
async fn test_auth_valid_bearer_token() {
    let server = auth_server("test-secret-key");

    let response = server
        .get("/status")
        .add_header(
            header::AUTHORIZATION,
            "Bearer test-secret-key".parse::<HeaderValue>().unwrap(),
        )
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_auth_invalid_or_missing_token_rejected() {
    let server = auth_server("test-secret-key");

    server
        .get("/status")
        .add_header(
            header::AUTHORIZATION,
            "Bearer wrong-key".parse::<HeaderValue>().unwrap(),
        )
        .await
        .assert_status_unauthorized();
    server.get("/status").await.assert_status_unauthorized();
}

#[tokio::test]
async fn test_auth_health_bypasses_auth() {
    let server = auth_server("test-secret-key");

    server.get("/health").await.assert_status_ok();
}

// =============================================================================
// RATE LIMIT TESTS
// =============================================================================

#[tokio::test]
async fn test_rate_limit_rejects_burst() {
    let backend = LocalBackend::in_memory().unwrap();
    let settings = ServerConfig {
        rate_limit: 1,
        ..ServerConfig::default()
    };
    let (server, _) = server_for(Backend::Local(backend), settings);

    server.get("/health").await.assert_status_ok();
    server
        .get("/health")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}
