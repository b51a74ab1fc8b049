//! # Arquimetro HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health`, `GET /status`
//! - `GET /catalog`, `POST /catalog/mutations`
//! - `/categories`, `/subcategories`, `/questions`, `/response-options` -
//!   list, read, create (`POST`), update (`PUT /{id}`), delete (`DELETE /{id}`)
//! - `GET /evaluations/{scope}` - overview of every category
//! - `POST /evaluations/{scope}/start|select|next|previous|back|sync`
//! - `GET /evaluations/{scope}/current|progress|results|report`
//! - `GET /evaluations/{scope}/categories/{category_id}/score`
//! - `GET /notifications` - most recent user-facing notices
//! - `POST /export`, `GET /hash`
//!
//! Security settings (API key, CORS origins, rate limit) come from
//! `ServerConfig`; see `crate::config`.

mod auth;
mod handlers;
mod middleware;
mod types;

pub use middleware::create_rate_limiter;
pub use types::{
    ApiError, ApiResult, CategoryOverview, ErrorResponse, EvaluationView, ExportResponse,
    HashResponse, HealthResponse, NavigationResponse, OverviewResponse, PendingResponse,
    QuestionView, SelectRequest, SelectResponse, StartRequest, StatusResponse, SyncResponse,
};

use crate::backend::Backend;
use crate::config::ServerConfig;
use crate::notify::Notifier;
use arquimetro_core::{ArquimetroError, AssessmentSession, EvaluationScope};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Maximum request body size (2 MB).
const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Open assessment sessions, one per evaluation scope. A session opens on
/// `start` and closes on `back` once no answer is waiting for sync.
pub type SessionMap = Arc<RwLock<BTreeMap<EvaluationScope, AssessmentSession>>>;

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<Backend>,
    pub sessions: SessionMap,
    pub notifier: Notifier,
    pub settings: Arc<ServerConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(backend: Backend, notifier: Notifier, settings: ServerConfig) -> Self {
        Self {
            backend: Arc::new(backend),
            sessions: Arc::new(RwLock::new(BTreeMap::new())),
            notifier,
            settings: Arc::new(settings),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

/// Build the CORS layer.
///
/// - `"*"` allows all origins (development only)
/// - `None` allows localhost only
/// - otherwise a comma-separated list of allowed origins
fn build_cors_layer(origins: Option<&str>) -> CorsLayer {
    match origins {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins. This is insecure for production!");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods(ALLOWED_METHODS)
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            tracing::info!("CORS: No origins configured, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing
/// 2. CORS
/// 3. Body limit
/// 4. Rate limiting (if enabled)
/// 5. Authentication (if configured)
pub fn create_router(state: AppState) -> Router {
    let settings = Arc::clone(&state.settings);

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route("/catalog", get(handlers::catalog_handler))
        .route("/catalog/mutations", post(handlers::mutation_handler))
        .route(
            "/categories",
            get(handlers::list_categories_handler).post(handlers::create_category_handler),
        )
        .route(
            "/categories/{id}",
            get(handlers::get_category_handler)
                .put(handlers::update_category_handler)
                .delete(handlers::delete_category_handler),
        )
        .route(
            "/categories/{id}/subcategories",
            get(handlers::list_subcategories_handler),
        )
        .route("/subcategories", post(handlers::create_subcategory_handler))
        .route(
            "/subcategories/{id}",
            get(handlers::get_subcategory_handler)
                .put(handlers::update_subcategory_handler)
                .delete(handlers::delete_subcategory_handler),
        )
        .route(
            "/subcategories/{id}/questions",
            get(handlers::list_questions_handler),
        )
        .route("/questions", post(handlers::create_question_handler))
        .route(
            "/questions/{id}",
            get(handlers::get_question_handler)
                .put(handlers::update_question_handler)
                .delete(handlers::delete_question_handler),
        )
        .route("/questions/{id}/options", get(handlers::list_options_handler))
        .route("/response-options", post(handlers::create_option_handler))
        .route(
            "/response-options/{id}",
            get(handlers::get_option_handler)
                .put(handlers::update_option_handler)
                .delete(handlers::delete_option_handler),
        )
        .route("/evaluations/{scope}", get(handlers::overview_handler))
        .route("/evaluations/{scope}/start", post(handlers::start_handler))
        .route("/evaluations/{scope}/current", get(handlers::current_handler))
        .route("/evaluations/{scope}/select", post(handlers::select_handler))
        .route("/evaluations/{scope}/next", post(handlers::next_handler))
        .route(
            "/evaluations/{scope}/previous",
            post(handlers::previous_handler),
        )
        .route("/evaluations/{scope}/back", post(handlers::back_handler))
        .route("/evaluations/{scope}/sync", post(handlers::sync_handler))
        .route(
            "/evaluations/{scope}/progress",
            get(handlers::progress_handler),
        )
        .route(
            "/evaluations/{scope}/categories/{category_id}/score",
            get(handlers::score_handler),
        )
        .route(
            "/evaluations/{scope}/results",
            get(handlers::results_handler),
        )
        .route("/evaluations/{scope}/report", get(handlers::report_handler))
        .route("/notifications", get(handlers::notifications_handler))
        .route("/export", post(handlers::export_handler))
        .route("/hash", get(handlers::hash_handler));

    match settings.api_key.as_deref().filter(|k| !k.is_empty()) {
        Some(key) => {
            tracing::info!("API key authentication enabled");
            router = router.layer(axum_middleware::from_fn_with_state(
                Arc::<str>::from(key),
                auth::api_key_auth_middleware,
            ));
        }
        None => {
            tracing::warn!(
                "API key authentication DISABLED - all endpoints are publicly accessible! \
                 Set ARQUIMETRO_API_KEY to enable authentication."
            );
        }
    }

    if settings.rate_limit > 0 {
        tracing::info!(
            "Rate limiting enabled: {} requests/second",
            settings.rate_limit
        );
        router = router.layer(axum_middleware::from_fn_with_state(
            create_rate_limiter(settings.rate_limit),
            middleware::rate_limit_middleware,
        ));
    } else {
        tracing::info!("Rate limiting disabled");
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer(settings.cors_origins.as_deref()))
                .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_SIZE)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), ArquimetroError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ArquimetroError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Arquimetro HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| ArquimetroError::IoError(format!("Server error: {}", e)))
}
