//! HTTP API for triviad.
//!
//! Thin transport layer: request/response DTOs, the error-to-status
//! mapping, and the axum router with CORS and request tracing.

mod routes;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderName, Method, header};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use triviad_application::{GenerateQuestionUseCase, GetTodayUseCase, SubmitAnswerUseCase};

/// Header carrying the shared secret for the admin generation endpoint.
pub const CRON_KEY_HEADER: &str = "x-cron-key";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub today: Arc<GetTodayUseCase>,
    pub submit: Arc<SubmitAnswerUseCase>,
    pub generate: Arc<GenerateQuestionUseCase>,
    pub cron_key: String,
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(CRON_KEY_HEADER),
        ]);

    Router::new()
        .route("/health", get(routes::health))
        .route("/v1/question/today", get(routes::get_today))
        .route("/v1/answers", post(routes::post_answer))
        .route("/v1/admin/generate-today", post(routes::generate_today))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
