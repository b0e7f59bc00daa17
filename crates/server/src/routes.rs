use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;

use common::{metrics::encode_metrics, types::Health};
use service::quiz::{QuizRepository, QuizService};

pub mod quizzes;

/// Shared handler state: the quiz service over whichever repository was configured.
#[derive(Clone)]
pub struct AppState {
    pub quizzes: Arc<QuizService<dyn QuizRepository>>,
}

impl AppState {
    pub fn new(repo: Arc<dyn QuizRepository>) -> Self {
        // one service shared by every handler; the repository decides where quizzes live
        Self { quizzes: Arc::new(QuizService::new(repo)) }
    }
}

/// Liveness check; does not touch storage.
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> (StatusCode, String) {
    encode_metrics()
}

// JSON 404 for anything outside the route table, matching the other error bodies
async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::NOT_FOUND, Json(serde_json::json!({"message": "Not Found"})))
}

/// Build the full application router
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    // quiz API
    let quizzes = Router::new()
        .route("/quizzes", post(quizzes::create_quiz))
        .route("/quizzes/active", get(quizzes::active_quiz))
        .route("/quizzes/all", get(quizzes::all_quizzes))
        // `:id` is parsed in the handler so a non-numeric id gets the quiz 404 body
        .route("/quizzes/:id/result", get(quizzes::quiz_result));

    // operational endpoints
    let ops = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics));

    ops.merge(quizzes)
        .fallback(not_found)
        .with_state(state)
        // any origin may call the API
        .layer(cors)
        // outermost: traces every request, including CORS preflights
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request with method and path
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // status code and latency
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
