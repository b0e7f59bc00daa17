use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use service::quiz::{NewQuizInput, QuizDocument};
use tracing::info;

use crate::errors::ApiError;
use crate::routes::AppState;

/// Submit a quiz. Replies `{"success": true}` once it is stored.
pub async fn create_quiz(
    State(state): State<AppState>,
    payload: Result<Json<NewQuizInput>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(input) = payload.map_err(|e| ApiError::BadBody(e.body_text()))?;
    let quiz = state.quizzes.create(input).await?;
    info!(quiz_id = quiz.id, "quiz submitted");
    Ok(Json(serde_json::json!({"success": true})))
}

/// Quiz whose window contains the current time, or `null`.
pub async fn active_quiz(State(state): State<AppState>) -> Result<Json<Option<QuizDocument>>, ApiError> {
    Ok(Json(state.quizzes.active().await?))
}

/// Full quiz with its answer, once the result has been released.
pub async fn quiz_result(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<QuizDocument>, ApiError> {
    let id = raw.parse::<u64>().map_err(|_| ApiError::UnknownRoute(raw.clone()))?;
    Ok(Json(state.quizzes.result(id).await?))
}

/// Every quiz, answers removed.
pub async fn all_quizzes(State(state): State<AppState>) -> Result<Json<Vec<QuizDocument>>, ApiError> {
    let quizzes = state.quizzes.list_public().await?;
    info!(count = quizzes.len(), "list quizzes");
    Ok(Json(quizzes))
}
