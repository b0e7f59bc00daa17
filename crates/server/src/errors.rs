use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use tracing::{error, warn};

/// Error returned by quiz handlers; owns the JSON shapes clients see.
#[derive(Debug)]
pub enum ApiError {
    Service(ServiceError),
    /// Request body could not be read as a quiz submission.
    BadBody(String),
    /// Path segment that is not a quiz id.
    UnknownRoute(String),
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self { Self::Service(e) }
}

fn message(status: StatusCode, msg: String) -> Response {
    (status, Json(serde_json::json!({"message": msg}))).into_response()
}

fn internal(details: String) -> Response {
    error!(error = %details, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "message": "error occurred",
            "action": "Contact the administrator",
            "details": details,
        })),
    )
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Service(e @ ServiceError::MissingFields(_)) => {
                warn!(error = %e, "quiz submission rejected");
                message(StatusCode::BAD_REQUEST, e.to_string())
            }
            Self::Service(e @ (ServiceError::NotFound(_) | ServiceError::NotYetAvailable { .. })) => {
                message(StatusCode::NOT_FOUND, e.to_string())
            }
            Self::Service(e) => internal(e.to_string()),
            Self::BadBody(details) => internal(details),
            Self::UnknownRoute(raw) => message(StatusCode::NOT_FOUND, format!("Quiz {raw} not found")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (ApiError::from(ServiceError::MissingFields(vec!["question"])), StatusCode::BAD_REQUEST),
            (ApiError::from(ServiceError::NotFound(9)), StatusCode::NOT_FOUND),
            (ApiError::from(ServiceError::NotYetAvailable { remaining_secs: 3.0 }), StatusCode::NOT_FOUND),
            (ApiError::from(ServiceError::MissingField("answer")), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::from(ServiceError::Storage("disk".into())), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::BadBody("EOF".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::UnknownRoute("abc".into()), StatusCode::NOT_FOUND),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
