// src/error.rs

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};
use std::fmt;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error: the store or another collaborator failed
    StorageFailure(String),

    // 400 Bad Request
    InvalidInput(String),

    // 400 Bad Request: answer list length differs from the lesson's question count
    AnswerCountMismatch { expected: usize, received: usize },

    // 400 Bad Request: valid request that the current data cannot satisfy
    InvalidState { message: String, diagnostics: Value },

    // 401 Unauthorized
    AuthError(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn invalid_state(message: impl Into<String>, diagnostics: Value) -> Self {
        AppError::InvalidState {
            message: message.into(),
            diagnostics,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidInput(_)
            | AppError::AnswerCountMismatch { .. }
            | AppError::InvalidState { .. } => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::StorageFailure(_) => "storage_failure",
            AppError::InvalidInput(_) | AppError::AnswerCountMismatch { .. } => "invalid_input",
            AppError::InvalidState { .. } => "invalid_state",
            AppError::AuthError(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::StorageFailure(msg) => write!(f, "Storage failure: {}", msg),
            AppError::InvalidInput(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg) => f.write_str(msg),
            AppError::AnswerCountMismatch { expected, received } => write!(
                f,
                "Expected {} answers, but received {}",
                expected, received
            ),
            AppError::InvalidState { message, .. } => f.write_str(message),
        }
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
/// Structured details (counts, diagnostics) are merged into the body next to `error`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = Map::new();

        let message = match &self {
            AppError::StorageFailure(msg) => {
                tracing::error!("Storage failure: {}", msg);
                "Storage failure".to_string()
            }
            other => other.to_string(),
        };
        body.insert("error".to_string(), json!(message));
        body.insert("kind".to_string(), json!(self.kind()));

        match self {
            AppError::AnswerCountMismatch { expected, received } => {
                body.insert("expected".to_string(), json!(expected));
                body.insert("received".to_string(), json!(received));
            }
            AppError::InvalidState {
                diagnostics: Value::Object(fields),
                ..
            } => {
                body.extend(fields);
            }
            _ => {}
        }

        (status, Json(Value::Object(body))).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::StorageFailure`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::StorageFailure(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::NotFound("lesson".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::AnswerCountMismatch { expected: 1, received: 2 }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::invalid_state("No lessons found for this course", json!({})).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::StorageFailure("pool closed".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Forbidden("nope".into()).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_error_messages() {
        let err = AppError::AnswerCountMismatch { expected: 4, received: 2 };
        assert_eq!(err.to_string(), "Expected 4 answers, but received 2");
        assert_eq!(err.kind(), "invalid_input");

        let err = AppError::NotFound("Lesson not found".into());
        assert_eq!(err.to_string(), "Lesson not found");
    }
}
