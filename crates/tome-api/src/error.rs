//! API error types and JSON error response formatting.
//!
//! ApiError provides a consistent JSON error response format across all
//! endpoints, mapping internal errors to appropriate HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use tome_chat::ChatError;
use tome_core::error::TomeError;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request", "not_found").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid parameters.
    BadRequest(String),
    /// 404 Not Found - resource does not exist.
    NotFound(String),
    /// 422 Unprocessable Entity - valid syntax but semantic validation failure.
    UnprocessableEntity(String),
    /// 500 Internal Server Error - unexpected server error.
    Internal(String),
    /// 503 Service Unavailable - a backing service is unreachable.
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::UnprocessableEntity(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unprocessable_entity", msg)
            }
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg)
            }
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match &err {
            ChatError::EmptyQuestion => ApiError::BadRequest(err.to_string()),
            ChatError::QuestionTooLong(_) => ApiError::UnprocessableEntity(err.to_string()),
            ChatError::ConversationNotFound(_) => ApiError::NotFound(err.to_string()),
            ChatError::Generation { .. } => ApiError::ServiceUnavailable(err.to_string()),
            ChatError::InvalidPhase(_, _) | ChatError::Storage(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<TomeError> for ApiError {
    fn from(err: TomeError) -> Self {
        match &err {
            TomeError::Config(msg) => ApiError::BadRequest(msg.clone()),
            TomeError::Embedding(msg) => ApiError::ServiceUnavailable(msg.clone()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}
