use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error as ThisError;

use super::StorageError;

#[derive(Debug, ThisError)]
pub enum CmsError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("invalid username or password")]
    AuthenticationFailed,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("malformed multipart request: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("password hashing failed")]
    PasswordHash,

    #[error("actor error: {0}")]
    Actor(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for CmsError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            CmsError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ApiErrorObject {
                    code: "NOT_FOUND".to_string(),
                    message,
                    details: None,
                },
            ),

            CmsError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                ApiErrorObject {
                    code: "VALIDATION_FAILED".to_string(),
                    message,
                    details: None,
                },
            ),

            CmsError::AuthenticationFailed => (
                StatusCode::UNAUTHORIZED,
                ApiErrorObject {
                    code: "AUTHENTICATION_FAILED".to_string(),
                    message: "Invalid username or password.".to_string(),
                    details: None,
                },
            ),

            CmsError::Storage(err) if err.is_validation() => (
                StatusCode::BAD_REQUEST,
                ApiErrorObject {
                    code: "VALIDATION_FAILED".to_string(),
                    message: err.to_string(),
                    details: None,
                },
            ),

            CmsError::Multipart(err) => (
                StatusCode::BAD_REQUEST,
                ApiErrorObject {
                    code: "MALFORMED_REQUEST".to_string(),
                    message: err.to_string(),
                    details: None,
                },
            ),

            CmsError::Json(_) => (
                StatusCode::BAD_REQUEST,
                ApiErrorObject {
                    code: "MALFORMED_REQUEST".to_string(),
                    message: "Request payload could not be parsed.".to_string(),
                    details: None,
                },
            ),

            CmsError::Storage(_)
            | CmsError::Token(_)
            | CmsError::PasswordHash
            | CmsError::Actor(_)
            | CmsError::Database(_)
            | CmsError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorObject {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                    details: None,
                },
            ),
        };
        (status, Json(ApiErrorBody { inner: error_body })).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}
