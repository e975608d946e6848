use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Body returned for every server-side failure. Causes stay in the logs.
pub const SUBMISSION_FAILED: &str = "could not create application";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Multipart(e) if e.status().is_server_error() => {
                tracing::error!("Could not read multipart body: {}", e.body_text());
                (StatusCode::INTERNAL_SERVER_ERROR, SUBMISSION_FAILED.to_string())
            }
            AppError::Multipart(e) => {
                tracing::debug!("Rejected multipart body: {}", e.body_text());
                (e.status(), e.body_text())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, SUBMISSION_FAILED.to_string())
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, SUBMISSION_FAILED.to_string())
            }
            AppError::Io(e) => {
                tracing::error!("I/O error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, SUBMISSION_FAILED.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, SUBMISSION_FAILED.to_string())
            }
        };

        (status, message).into_response()
    }
}
