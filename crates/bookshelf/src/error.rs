//! Error types for the Bookshelf server.
//!
//! `AppError` implements `IntoResponse` so handlers can bail out with `?`.
//! Collaborator failures are not errors at this level: handlers turn them
//! into notices and keep serving the page.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or blank form fields
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Validation(msg) => {
                tracing::debug!(error = %msg, "Rejected form submission");
                (StatusCode::UNPROCESSABLE_ENTITY, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
