//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::detector::DetectorError;

pub type AppResult<T> = Result<T, AppError>;

/// Message for a predict request without account data
pub const NO_ACCOUNT_DATA: &str = "No account data provided";

#[derive(Debug)]
pub enum AppError {
    // Client input errors
    ValidationError(String),

    // Training or prediction failures, reported verbatim
    ProcessingError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::ProcessingError(msg) => {
                tracing::error!("Processing error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<DetectorError> for AppError {
    fn from(err: DetectorError) -> Self {
        if err.is_client_error() {
            AppError::ValidationError(err.to_string())
        } else {
            AppError::ProcessingError(err.to_string())
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::ProcessingError(err.to_string())
    }
}
