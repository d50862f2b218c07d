//! API error types.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use feedback_core::ClassifyError;

/// API errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body could not be read as JSON of the expected shape.
    #[error("invalid request body: {message}")]
    InvalidBody { status: StatusCode, message: String },

    /// Comment failed validation.
    #[error("{0}")]
    Validation(String),

    /// Remote analysis failed and no fallback was attempted.
    #[error("{0}")]
    AnalysisFailed(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<ClassifyError> for ApiError {
    fn from(err: ClassifyError) -> Self {
        match err {
            ClassifyError::Validation(_) => ApiError::Validation(err.to_string()),
            ClassifyError::Remote(_) => ApiError::AnalysisFailed(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::InvalidBody { status, .. } => (*status, "invalid_body"),
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            ApiError::AnalysisFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "analysis_failed"),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;
