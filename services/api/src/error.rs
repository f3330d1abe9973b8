//! Custom error types for the API service

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use common::MediaError;
use serde_json::json;
use thiserror::Error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Requested file is absent or its name is not acceptable
    #[error("Not found")]
    NotFound,

    /// Range header cannot be satisfied for a file of `size` bytes
    #[error("Range not satisfiable (size {size})")]
    RangeNotSatisfiable { size: u64 },

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::NotFound(_) | MediaError::InvalidIdentifier(_) => ApiError::NotFound,
            MediaError::Io(e) => {
                tracing::error!("Media I/O error: {}", e);
                ApiError::InternalServerError
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::RangeNotSatisfiable { size } => (
                StatusCode::RANGE_NOT_SATISFIABLE,
                [(header::CONTENT_RANGE, format!("bytes */{}", size))],
            )
                .into_response(),
            ApiError::InternalServerError => {
                let body = Json(json!({
                    "error": "Internal server error",
                }));

                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
