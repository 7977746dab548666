use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::store::StoreError;

/// API error with a stable textual code, rendered as a JSON envelope
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] StoreError),

    #[error("internal server error: {0}")]
    Internal(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("vocabulary not found")]
    VocabularyNotFound,

    #[error("video not found")]
    VideoNotFound,

    #[error("vocabulary rebuild already in progress")]
    ReindexInProgress,
}

impl ApiError {
    /// Stable textual error code carried in the response body
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "INVALID_REQUEST",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Database(_) => "DATABASE_ERROR",
            ApiError::Internal(_) => "INTERNAL_SERVER_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::VocabularyNotFound => "VOCABULARY_NOT_FOUND",
            ApiError::VideoNotFound => "VIDEO_NOT_FOUND",
            ApiError::ReindexInProgress => "REINDEX_IN_PROGRESS",
        }
    }

    /// HTTP status the code maps to
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::VocabularyNotFound => StatusCode::NOT_FOUND,
            ApiError::VideoNotFound => StatusCode::NOT_FOUND,
            ApiError::ReindexInProgress => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        let body = serde_json::json!({
            "code": self.code(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
