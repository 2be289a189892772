//! Typed errors at the catalog and HTTP boundaries.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::path::PathBuf;
use thiserror::Error;

/// Why the persisted catalog could not be used. Never fatal: callers fall back.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog unavailable at {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog at {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Request-level failures surfaced to the caller; the pipeline never runs for these.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("unsupported upload type: {content_type}")]
    UnsupportedMedia { content_type: String },

    #[error("could not extract text: {reason}")]
    Extraction { reason: String },
}

impl ApiError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMedia { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Extraction { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::info!(%status, error = %self, "request rejected");
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
