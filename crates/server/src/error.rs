//! API error type
//!
//! Every failure leaves the server as `{"detail": "..."}` with a matching
//! status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use omnicall_directory_core::Error as DirectoryError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request was malformed or failed validation
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Something broke on our side; `detail` is safe to show, `source` is logged
    #[error("{detail}: {source}")]
    Internal {
        detail: &'static str,
        source: DirectoryError,
    },
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::BadRequest(detail.into())
    }

    /// Wrap a store failure, turning validation errors into 400s
    pub fn from_store(detail: &'static str, err: DirectoryError) -> Self {
        match err {
            DirectoryError::InvalidInput(message) => Self::BadRequest(message),
            DirectoryError::NotFound { entity, key } => Self::NotFound(format!("{} not found: {}", entity, key)),
            source => Self::Internal { detail, source },
        }
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match &self {
            Self::BadRequest(detail) | Self::NotFound(detail) => detail.clone(),
            Self::Internal { detail, source } => {
                error!("{}: {}", detail, source);
                detail.to_string()
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
