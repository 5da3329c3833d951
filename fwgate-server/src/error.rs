//! Error types for fwgate-server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fwgate_core::{ErrorKind, GateError};
use serde::Serialize;

/// Errors surfaced at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Lookup, decision or file resolution failed.
    #[error(transparent)]
    Gate(#[from] GateError),

    /// The request itself is malformed (missing query parameters, etc.).
    #[error("{0}")]
    BadRequest(String),

    /// Unexpected failure building the response.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Human-readable cause.
    pub detail: String,
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Gate(err) => match err.kind() {
                ErrorKind::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Forbidden => StatusCode::FORBIDDEN,
                ErrorKind::InvalidVersion => StatusCode::BAD_REQUEST,
                ErrorKind::Io => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.to_string();

        if status.is_server_error() {
            tracing::error!(%status, detail = %detail, "Request failed");
        } else if status == StatusCode::FORBIDDEN {
            tracing::warn!(%status, detail = %detail, "Request refused");
        } else {
            tracing::debug!(%status, detail = %detail, "Request rejected");
        }

        (status, Json(ErrorBody { detail })).into_response()
    }
}

/// Result type alias for handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
