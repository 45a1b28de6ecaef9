//! Application error types and their HTTP mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Convenience result type used throughout the crate
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error
///
/// A closed set of failure kinds, each carrying a human-readable message and
/// mapping to one HTTP status code. Handlers construct these once instead of
/// re-deriving ad hoc strings per route.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request input failed validation (missing, empty, oversized, wrong type)
    #[error("{0}")]
    Validation(String),

    /// Upstream succeeded but the requested entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Upstream succeeded but yielded nothing usable
    #[error("{0}")]
    EmptyResult(String),

    /// Upstream returned a non-success status or an unexpected payload shape
    #[error("{0}")]
    Upstream(String),

    /// Network-level failure from the HTTP client
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Configuration load or validation failure
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Anything else
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status code this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::EmptyResult(_) => StatusCode::NOT_FOUND,
            AppError::Upstream(_)
            | AppError::HttpClient(_)
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "status": false,
            "error": self.to_string(),
            "code": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            AppError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("gone".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::EmptyResult("nothing".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Upstream("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_message_passthrough() {
        let err = AppError::Validation("Content parameter is required".into());
        assert_eq!(err.to_string(), "Content parameter is required");
    }
}
