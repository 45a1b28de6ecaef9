//! The normalized response envelope shared by every JSON-producing route
//!
//! Success: `{"status": true, "data": ..., "timestamp": "<ISO-8601>"}`
//! Failure: `{"status": false, "error": "...", "code": <u16>}` (built by
//! `AppError::into_response`). Image routes bypass the envelope and answer
//! with raw bytes plus a fixed header set.

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;

/// What a feature handler produces: either a JSON value destined for the
/// success envelope, or raw bytes for image-producing routes.
#[derive(Debug)]
pub enum FeatureReply {
    Json(serde_json::Value),
    Binary {
        bytes: Vec<u8>,
        content_type: String,
    },
}

impl FeatureReply {
    pub fn json<T: Serialize>(data: T) -> crate::error::Result<Self> {
        let value = serde_json::to_value(data)
            .map_err(|e| crate::error::AppError::Internal(format!("Serialization error: {}", e)))?;
        Ok(FeatureReply::Json(value))
    }
}

impl IntoResponse for FeatureReply {
    fn into_response(self) -> Response {
        match self {
            FeatureReply::Json(data) => success(data),
            FeatureReply::Binary {
                bytes,
                content_type,
            } => binary(bytes, &content_type),
        }
    }
}

/// Wrap a value in the success envelope
pub fn success<T: Serialize>(data: T) -> Response {
    let body = json!({
        "status": true,
        "data": data,
        "timestamp": Utc::now().to_rfc3339(),
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// Build a binary response for image routes
pub fn binary(bytes: Vec<u8>, content_type: &str) -> Response {
    match Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, bytes.len())
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from(bytes))
    {
        Ok(response) => response,
        Err(e) => crate::error::AppError::Internal(format!("Response build error: {}", e))
            .into_response(),
    }
}
