//! Handlers for the service-level endpoints (health, catalog, fallback)

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;

use crate::api::models::{HealthResponse, RouteSummary};
use crate::response::success;
use crate::AppState;

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (total, public, premium, maintenance) = state.registry.counts();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        routes: RouteSummary {
            total,
            public,
            premium,
            maintenance,
        },
    })
}

/// Route catalog: the documentation metadata of every registered route
pub async fn catalog(State(state): State<Arc<AppState>>) -> Response {
    success(state.registry.catalog())
}

/// Unknown paths get the failure envelope rather than a bare 404
pub async fn not_found() -> Response {
    let body = json!({
        "status": false,
        "error": "Route not found",
        "code": 404,
    });
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}
