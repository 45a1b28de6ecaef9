//! HTTP route definitions

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers;
use crate::registry::build_router;

/// Create the main application router
pub fn create_router(state: Arc<crate::AppState>) -> Router {
    // Every registered feature route, dispatched through the registry
    let feature_routes = build_router(&state.registry);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api", get(handlers::catalog))
        .fallback(handlers::not_found)
        .with_state(state)
        .merge(feature_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
