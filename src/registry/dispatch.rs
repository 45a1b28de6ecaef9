//! Generic dispatch from registered descriptors to axum routes

use axum::body::Bytes;
use axum::extract::RawQuery;
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::MethodRouter;
use axum::Router;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::registry::descriptor::{Method, RouteDescriptor, RouteRegistry};
use crate::registry::input::{self, FeatureInput};

/// Build an axum router covering every registered descriptor
pub fn build_router(registry: &RouteRegistry) -> Router {
    let mut router = Router::new();
    for descriptor in registry.descriptors() {
        router = router.route(descriptor.path, method_router(descriptor.clone()));
    }
    router
}

fn method_router(descriptor: Arc<RouteDescriptor>) -> MethodRouter {
    let mut routes = MethodRouter::new();

    for method in descriptor.methods.clone() {
        match method {
            Method::Get => {
                let descriptor = descriptor.clone();
                routes = routes.get(move |RawQuery(query): RawQuery| async move {
                    dispatch(descriptor, parse_query(query.as_deref())).await
                });
            }
            Method::Post => {
                let descriptor = descriptor.clone();
                routes = routes.post(move |headers: HeaderMap, body: Bytes| async move {
                    dispatch(descriptor, parse_body(&headers, &body)).await
                });
            }
        }
    }

    routes
}

/// Extract input from a GET query string
fn parse_query(query: Option<&str>) -> Result<FeatureInput> {
    let query = query.unwrap_or("");
    let params: HashMap<String, String> = serde_urlencoded::from_str(query)
        .map_err(|e| AppError::Validation(format!("Invalid query string: {}", e)))?;
    Ok(FeatureInput::from_query(params))
}

/// Extract input from a POST body, JSON or form-encoded per Content-Type
fn parse_body(headers: &HeaderMap, body: &Bytes) -> Result<FeatureInput> {
    if body.is_empty() {
        return Ok(FeatureInput::default());
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if content_type.contains("application/x-www-form-urlencoded") {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|e| AppError::Validation(format!("Invalid form body: {}", e)))?;
        return Ok(FeatureInput::from_form(pairs));
    }

    // JSON is the default; fall back to form parsing for clients that omit
    // the Content-Type header
    match serde_json::from_slice(body) {
        Ok(value) => FeatureInput::from_json(value),
        Err(e) if content_type.contains("json") => {
            Err(AppError::Validation(format!("Invalid JSON body: {}", e)))
        }
        Err(_) => {
            let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
                .map_err(|_| AppError::Validation("Unsupported request body".to_string()))?;
            Ok(FeatureInput::from_form(pairs))
        }
    }
}

/// Validate declared parameters, run the handler, and build the response
async fn dispatch(descriptor: Arc<RouteDescriptor>, input: Result<FeatureInput>) -> Response {
    let request_id = Uuid::new_v4();

    let result = async {
        let input = input?;
        input::validate(&descriptor.params, &input)?;
        descriptor.handler.call(input).await
    }
    .await;

    match result {
        Ok(reply) => {
            info!(
                request_id = %request_id,
                route = %descriptor.path,
                "Request completed"
            );
            reply.into_response()
        }
        Err(e) => {
            warn!(
                request_id = %request_id,
                route = %descriptor.path,
                code = e.status_code().as_u16(),
                error = %e,
                "Request failed"
            );
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query() {
        let input = parse_query(Some("content=hi&amount=3")).unwrap();
        assert_eq!(input.str("content"), Some("hi"));
        assert_eq!(input.str("amount"), Some("3"));

        let empty = parse_query(None).unwrap();
        assert!(empty.str("content").is_none());
    }

    #[test]
    fn test_parse_json_body() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, "application/json".parse().unwrap());
        let body = Bytes::from_static(br#"{"content": "hi"}"#);
        let input = parse_body(&headers, &body).unwrap();
        assert_eq!(input.str("content"), Some("hi"));
    }

    #[test]
    fn test_parse_form_body() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            "application/x-www-form-urlencoded".parse().unwrap(),
        );
        let body = Bytes::from_static(b"content=hello%20world");
        let input = parse_body(&headers, &body).unwrap();
        assert_eq!(input.str("content"), Some("hello world"));
    }

    #[test]
    fn test_parse_empty_body() {
        let input = parse_body(&HeaderMap::new(), &Bytes::new()).unwrap();
        assert!(input.str("content").is_none());
    }

    #[test]
    fn test_invalid_json_body_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, "application/json".parse().unwrap());
        let body = Bytes::from_static(b"{not json");
        assert!(parse_body(&headers, &body).is_err());
    }
}
