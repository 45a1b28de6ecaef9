//! Route descriptor types and the registry that collects them

use async_trait::async_trait;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use tracing::info;

use crate::error::{AppError, Result};
use crate::registry::input::FeatureInput;
use crate::response::FeatureReply;

/// HTTP methods a descriptor can be mounted under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// Primitive schema for a declared parameter
#[derive(Debug, Clone)]
pub enum ParamSchema {
    String { max_length: Option<usize> },
    Integer { min: Option<i64>, max: Option<i64> },
    Boolean,
}

impl ParamSchema {
    fn type_name(&self) -> &'static str {
        match self {
            ParamSchema::String { .. } => "string",
            ParamSchema::Integer { .. } => "integer",
            ParamSchema::Boolean => "boolean",
        }
    }
}

/// One declared input field of a route
///
/// For GET requests the field arrives in the query string, for POST in the
/// body; the `location` reported in the catalog reflects that duality.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub required: bool,
    pub schema: ParamSchema,
    pub description: &'static str,
    pub example: Option<&'static str>,
}

impl ParamSpec {
    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            required: true,
            schema: ParamSchema::String { max_length: None },
            description,
            example: None,
        }
    }

    pub fn integer(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            required: true,
            schema: ParamSchema::Integer {
                min: None,
                max: None,
            },
            description,
            example: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn max_length(mut self, limit: usize) -> Self {
        if let ParamSchema::String { max_length } = &mut self.schema {
            *max_length = Some(limit);
        }
        self
    }

    pub fn range(mut self, lo: i64, hi: i64) -> Self {
        if let ParamSchema::Integer { min, max } = &mut self.schema {
            *min = Some(lo);
            *max = Some(hi);
        }
        self
    }

    pub fn example(mut self, example: &'static str) -> Self {
        self.example = Some(example);
        self
    }

    fn catalog_entry(&self) -> Value {
        let mut schema = json!({ "type": self.schema.type_name() });
        match &self.schema {
            ParamSchema::String {
                max_length: Some(limit),
            } => {
                schema["maxLength"] = json!(limit);
            }
            ParamSchema::Integer { min, max } => {
                if let Some(min) = min {
                    schema["minimum"] = json!(min);
                }
                if let Some(max) = max {
                    schema["maximum"] = json!(max);
                }
            }
            _ => {}
        }
        json!({
            "name": self.name,
            "in": "query (GET) or body (POST)",
            "required": self.required,
            "schema": schema,
            "description": self.description,
            "example": self.example,
        })
    }
}

/// The request-scoped work of one route
#[async_trait]
pub trait FeatureHandler: Send + Sync {
    async fn call(&self, input: FeatureInput) -> Result<FeatureReply>;
}

struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> FeatureHandler for FnHandler<F>
where
    F: Fn(FeatureInput) -> Fut + Send + Sync,
    Fut: Future<Output = Result<FeatureReply>> + Send,
{
    async fn call(&self, input: FeatureInput) -> Result<FeatureReply> {
        (self.0)(input).await
    }
}

/// Wrap an async closure as a route handler
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn FeatureHandler>
where
    F: Fn(FeatureInput) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<FeatureReply>> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

/// One externally reachable operation: metadata plus exactly one handler
///
/// A single descriptor is mounted under every method in `methods`, so the
/// GET and POST variants of a feature share one source of truth.
#[derive(Clone)]
pub struct RouteDescriptor {
    pub path: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub tags: Vec<&'static str>,
    pub example: Option<&'static str>,
    pub params: Vec<ParamSpec>,
    pub methods: Vec<Method>,
    pub premium: bool,
    pub maintenance: bool,
    pub public: bool,
    pub handler: Arc<dyn FeatureHandler>,
}

impl RouteDescriptor {
    pub fn new(
        path: &'static str,
        name: &'static str,
        category: &'static str,
        description: &'static str,
        handler: Arc<dyn FeatureHandler>,
    ) -> Self {
        Self {
            path,
            name,
            category,
            description,
            tags: vec![],
            example: None,
            params: vec![],
            methods: vec![Method::Get, Method::Post],
            premium: false,
            maintenance: false,
            public: true,
            handler,
        }
    }

    pub fn tags(mut self, tags: &[&'static str]) -> Self {
        self.tags = tags.to_vec();
        self
    }

    pub fn example(mut self, example: &'static str) -> Self {
        self.example = Some(example);
        self
    }

    pub fn params(mut self, params: Vec<ParamSpec>) -> Self {
        self.params = params;
        self
    }

    pub fn methods(mut self, methods: &[Method]) -> Self {
        self.methods = methods.to_vec();
        self
    }

    pub fn premium(mut self, premium: bool) -> Self {
        self.premium = premium;
        self
    }

    pub fn maintenance(mut self, maintenance: bool) -> Self {
        self.maintenance = maintenance;
        self
    }

    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    /// Catalog representation of this route's metadata
    pub fn catalog_entry(&self) -> Value {
        json!({
            "path": self.path,
            "methods": self.methods.iter().map(|m| m.to_string()).collect::<Vec<_>>(),
            "name": self.name,
            "category": self.category,
            "description": self.description,
            "tags": self.tags,
            "example": self.example,
            "params": self.params.iter().map(|p| p.catalog_entry()).collect::<Vec<_>>(),
            "premium": self.premium,
            "maintenance": self.maintenance,
            "public": self.public,
        })
    }
}

/// Collection of all registered route descriptors
pub struct RouteRegistry {
    descriptors: Vec<Arc<RouteDescriptor>>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }

    /// Register a descriptor, rejecting path/method collisions
    pub fn register(&mut self, descriptor: RouteDescriptor) -> Result<()> {
        for existing in &self.descriptors {
            if existing.path == descriptor.path
                && existing.methods.iter().any(|m| descriptor.methods.contains(m))
            {
                return Err(AppError::Internal(format!(
                    "Route '{}' is already registered",
                    descriptor.path
                )));
            }
        }

        info!(path = %descriptor.path, category = %descriptor.category, "Route registered");
        self.descriptors.push(Arc::new(descriptor));
        Ok(())
    }

    pub fn descriptors(&self) -> &[Arc<RouteDescriptor>] {
        &self.descriptors
    }

    pub fn find(&self, path: &str) -> Option<&Arc<RouteDescriptor>> {
        self.descriptors.iter().find(|d| d.path == path)
    }

    /// Route counts for the health endpoint: (total, public, premium, maintenance)
    pub fn counts(&self) -> (usize, usize, usize, usize) {
        let total = self.descriptors.len();
        let public = self.descriptors.iter().filter(|d| d.public).count();
        let premium = self.descriptors.iter().filter(|d| d.premium).count();
        let maintenance = self.descriptors.iter().filter(|d| d.maintenance).count();
        (total, public, premium, maintenance)
    }

    /// Full catalog of every registered route
    pub fn catalog(&self) -> Value {
        Value::Array(
            self.descriptors
                .iter()
                .map(|d| d.catalog_entry())
                .collect(),
        )
    }
}

impl Default for RouteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_descriptor(path: &'static str) -> RouteDescriptor {
        RouteDescriptor::new(
            path,
            "Test",
            "test",
            "test route",
            handler_fn(|_input| async { Ok(FeatureReply::Json(json!(null))) }),
        )
    }

    #[test]
    fn test_register_and_find() {
        let mut registry = RouteRegistry::new();
        registry.register(noop_descriptor("/api/test/a")).unwrap();
        registry.register(noop_descriptor("/api/test/b")).unwrap();

        assert_eq!(registry.descriptors().len(), 2);
        assert!(registry.find("/api/test/a").is_some());
        assert!(registry.find("/api/test/c").is_none());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = RouteRegistry::new();
        registry.register(noop_descriptor("/api/test/a")).unwrap();
        assert!(registry.register(noop_descriptor("/api/test/a")).is_err());
    }

    #[test]
    fn test_descriptor_defaults_to_both_methods() {
        let descriptor = noop_descriptor("/api/test/a");
        assert_eq!(descriptor.methods, vec![Method::Get, Method::Post]);
        assert!(descriptor.public);
        assert!(!descriptor.premium);
        assert!(!descriptor.maintenance);
    }

    #[test]
    fn test_catalog_entry_shape() {
        let descriptor = noop_descriptor("/api/test/a")
            .tags(&["test"])
            .example("text=hi")
            .params(vec![ParamSpec::string("text", "input text").max_length(100)]);

        let entry = descriptor.catalog_entry();
        assert_eq!(entry["path"], "/api/test/a");
        assert_eq!(entry["methods"], json!(["GET", "POST"]));
        assert_eq!(entry["params"][0]["name"], "text");
        assert_eq!(entry["params"][0]["schema"]["maxLength"], 100);
    }

    #[test]
    fn test_counts() {
        let mut registry = RouteRegistry::new();
        registry.register(noop_descriptor("/a")).unwrap();
        registry
            .register(noop_descriptor("/b").premium(true).public(false))
            .unwrap();

        let (total, public, premium, maintenance) = registry.counts();
        assert_eq!(total, 2);
        assert_eq!(public, 1);
        assert_eq!(premium, 1);
        assert_eq!(maintenance, 0);
    }
}
