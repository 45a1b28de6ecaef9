//! Unified request input, extracted from the query string or the body
//!
//! The same handler serves GET and POST: the dispatcher builds a
//! `FeatureInput` from whichever source the method uses and validates it
//! against the route's declared parameters before the handler runs.

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::{AppError, Result};
use crate::registry::descriptor::{ParamSchema, ParamSpec};

/// Request input fields, keyed by parameter name
#[derive(Debug, Clone, Default)]
pub struct FeatureInput {
    values: Map<String, Value>,
}

impl FeatureInput {
    /// Build from GET query parameters
    pub fn from_query(params: HashMap<String, String>) -> Self {
        let values = params
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        Self { values }
    }

    /// Build from a parsed JSON body (must be an object)
    pub fn from_json(body: Value) -> Result<Self> {
        match body {
            Value::Object(values) => Ok(Self { values }),
            Value::Null => Ok(Self::default()),
            _ => Err(AppError::Validation(
                "Request body must be a JSON object".to_string(),
            )),
        }
    }

    /// Build from form-encoded body pairs
    pub fn from_form(pairs: Vec<(String, String)>) -> Self {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        Self { values }
    }

    /// Raw value of a field
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// String value of a field, if present and a string
    pub fn str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(|v| v.as_str())
    }

    /// Required string field; validation has already checked presence, this
    /// guards handlers called outside the dispatcher (tests, reuse)
    pub fn required_str(&self, name: &str) -> Result<&str> {
        self.str(name)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Validation(format!("{} parameter is required", title(name))))
    }

    /// Integer field with a default, accepting JSON numbers and numeric strings
    pub fn int_or(&self, name: &str, default: i64) -> Result<i64> {
        match self.values.get(name) {
            None => Ok(default),
            Some(Value::Number(n)) => n.as_i64().ok_or_else(|| {
                AppError::Validation(format!("{} parameter must be an integer", title(name)))
            }),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(default),
            Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| {
                AppError::Validation(format!("{} parameter must be an integer", title(name)))
            }),
            Some(_) => Err(AppError::Validation(format!(
                "{} parameter must be an integer",
                title(name)
            ))),
        }
    }
}

/// Validate an input against the declared parameter list
///
/// Returns the first violation as a field-specific validation error.
pub fn validate(params: &[ParamSpec], input: &FeatureInput) -> Result<()> {
    for spec in params {
        let value = input.get(spec.name);

        let value = match value {
            None | Some(Value::Null) => {
                if spec.required {
                    return Err(AppError::Validation(format!(
                        "{} parameter is required",
                        title(spec.name)
                    )));
                }
                continue;
            }
            Some(v) => v,
        };

        match &spec.schema {
            ParamSchema::String { max_length } => {
                let s = value.as_str().ok_or_else(|| {
                    AppError::Validation(format!(
                        "{} parameter must be a string",
                        title(spec.name)
                    ))
                })?;
                if s.trim().is_empty() {
                    if spec.required {
                        return Err(AppError::Validation(format!(
                            "{} parameter cannot be empty",
                            title(spec.name)
                        )));
                    }
                    continue;
                }
                if let Some(limit) = max_length {
                    if s.chars().count() > *limit {
                        return Err(AppError::Validation(format!(
                            "{} parameter exceeds maximum length of {} characters",
                            title(spec.name),
                            limit
                        )));
                    }
                }
            }
            ParamSchema::Integer { min, max } => {
                let n = match value {
                    Value::Number(n) => n.as_i64(),
                    Value::String(s) => s.trim().parse::<i64>().ok(),
                    _ => None,
                }
                .ok_or_else(|| {
                    AppError::Validation(format!(
                        "{} parameter must be an integer",
                        title(spec.name)
                    ))
                })?;
                if let Some(min) = min {
                    if n < *min {
                        return Err(AppError::Validation(format!(
                            "{} parameter must be at least {}",
                            title(spec.name),
                            min
                        )));
                    }
                }
                if let Some(max) = max {
                    if n > *max {
                        return Err(AppError::Validation(format!(
                            "{} parameter must be at most {}",
                            title(spec.name),
                            max
                        )));
                    }
                }
            }
            ParamSchema::Boolean => {
                let ok = matches!(value, Value::Bool(_))
                    || matches!(
                        value.as_str().map(str::to_lowercase).as_deref(),
                        Some("true") | Some("false")
                    );
                if !ok {
                    return Err(AppError::Validation(format!(
                        "{} parameter must be a boolean",
                        title(spec.name)
                    )));
                }
            }
        }
    }

    Ok(())
}

/// Capitalize a parameter name for error messages ("content" -> "Content")
fn title(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn content_param() -> Vec<ParamSpec> {
        vec![ParamSpec::string("content", "input text").max_length(10)]
    }

    #[test]
    fn test_missing_required_field() {
        let input = FeatureInput::from_query(HashMap::new());
        let err = validate(&content_param(), &input).unwrap_err();
        assert_eq!(err.to_string(), "Content parameter is required");
    }

    #[test]
    fn test_whitespace_only_field() {
        let mut params = HashMap::new();
        params.insert("content".to_string(), "   ".to_string());
        let input = FeatureInput::from_query(params);
        let err = validate(&content_param(), &input).unwrap_err();
        assert_eq!(err.to_string(), "Content parameter cannot be empty");
    }

    #[test]
    fn test_oversized_field() {
        let mut params = HashMap::new();
        params.insert("content".to_string(), "a".repeat(11));
        let input = FeatureInput::from_query(params);
        let err = validate(&content_param(), &input).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Content parameter exceeds maximum length of 10 characters"
        );
    }

    #[test]
    fn test_valid_field_passes() {
        let mut params = HashMap::new();
        params.insert("content".to_string(), "hello".to_string());
        let input = FeatureInput::from_query(params);
        assert!(validate(&content_param(), &input).is_ok());
    }

    #[test]
    fn test_optional_field_absent() {
        let specs = vec![ParamSpec::integer("amount", "how many").optional().range(1, 20)];
        let input = FeatureInput::from_query(HashMap::new());
        assert!(validate(&specs, &input).is_ok());
    }

    #[test]
    fn test_integer_range() {
        let specs = vec![ParamSpec::integer("amount", "how many").range(1, 20)];

        let mut params = HashMap::new();
        params.insert("amount".to_string(), "25".to_string());
        let input = FeatureInput::from_query(params);
        let err = validate(&specs, &input).unwrap_err();
        assert_eq!(err.to_string(), "Amount parameter must be at most 20");

        let mut params = HashMap::new();
        params.insert("amount".to_string(), "abc".to_string());
        let input = FeatureInput::from_query(params);
        let err = validate(&specs, &input).unwrap_err();
        assert_eq!(err.to_string(), "Amount parameter must be an integer");
    }

    #[test]
    fn test_json_body_must_be_object() {
        assert!(FeatureInput::from_json(json!({"content": "hi"})).is_ok());
        assert!(FeatureInput::from_json(json!(null)).is_ok());
        assert!(FeatureInput::from_json(json!([1, 2])).is_err());
    }

    #[test]
    fn test_wrong_type_in_json_body() {
        let input = FeatureInput::from_json(json!({"content": 42})).unwrap();
        let err = validate(&content_param(), &input).unwrap_err();
        assert_eq!(err.to_string(), "Content parameter must be a string");
    }

    #[test]
    fn test_int_or_accessor() {
        let input = FeatureInput::from_json(json!({"amount": 7})).unwrap();
        assert_eq!(input.int_or("amount", 5).unwrap(), 7);

        let input = FeatureInput::from_query(HashMap::new());
        assert_eq!(input.int_or("amount", 5).unwrap(), 5);
    }

    #[test]
    fn test_required_str_trims() {
        let input = FeatureInput::from_json(json!({"content": "  hi  "})).unwrap();
        assert_eq!(input.required_str("content").unwrap(), "hi");
    }
}
