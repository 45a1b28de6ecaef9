//! Text-encoding utility routes, no upstream call involved

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};

use crate::error::{AppError, Result};
use crate::registry::{handler_fn, ParamSpec, RouteDescriptor};
use crate::response::FeatureReply;

pub fn routes() -> Vec<RouteDescriptor> {
    vec![
        RouteDescriptor::new(
            "/api/tools/text2base64",
            "Text to Base64",
            "tools",
            "Encode text as base64",
            handler_fn(|input| async move {
                let text = input.required_str("text")?;
                Ok(FeatureReply::Json(json!({ "base64": BASE64.encode(text) })))
            }),
        )
        .tags(&["tools", "encoding"])
        .example("text=Hello World")
        .params(vec![ParamSpec::string("text", "Text to encode")
            .max_length(10000)
            .example("Hello World")]),
        RouteDescriptor::new(
            "/api/tools/base642text",
            "Base64 to Text",
            "tools",
            "Decode a base64 string back to text",
            handler_fn(|input| async move {
                let encoded = input.required_str("base64")?;
                Ok(FeatureReply::Json(decode_base64(encoded)?))
            }),
        )
        .tags(&["tools", "encoding"])
        .example("base64=SGVsbG8=")
        .params(vec![ParamSpec::string("base64", "Base64 string to decode")
            .max_length(20000)
            .example("SGVsbG8=")]),
        RouteDescriptor::new(
            "/api/tools/text2binary",
            "Text to Binary",
            "tools",
            "Render text as a space-separated 8-bit binary string",
            handler_fn(|input| async move {
                let content = input.required_str("content")?;
                Ok(FeatureReply::Json(Value::String(text_to_binary(content))))
            }),
        )
        .tags(&["tools", "encoding"])
        .example("content=Hi")
        .params(vec![ParamSpec::string("content", "Text to convert")
            .max_length(10000)
            .example("Hi")]),
        RouteDescriptor::new(
            "/api/tools/binary2text",
            "Binary to Text",
            "tools",
            "Decode a space-separated binary string back to text",
            handler_fn(|input| async move {
                let binary = input.required_str("binary")?;
                Ok(FeatureReply::Json(binary_to_text(binary)?))
            }),
        )
        .tags(&["tools", "encoding"])
        .example("binary=01001000 01101001")
        .params(vec![ParamSpec::string("binary", "Binary string to decode")
            .max_length(80000)
            .example("01001000 01101001")]),
    ]
}

fn decode_base64(encoded: &str) -> Result<Value> {
    let bytes = BASE64
        .decode(encoded)
        .map_err(|_| AppError::Validation("Base64 parameter is not valid base64".to_string()))?;
    let text = String::from_utf8(bytes).map_err(|_| {
        AppError::Validation("Base64 parameter does not decode to valid UTF-8".to_string())
    })?;
    Ok(json!({ "text": text }))
}

fn text_to_binary(content: &str) -> String {
    content
        .bytes()
        .map(|b| format!("{:08b}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn binary_to_text(binary: &str) -> Result<Value> {
    let bytes = binary
        .split_whitespace()
        .map(|group| {
            u8::from_str_radix(group, 2).map_err(|_| {
                AppError::Validation(format!(
                    "Binary parameter contains an invalid group '{}'",
                    group
                ))
            })
        })
        .collect::<Result<Vec<u8>>>()?;
    let text = String::from_utf8(bytes).map_err(|_| {
        AppError::Validation("Binary parameter does not decode to valid UTF-8".to_string())
    })?;
    Ok(json!({ "text": text }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_to_binary() {
        assert_eq!(text_to_binary("Hi"), "01001000 01101001");
    }

    #[test]
    fn test_binary_to_text_round() {
        let value = binary_to_text("01001000 01101001").unwrap();
        assert_eq!(value, json!({ "text": "Hi" }));
    }

    #[test]
    fn test_binary_to_text_invalid_group() {
        let err = binary_to_text("01001000 21101001").unwrap_err();
        assert!(err.to_string().contains("invalid group"));
    }

    #[test]
    fn test_decode_base64() {
        assert_eq!(decode_base64("SGVsbG8=").unwrap(), json!({ "text": "Hello" }));
        assert!(decode_base64("not base64!!").is_err());
    }

    #[test]
    fn test_route_count() {
        assert_eq!(routes().len(), 4);
    }
}
