//! AI chatbot proxy routes

use regex::Regex;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::client::UpstreamClient;
use crate::config::UpstreamConfig;
use crate::error::{AppError, Result};
use crate::registry::{handler_fn, ParamSpec, RouteDescriptor};
use crate::response::FeatureReply;

pub fn routes(client: Arc<UpstreamClient>, upstreams: &UpstreamConfig) -> Vec<RouteDescriptor> {
    let luminai_url = format!("{}/", upstreams.luminai.trim_end_matches('/'));
    let blackbox_url = format!("{}/api/chat", upstreams.blackbox.trim_end_matches('/'));

    let luminai_client = client.clone();
    let luminai = RouteDescriptor::new(
        "/api/ai/luminai",
        "LuminAI",
        "ai",
        "Chat with the LuminAI model",
        handler_fn(move |input| {
            let client = luminai_client.clone();
            let url = luminai_url.clone();
            async move {
                let content = input.required_str("content")?.to_string();
                let reply = luminai_chat(&client, &url, &content).await?;
                Ok(FeatureReply::Json(Value::String(reply)))
            }
        }),
    )
    .tags(&["ai", "chat"])
    .example("content=hi")
    .params(vec![ParamSpec::string("content", "Message to send")
        .max_length(2000)
        .example("hi")]);

    let blackbox = RouteDescriptor::new(
        "/api/ai/blackboxai",
        "Blackbox AI",
        "ai",
        "Chat with the Blackbox AI model",
        handler_fn(move |input| {
            let client = client.clone();
            let url = blackbox_url.clone();
            async move {
                let content = input.required_str("content")?.to_string();
                let reply = blackbox_chat(&client, &url, &content).await?;
                Ok(FeatureReply::Json(Value::String(reply)))
            }
        }),
    )
    .tags(&["ai", "chat"])
    .example("content=hi")
    .params(vec![ParamSpec::string("content", "Message to send")
        .max_length(2000)
        .example("hi")]);

    vec![luminai, blackbox]
}

/// Single-call JSON proxy: POST the message, read `result` from the reply
async fn luminai_chat(client: &UpstreamClient, url: &str, content: &str) -> Result<String> {
    let payload = json!({ "content": content });
    let response = client.post_json(url, &payload).await?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Upstream(format!(
            "LuminAI returned status {}",
            status
        )));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| AppError::Upstream(format!("Failed to parse upstream response: {}", e)))?;

    body.get("result")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Upstream("Failed to get response from API".to_string()))
}

/// Blackbox answers with plain text wrapped in `$@$...$@$` framing noise
async fn blackbox_chat(client: &UpstreamClient, url: &str, content: &str) -> Result<String> {
    let payload = json!({
        "messages": [{ "role": "user", "content": content }],
        "previewToken": null,
        "codeModelMode": true,
        "agentMode": {},
        "trendingAgentMode": {},
        "isMicMode": false,
        "maxTokens": 1024,
    });

    let response = client.post_json(url, &payload).await?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Upstream(format!(
            "Blackbox returned status {}",
            status
        )));
    }

    let raw = response.text().await?;
    debug!(len = raw.len(), "Blackbox raw reply");

    let cleaned = clean_blackbox_reply(&raw);
    if cleaned.is_empty() {
        return Err(AppError::Upstream(
            "Failed to get response from API".to_string(),
        ));
    }

    Ok(cleaned)
}

fn clean_blackbox_reply(raw: &str) -> String {
    let framing = Regex::new(r"\$@\$.*?\$@\$").unwrap();
    let sources = Regex::new(r"(?s)\$~~~\$.*?\$~~~\$").unwrap();
    let without_framing = framing.replace_all(raw, "");
    sources.replace_all(&without_framing, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_blackbox_reply_strips_framing() {
        let raw = "$@$v=undefined-rv1$@$Hello there!";
        assert_eq!(clean_blackbox_reply(raw), "Hello there!");
    }

    #[test]
    fn test_clean_blackbox_reply_strips_sources_block() {
        let raw = "$~~~$[{\"link\":\"x\"}]$~~~$The answer is 4.";
        assert_eq!(clean_blackbox_reply(raw), "The answer is 4.");
    }

    #[test]
    fn test_clean_blackbox_reply_plain_passthrough() {
        assert_eq!(clean_blackbox_reply("  plain reply "), "plain reply");
    }
}
