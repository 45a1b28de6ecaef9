//! Profile lookup routes (JSON reshaping over public APIs)

use serde_json::{json, Value};
use std::sync::Arc;

use crate::client::UpstreamClient;
use crate::config::UpstreamConfig;
use crate::error::{AppError, Result};
use crate::registry::{handler_fn, ParamSpec, RouteDescriptor};
use crate::response::FeatureReply;

pub fn routes(client: Arc<UpstreamClient>, upstreams: &UpstreamConfig) -> Vec<RouteDescriptor> {
    let github_base = upstreams.github.trim_end_matches('/').to_string();
    let npm_base = upstreams.npm.trim_end_matches('/').to_string();

    let github_client = client.clone();
    let github = RouteDescriptor::new(
        "/api/stalker/github",
        "GitHub Stalker",
        "stalker",
        "Public profile details of a GitHub user",
        handler_fn(move |input| {
            let client = github_client.clone();
            let base = github_base.clone();
            async move {
                let username = input.required_str("username")?.to_string();
                let profile = fetch_github_user(&client, &base, &username).await?;
                Ok(FeatureReply::Json(profile))
            }
        }),
    )
    .tags(&["stalker", "github"])
    .example("username=octocat")
    .params(vec![ParamSpec::string("username", "GitHub username")
        .max_length(39)
        .example("octocat")]);

    let npm = RouteDescriptor::new(
        "/api/stalker/npm",
        "NPM Stalker",
        "stalker",
        "Registry details of an npm package",
        handler_fn(move |input| {
            let client = client.clone();
            let base = npm_base.clone();
            async move {
                let package = input.required_str("package")?.to_string();
                let details = fetch_npm_package(&client, &base, &package).await?;
                Ok(FeatureReply::Json(details))
            }
        }),
    )
    .tags(&["stalker", "npm"])
    .example("package=axios")
    .params(vec![ParamSpec::string("package", "Package name")
        .max_length(214)
        .example("axios")]);

    vec![github, npm]
}

async fn fetch_github_user(
    client: &UpstreamClient,
    base: &str,
    username: &str,
) -> Result<Value> {
    let response = client.get(&format!("{}/users/{}", base, username)).await?;

    let status = response.status();
    if status.as_u16() == 404 {
        return Err(AppError::NotFound("GitHub user not found".to_string()));
    }
    if !status.is_success() {
        return Err(AppError::Upstream(format!(
            "GitHub returned status {}",
            status
        )));
    }

    let user: Value = response
        .json()
        .await
        .map_err(|e| AppError::Upstream(format!("Failed to parse upstream response: {}", e)))?;

    Ok(json!({
        "username": user.get("login").cloned().unwrap_or(Value::Null),
        "name": user.get("name").cloned().unwrap_or(Value::Null),
        "bio": user.get("bio").cloned().unwrap_or(Value::Null),
        "avatar": user.get("avatar_url").cloned().unwrap_or(Value::Null),
        "company": user.get("company").cloned().unwrap_or(Value::Null),
        "blog": user.get("blog").cloned().unwrap_or(Value::Null),
        "location": user.get("location").cloned().unwrap_or(Value::Null),
        "followers": user.get("followers").cloned().unwrap_or(Value::Null),
        "following": user.get("following").cloned().unwrap_or(Value::Null),
        "public_repos": user.get("public_repos").cloned().unwrap_or(Value::Null),
        "created_at": user.get("created_at").cloned().unwrap_or(Value::Null),
    }))
}

async fn fetch_npm_package(
    client: &UpstreamClient,
    base: &str,
    package: &str,
) -> Result<Value> {
    let response = client.get(&format!("{}/{}", base, package)).await?;

    let status = response.status();
    if status.as_u16() == 404 {
        return Err(AppError::NotFound("Package not found".to_string()));
    }
    if !status.is_success() {
        return Err(AppError::Upstream(format!(
            "Registry returned status {}",
            status
        )));
    }

    let doc: Value = response
        .json()
        .await
        .map_err(|e| AppError::Upstream(format!("Failed to parse upstream response: {}", e)))?;

    let latest = doc
        .pointer("/dist-tags/latest")
        .cloned()
        .unwrap_or(Value::Null);
    let maintainers = doc
        .get("maintainers")
        .and_then(|v| v.as_array())
        .map(|a| a.len())
        .unwrap_or(0);

    Ok(json!({
        "name": doc.get("name").cloned().unwrap_or(Value::Null),
        "version": latest,
        "description": doc.get("description").cloned().unwrap_or(Value::Null),
        "license": license_name(&doc),
        "homepage": doc.get("homepage").cloned().unwrap_or(Value::Null),
        "maintainers": maintainers,
        "modified": doc.pointer("/time/modified").cloned().unwrap_or(Value::Null),
    }))
}

/// The registry reports licenses as either a plain string or `{type, url}`
fn license_name(doc: &Value) -> Value {
    match doc.get("license") {
        Some(Value::String(s)) => Value::String(s.clone()),
        Some(Value::Object(o)) => o.get("type").cloned().unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_license_name_variants() {
        assert_eq!(
            license_name(&json!({ "license": "MIT" })),
            Value::String("MIT".to_string())
        );
        assert_eq!(
            license_name(&json!({ "license": { "type": "ISC", "url": "x" } })),
            Value::String("ISC".to_string())
        );
        assert_eq!(license_name(&json!({})), Value::Null);
    }
}
