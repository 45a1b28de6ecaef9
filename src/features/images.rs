//! Random-image routes, answering with raw bytes instead of the envelope

use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::client::UpstreamClient;
use crate::config::UpstreamConfig;
use crate::error::{AppError, Result};
use crate::registry::{handler_fn, RouteDescriptor};
use crate::response::FeatureReply;

pub fn routes(client: Arc<UpstreamClient>, upstreams: &UpstreamConfig) -> Vec<RouteDescriptor> {
    let base = upstreams.image.trim_end_matches('/').to_string();

    let waifu = RouteDescriptor::new(
        "/api/images/waifu",
        "Random Waifu",
        "images",
        "Random anime-style image, served as raw bytes",
        handler_fn(move |_input| {
            let client = client.clone();
            let base = base.clone();
            async move {
                let (bytes, content_type) = fetch_random_image(&client, &base, "waifu").await?;
                Ok(FeatureReply::Binary {
                    bytes,
                    content_type,
                })
            }
        }),
    )
    .tags(&["images", "anime"]);

    vec![waifu]
}

/// Two sequential upstream calls: resolve the random image URL, then fetch
/// the image itself.
async fn fetch_random_image(
    client: &UpstreamClient,
    base: &str,
    kind: &str,
) -> Result<(Vec<u8>, String)> {
    let meta: Value = client.get_json(&format!("{}/sfw/{}", base, kind)).await?;

    let image_url = meta
        .get("url")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::Upstream("Image API returned no URL".to_string()))?;

    let (bytes, content_type) = client.get_bytes(image_url).await?;
    if bytes.is_empty() {
        return Err(AppError::Upstream("Image payload was empty".to_string()));
    }

    let content_type = content_type
        .filter(|ct| ct.starts_with("image/"))
        .unwrap_or_else(|| guess_content_type(image_url));
    debug!(url = %image_url, content_type = %content_type, "Fetched random image");

    Ok((bytes, content_type))
}

fn guess_content_type(url: &str) -> String {
    let path = url.split('?').next().unwrap_or(url).to_lowercase();
    if path.ends_with(".png") {
        "image/png".to_string()
    } else if path.ends_with(".gif") {
        "image/gif".to_string()
    } else if path.ends_with(".webp") {
        "image/webp".to_string()
    } else {
        "image/jpeg".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type("https://x/img.png"), "image/png");
        assert_eq!(guess_content_type("https://x/img.PNG?w=1"), "image/png");
        assert_eq!(guess_content_type("https://x/img.gif"), "image/gif");
        assert_eq!(guess_content_type("https://x/img"), "image/jpeg");
    }
}
