//! Shared outbound HTTP client
//!
//! One `reqwest` client wrapped with the behavior every wrapper route needs:
//! a browser-like User-Agent rotated per request, a configurable total
//! timeout, optional retry with exponential backoff for the handful of
//! routes that scrape flaky news portals, and an optional forwarding-proxy
//! prefix applied to outbound URLs.

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::{ClientConfig, ProxyConfig};
use crate::error::{AppError, Result};

/// User agents rotated through to look like a regular browser
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

/// Outbound HTTP client shared by all feature handlers
pub struct UpstreamClient {
    client: Client,
    config: ClientConfig,
    proxy_base: Option<String>,
}

impl UpstreamClient {
    /// Create a new client from configuration
    ///
    /// The proxy resolver is injected here rather than looked up ambiently by
    /// individual handlers.
    pub fn new(config: &ClientConfig, proxy: &ProxyConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,application/json;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let proxy_base = if proxy.enabled {
            proxy
                .base_url
                .as_ref()
                .map(|base| base.trim_end_matches('/').to_string())
        } else {
            None
        };

        Ok(Self {
            client,
            config: config.clone(),
            proxy_base,
        })
    }

    /// Get a random user agent from the pool
    fn random_user_agent() -> &'static str {
        let mut rng = rand::thread_rng();
        USER_AGENTS[rng.gen_range(0..USER_AGENTS.len())]
    }

    /// Apply the forwarding-proxy prefix, if one is configured
    pub fn proxied(&self, url: &str) -> String {
        match &self.proxy_base {
            Some(base) => format!("{}/{}", base, url),
            None => url.to_string(),
        }
    }

    /// Calculate retry delay with exponential backoff and jitter
    fn retry_delay(&self, attempt: u32) -> Duration {
        let base = self.config.initial_retry_delay_ms;
        let capped = (base * 2u64.pow(attempt)).min(self.config.max_retry_delay_ms);
        let jitter = rand::thread_rng().gen_range(0.75..=1.25);
        Duration::from_millis((capped as f64 * jitter) as u64)
    }

    /// Whether a status code is worth retrying
    fn is_retryable_status(status: StatusCode) -> bool {
        matches!(
            status.as_u16(),
            429 | 500 | 502 | 503 | 504 | 520 | 521 | 522 | 523 | 524 | 525 | 526 | 527
        )
    }

    /// Issue a single GET request
    pub async fn get(&self, url: &str) -> Result<Response> {
        let target = self.proxied(url);
        let response = self
            .client
            .get(&target)
            .header("User-Agent", Self::random_user_agent())
            .send()
            .await?;
        Ok(response)
    }

    /// GET with retry on transient failures
    ///
    /// Retries connect/timeout errors and retryable statuses (429, 5xx,
    /// Cloudflare 52x) up to `max_retries` times with exponential backoff.
    pub async fn get_with_retry(&self, url: &str) -> Result<Response> {
        let target = self.proxied(url);
        let mut last_error: Option<reqwest::Error> = None;

        for attempt in 0..=self.config.max_retries {
            let request = self
                .client
                .get(&target)
                .header("User-Agent", Self::random_user_agent());

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if Self::is_retryable_status(status) && attempt < self.config.max_retries {
                        warn!(
                            url = %target,
                            status = %status,
                            attempt = attempt + 1,
                            "Retryable upstream status"
                        );
                        sleep(self.retry_delay(attempt)).await;
                        continue;
                    }
                    return Ok(response);
                }
                Err(e) => {
                    let should_retry = e.is_timeout() || e.is_connect() || e.is_request();
                    if should_retry && attempt < self.config.max_retries {
                        warn!(
                            url = %target,
                            attempt = attempt + 1,
                            error = %e,
                            "Upstream request failed, retrying"
                        );
                        sleep(self.retry_delay(attempt)).await;
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }

        match last_error {
            Some(e) => Err(e.into()),
            None => Err(AppError::Internal("Retry loop exhausted".to_string())),
        }
    }

    /// POST a JSON body and return the response
    pub async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<Response> {
        let target = self.proxied(url);
        let response = self
            .client
            .post(&target)
            .header("User-Agent", Self::random_user_agent())
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;
        Ok(response)
    }

    /// GET a page and return its body text, failing on non-success statuses
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.get(url).await?;
        Self::require_success(&response)?;
        Ok(response.text().await?)
    }

    /// GET a page with retry and return its body text
    pub async fn get_text_with_retry(&self, url: &str) -> Result<String> {
        let response = self.get_with_retry(url).await?;
        Self::require_success(&response)?;
        Ok(response.text().await?)
    }

    /// GET a JSON resource and deserialize it
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.get(url).await?;
        Self::require_success(&response)?;
        let value = response
            .json::<T>()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse upstream response: {}", e)))?;
        Ok(value)
    }

    /// GET raw bytes along with the reported content type
    pub async fn get_bytes(&self, url: &str) -> Result<(Vec<u8>, Option<String>)> {
        let response = self.get(url).await?;
        Self::require_success(&response)?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let bytes = response.bytes().await?;
        debug!(url = %url, len = bytes.len(), "Fetched binary payload");
        Ok((bytes.to_vec(), content_type))
    }

    /// Map a non-success status to an upstream error
    fn require_success(response: &Response) -> Result<()> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound("Upstream resource not found".to_string()));
        }
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "Upstream returned status {}",
                status
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn test_client(proxy: ProxyConfig) -> UpstreamClient {
        let settings = Settings::default();
        UpstreamClient::new(&settings.client, &proxy).unwrap()
    }

    #[test]
    fn test_random_user_agent_from_pool() {
        let ua = UpstreamClient::random_user_agent();
        assert!(USER_AGENTS.contains(&ua));
    }

    #[test]
    fn test_retryable_status() {
        assert!(UpstreamClient::is_retryable_status(
            StatusCode::TOO_MANY_REQUESTS
        ));
        assert!(UpstreamClient::is_retryable_status(
            StatusCode::INTERNAL_SERVER_ERROR
        ));
        assert!(UpstreamClient::is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(!UpstreamClient::is_retryable_status(StatusCode::NOT_FOUND));
        assert!(!UpstreamClient::is_retryable_status(StatusCode::FORBIDDEN));
    }

    #[test]
    fn test_retry_delay_grows() {
        let client = test_client(ProxyConfig::default());
        let d0 = client.retry_delay(0);
        let d2 = client.retry_delay(2);
        assert!(d0.as_millis() > 0);
        assert!(d2.as_millis() >= d0.as_millis());
    }

    #[test]
    fn test_proxied_url() {
        let client = test_client(ProxyConfig {
            enabled: true,
            base_url: Some("https://proxy.example.com/fetch/".to_string()),
        });
        assert_eq!(
            client.proxied("https://upstream.example.com/page"),
            "https://proxy.example.com/fetch/https://upstream.example.com/page"
        );

        let plain = test_client(ProxyConfig::default());
        assert_eq!(
            plain.proxied("https://upstream.example.com/page"),
            "https://upstream.example.com/page"
        );
    }
}
