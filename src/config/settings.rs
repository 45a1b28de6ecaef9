//! Application settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub client: ClientConfig,
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub upstreams: UpstreamConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

/// Outbound HTTP client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_retry_delay")]
    pub initial_retry_delay_ms: u64,
    #[serde(default = "default_max_retry_delay")]
    pub max_retry_delay_ms: u64,
}

fn default_timeout() -> u64 {
    30000
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_retry_delay() -> u64 {
    500
}

fn default_max_retry_delay() -> u64 {
    8000
}

/// Forwarding proxy configuration
///
/// When enabled, outbound URLs are rewritten to `<base_url><url>` so that
/// upstream calls route through a forwarding proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProxyConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Base URLs of the wrapped upstream services, one per feature family
///
/// Every field carries its production default and can be overridden through
/// the config file, the upstream override file, or the environment - tests
/// point these at a local mock server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_luminai_url")]
    pub luminai: String,
    #[serde(default = "default_blackbox_url")]
    pub blackbox: String,
    #[serde(default = "default_anime_url")]
    pub anime: String,
    #[serde(default = "default_news_url")]
    pub news: String,
    #[serde(default = "default_quiz_url")]
    pub quiz: String,
    #[serde(default = "default_image_url")]
    pub image: String,
    #[serde(default = "default_github_url")]
    pub github: String,
    #[serde(default = "default_npm_url")]
    pub npm: String,
}

fn default_luminai_url() -> String {
    "https://luminai.my.id".to_string()
}

fn default_blackbox_url() -> String {
    "https://api.blackbox.ai".to_string()
}

fn default_anime_url() -> String {
    "https://otakudesu.cloud".to_string()
}

fn default_news_url() -> String {
    "https://www.antaranews.com".to_string()
}

fn default_quiz_url() -> String {
    "https://opentdb.com".to_string()
}

fn default_image_url() -> String {
    "https://api.waifu.pics".to_string()
}

fn default_github_url() -> String {
    "https://api.github.com".to_string()
}

fn default_npm_url() -> String {
    "https://registry.npmjs.org".to_string()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            luminai: default_luminai_url(),
            blackbox: default_blackbox_url(),
            anime: default_anime_url(),
            news: default_news_url(),
            quiz: default_quiz_url(),
            image: default_image_url(),
            github: default_github_url(),
            npm: default_npm_url(),
        }
    }
}

impl Settings {
    /// Load settings from configuration files and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_paths("config/gateway.yaml", Some("config/upstreams.yaml"))
    }

    /// Load settings from specific configuration file paths
    pub fn load_from_paths<P: AsRef<Path>>(
        gateway_config: P,
        upstreams_config: Option<P>,
    ) -> Result<Self> {
        let gateway_path = gateway_config.as_ref();

        let format = if gateway_path
            .extension()
            .map_or(false, |ext| ext == "yaml" || ext == "yml")
        {
            FileFormat::Yaml
        } else {
            FileFormat::Toml
        };

        let mut config_builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("client.timeout_ms", 30000)?
            .set_default("client.max_retries", 3)?
            .set_default("client.initial_retry_delay_ms", 500)?
            .set_default("client.max_retry_delay_ms", 8000)?
            .set_default("proxy.enabled", false)?;

        if gateway_path.exists() {
            config_builder = config_builder.add_source(File::from(gateway_path).format(format));
        }

        config_builder = config_builder.add_source(
            Environment::with_prefix("RESTSCRAPE")
                .separator("__")
                .try_parsing(true),
        );

        let config = config_builder.build()?;
        let mut settings: Settings = config.try_deserialize()?;

        if let Some(upstreams_path) = upstreams_config {
            let upstreams_path = upstreams_path.as_ref();
            if upstreams_path.exists() {
                settings.upstreams = Self::load_upstreams_config(upstreams_path)?;
            }
        }

        Ok(settings)
    }

    /// Load the upstream override file (YAML)
    pub fn load_upstreams_config<P: AsRef<Path>>(path: P) -> Result<UpstreamConfig> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            AppError::Config(config::ConfigError::Message(format!(
                "Failed to read upstreams config: {}",
                e
            )))
        })?;

        // An empty or fully commented file parses as null; keep the defaults
        let upstreams: Option<UpstreamConfig> = serde_yaml::from_str(&content).map_err(|e| {
            AppError::Config(config::ConfigError::Message(format!(
                "Failed to parse upstreams config: {}",
                e
            )))
        })?;

        Ok(upstreams.unwrap_or_default())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "Server port cannot be 0".to_string(),
            )));
        }

        if self.client.timeout_ms == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "Client timeout cannot be 0".to_string(),
            )));
        }

        if self.proxy.enabled && self.proxy.base_url.as_deref().unwrap_or("").is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(
                "Proxy is enabled but no base URL is configured".to_string(),
            )));
        }

        for (name, url) in self.upstreams.entries() {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AppError::Config(config::ConfigError::Message(format!(
                    "Upstream '{}' must be an HTTP(S) URL, got '{}'",
                    name, url
                ))));
            }
        }

        Ok(())
    }
}

impl UpstreamConfig {
    /// Name/URL pairs, used for validation and diagnostics
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("luminai", &self.luminai),
            ("blackbox", &self.blackbox),
            ("anime", &self.anime),
            ("news", &self.news),
            ("quiz", &self.quiz),
            ("image", &self.image),
            ("github", &self.github),
            ("npm", &self.npm),
        ]
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
            client: ClientConfig {
                timeout_ms: default_timeout(),
                max_retries: default_max_retries(),
                initial_retry_delay_ms: default_initial_retry_delay(),
                max_retry_delay_ms: default_max_retry_delay(),
            },
            proxy: ProxyConfig::default(),
            upstreams: UpstreamConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.client.timeout_ms, 30000);
        assert_eq!(settings.client.max_retries, 3);
        assert!(!settings.proxy.enabled);
    }

    #[test]
    fn test_upstream_defaults() {
        let upstreams = UpstreamConfig::default();
        assert!(upstreams.github.starts_with("https://"));
        assert_eq!(upstreams.entries().len(), 8);
    }

    #[test]
    fn test_upstreams_yaml_parsing() {
        let yaml = "github: http://localhost:9000\nnpm: http://localhost:9001\n";
        let upstreams: UpstreamConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(upstreams.github, "http://localhost:9000");
        assert_eq!(upstreams.npm, "http://localhost:9001");
        // Unspecified fields keep their defaults
        assert_eq!(upstreams.quiz, "https://opentdb.com");
    }
}
