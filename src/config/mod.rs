//! Configuration module

pub mod settings;

pub use settings::{
    ClientConfig, LoggingConfig, ProxyConfig, ServerConfig, Settings, UpstreamConfig,
};
