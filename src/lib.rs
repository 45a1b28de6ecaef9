//! Restscrape Gateway
//!
//! A Rust-based HTTP gateway exposing a catalog of thin wrapper routes over
//! third-party websites and public APIs - chat proxies, scrapers, data feeds,
//! and text utilities - behind one normalized response envelope.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod features;
pub mod registry;
pub mod response;

pub use error::{AppError, Result};

use registry::RouteRegistry;

/// Application state shared across the service-level handlers
pub struct AppState {
    pub settings: config::Settings,
    pub registry: RouteRegistry,
}
