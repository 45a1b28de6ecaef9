//! API response models for the service-level endpoints

use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub routes: RouteSummary,
}

/// Registry counts reported by the health endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteSummary {
    pub total: usize,
    pub public: usize,
    pub premium: usize,
    pub maintenance: usize,
}
