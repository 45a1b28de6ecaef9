//! Feature handlers, one module per category
//!
//! Each module exposes `routes(...)` returning the route descriptors for its
//! endpoints. `register_all` collects every feature into the registry.

pub mod ai;
pub mod anime;
pub mod images;
pub mod news;
pub mod quiz;
pub mod stalker;
pub mod tools;

use std::sync::Arc;

use crate::client::UpstreamClient;
use crate::config::Settings;
use crate::error::Result;
use crate::registry::RouteRegistry;

/// Build the registry covering every feature
pub fn register_all(settings: &Settings, client: Arc<UpstreamClient>) -> Result<RouteRegistry> {
    let mut registry = RouteRegistry::new();

    let descriptors = tools::routes()
        .into_iter()
        .chain(ai::routes(client.clone(), &settings.upstreams))
        .chain(anime::routes(client.clone(), &settings.upstreams))
        .chain(news::routes(client.clone(), &settings.upstreams))
        .chain(quiz::routes(client.clone(), &settings.upstreams))
        .chain(images::routes(client.clone(), &settings.upstreams))
        .chain(stalker::routes(client, &settings.upstreams));

    for descriptor in descriptors {
        registry.register(descriptor)?;
    }

    Ok(registry)
}
