//! Main entry point for the Restscrape Gateway

use restscrape_gateway::{api, client::UpstreamClient, config::Settings, features, AppState};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = Settings::load()?;
    settings.validate()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.clone()));

    if settings.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }

    info!("Starting Restscrape Gateway");
    info!(
        "Loaded configuration: server={}:{}",
        settings.server.host, settings.server.port
    );

    // Shared outbound client, with the proxy resolver injected
    let client = Arc::new(UpstreamClient::new(&settings.client, &settings.proxy)?);

    // Register every feature route
    let registry = features::register_all(&settings, client)?;
    let (total, public, premium, maintenance) = registry.counts();
    info!(
        total = total,
        public = public,
        premium = premium,
        maintenance = maintenance,
        "Registered routes"
    );

    // Create application state
    let app_state = Arc::new(AppState { settings, registry });

    // Build the router
    let app = api::routes::create_router(app_state.clone());

    // Get server address
    let addr = format!(
        "{}:{}",
        app_state.settings.server.host, app_state.settings.server.port
    );
    info!("Server listening on {}", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
