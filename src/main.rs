// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::application::clock::SystemClock;
use crate::application::data_store::TemperatureDataStore;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::influx_repository::InfluxRepository;
use crate::presentation::app_state::{AppState, RequestLimits};
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config().context("Failed to load configuration")?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(InfluxRepository::new(
        config.influx.host,
        config.influx.token,
        config.influx.database,
        config.influx.retention_policy,
        config.influx.measurement,
    ));

    // Create the cached data store (application layer)
    let data_store = Arc::new(TemperatureDataStore::new(
        repository,
        Arc::new(SystemClock),
        config.cache.retention(),
    ));
    let cleanup = data_store.spawn_cache_cleanup(config.cache.sweep_interval());

    let state = Arc::new(AppState {
        data_store,
        limits: RequestLimits::from(&config.http),
    });

    // Build router (presentation layer)
    let router = build_router(state, &config.http.base_path);

    let listener = tokio::net::TcpListener::bind(config.http.bind.as_str())
        .await
        .with_context(|| format!("Failed to bind {}", config.http.bind))?;
    tracing::info!("Starting temperature-telemetry service on {}", config.http.bind);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    cleanup.abort();
    Ok(())
}
