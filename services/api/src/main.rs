use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod dashboard;
mod error;
mod middleware;
mod models;
mod routes;
mod state;
mod streaming;

use common::ServerConfig;
use media::{FfmpegExtractor, MediaCatalog};
use tokio::net::TcpListener;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting VOD server");

    let config = ServerConfig::load().context("Failed to load configuration")?;
    config
        .prepare_directories()
        .context("Failed to prepare media directories")?;

    info!("Content directory: {}", config.content_dir.display());
    info!("Thumbnail directory: {}", config.thumbnail_dir.display());

    let extractor = Arc::new(FfmpegExtractor::from_config(&config));
    let catalog = MediaCatalog::from_config(&config, extractor);
    let bind_address = config.bind_address();
    let port = config.port;

    let app = routes::create_router(AppState::new(config, catalog));

    let listener = match TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", bind_address, e);
            if e.kind() == std::io::ErrorKind::AddrInUse {
                error!("Port {} is already in use by another process", port);
            }
            std::process::exit(1);
        }
    };

    info!("VOD server listening on {}", bind_address);
    info!("Dashboard: http://localhost:{}", port);
    info!("API: http://localhost:{}/api/videos", port);
    for ip in dashboard::lan_addresses() {
        info!("Reachable on LAN at http://{}:{}", ip, port);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("VOD server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down VOD server");
}
