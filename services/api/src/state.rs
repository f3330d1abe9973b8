//! Application state shared across handlers

use std::sync::Arc;

use common::ServerConfig;
use media::MediaCatalog;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub catalog: MediaCatalog,
}

impl AppState {
    pub fn new(config: ServerConfig, catalog: MediaCatalog) -> Self {
        Self {
            config: Arc::new(config),
            catalog,
        }
    }
}
