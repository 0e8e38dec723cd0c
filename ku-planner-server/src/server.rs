use std::{env, net::SocketAddr, path::PathBuf};

use anyhow::Result;
use tokio::net::TcpListener;

use crate::handlers::{AppState, create_app};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CATALOG_PATH: &str = "ku_courses.json";

/// Listener and catalog settings read from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub catalog_path: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().unwrap_or_else(|_| {
                tracing::warn!("Ignoring invalid PORT '{}', using {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            Err(_) => DEFAULT_PORT,
        };

        let catalog_path = env::var("CATALOG_PATH")
            .map_or_else(|_| PathBuf::from(DEFAULT_CATALOG_PATH), PathBuf::from);

        Self { port, catalog_path }
    }
}

pub async fn start_server(config: ServerConfig) -> Result<()> {
    if !config.catalog_path.exists() {
        // requests will answer 500 until the file shows up
        tracing::warn!("Catalog file {} not found", config.catalog_path.display());
    }

    let app = create_app(AppState::new(config.catalog_path.clone()));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    tracing::info!(
        "KU Planner server starting on {} (catalog: {})",
        addr,
        config.catalog_path.display()
    );

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
