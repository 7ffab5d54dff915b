//! HTTP server for the Rummage API
//!
//! Thin dispatch layer: axum routes, JSON envelopes, and a graceful
//! shutdown loop. All real work happens in the extractor, mapper and job
//! runner this state wires together.

mod handlers;
mod response;
mod routes;

pub use response::ApiError;
pub use routes::create_router;

use crate::jobs::JobRunner;
use crate::scrape::{build_http_client, Extractor};
use crate::store::JobStore;
use crate::{Config, Result};
use reqwest::Client;
use std::net::SocketAddr;
use std::sync::Arc;

/// Shared state for the API server
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JobStore>,
    pub runner: Arc<JobRunner>,
    pub extractor: Extractor,
    pub client: Client,
}

impl AppState {
    pub fn new(store: Arc<dyn JobStore>, config: &Config) -> Result<Self> {
        let client = build_http_client()?;
        let runner = Arc::new(JobRunner::new(
            Arc::clone(&store),
            client.clone(),
            config,
        ));
        let extractor = Extractor::new(client.clone(), &config.scraper);

        Ok(Self {
            store,
            runner,
            extractor,
            client,
        })
    }
}

/// Starts the API server and blocks until shutdown
pub async fn serve(config: &Config, store: Arc<dyn JobStore>) -> Result<()> {
    let state = AppState::new(store, config)?;
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Server listening on port {}", config.server.port);
    tracing::info!("API base URL: {}", config.base_url());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves when the process receives SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install SIGINT handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
