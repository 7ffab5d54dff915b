//! Shared helpers for the integration tests
//!
//! Each test spins up the real API router on an ephemeral port, backed by
//! the in-memory job store, and talks to it over HTTP while wiremock
//! plays the sites being scraped.

use rummage::config::Config;
use rummage::server::{create_router, AppState};
use rummage::store::MemoryJobStore;
use std::sync::Arc;
use std::time::Duration;

pub struct TestApp {
    /// Base URL of the running API server, e.g. `http://127.0.0.1:43521`
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Starts the API server on an ephemeral port with an in-memory store
pub async fn spawn_app() -> TestApp {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().expect("failed to read local addr");

    let mut config = Config::default();
    config.server.port = addr.port();
    config.server.base_url = format!("http://{}", addr);

    let store = Arc::new(MemoryJobStore::with_ttl(Duration::from_secs(3600)));
    let state = AppState::new(store, &config).expect("failed to build app state");
    let app = create_router(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server died");
    });

    TestApp {
        base_url: format!("http://{}", addr),
        client: reqwest::Client::new(),
    }
}

/// Polls a job status endpoint until its status matches, or panics after
/// a few seconds.
pub async fn wait_for_status(app: &TestApp, path: &str, expected: &str) -> serde_json::Value {
    for _ in 0..100 {
        let response = app
            .client
            .get(app.url(path))
            .send()
            .await
            .expect("status request failed");
        let body: serde_json::Value = response.json().await.expect("status body not JSON");

        if body["status"] == expected {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("job at {} never reached status {}", path, expected);
}
