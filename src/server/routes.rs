//! Router configuration for the API server

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

/// Creates the `/v1` API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handlers::health))
        .route("/v1/scrape", post(handlers::scrape))
        .route("/v1/map", post(handlers::map_site))
        .route("/v1/crawl", post(handlers::start_crawl))
        .route(
            "/v1/crawl/:id",
            get(handlers::crawl_status).delete(handlers::cancel_crawl),
        )
        .route("/v1/crawl/:id/errors", get(handlers::crawl_errors))
        .route("/v1/batch/scrape", post(handlers::start_batch))
        .route("/v1/batch/scrape/:id", get(handlers::batch_status))
        .route("/v1/batch/scrape/:id/errors", get(handlers::batch_errors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
