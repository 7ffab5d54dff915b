//! Request handlers for the `/v1` API

use crate::mapper;
use crate::model::{
    BatchQueuedResponse, BatchScrapeRequest, CrawlQueuedResponse, CrawlRequest, ErrorsResponse,
    JobSnapshot, MapRequest, MapResponse, ScrapeRequest, ScrapeResponse,
};
use crate::server::response::ApiError;
use crate::server::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// POST /v1/scrape
pub async fn scrape(
    State(state): State<AppState>,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))?;
    if req.url.is_empty() {
        return Err(ApiError::bad_request("URL is required"));
    }

    let artifact = state.extractor.extract(req).await.map_err(ApiError::from)?;

    // A page that never answered is a fetch failure; a page that answered
    // with an error status is still a result.
    if artifact.is_transport_failure() {
        let message = artifact.metadata.error.clone().unwrap_or_default();
        return Err(ApiError::internal(format!(
            "Failed to scrape URL: {}",
            message
        )));
    }

    Ok(Json(ScrapeResponse {
        success: true,
        data: artifact,
    }))
}

/// POST /v1/map
pub async fn map_site(
    State(state): State<AppState>,
    payload: Result<Json<MapRequest>, JsonRejection>,
) -> Result<Json<MapResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))?;
    if req.url.is_empty() {
        return Err(ApiError::bad_request("URL is required"));
    }

    let response = mapper::map(&state.client, &req)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(response))
}

/// POST /v1/crawl
pub async fn start_crawl(
    State(state): State<AppState>,
    payload: Result<Json<CrawlRequest>, JsonRejection>,
) -> Result<Json<CrawlQueuedResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))?;
    if req.url.is_empty() {
        return Err(ApiError::bad_request("URL is required"));
    }

    let id = state.runner.start_crawl(req).await.map_err(ApiError::from)?;
    let url = state.runner.crawl_status_url(&id);

    Ok(Json(CrawlQueuedResponse {
        success: true,
        id,
        url,
    }))
}

/// GET /v1/crawl/{id}
pub async fn crawl_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobSnapshot>, ApiError> {
    let job = state.store.get_crawl_job(&id).await.map_err(ApiError::from)?;
    let snapshot = JobSnapshot::of_crawl(&job, &state.runner.crawl_status_url(&id));
    Ok(Json(snapshot))
}

/// DELETE /v1/crawl/{id}
pub async fn cancel_crawl(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .store
        .cancel_crawl_job(&id)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(json!({"status": "cancelled"})))
}

/// GET /v1/crawl/{id}/errors
pub async fn crawl_errors(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ErrorsResponse>, ApiError> {
    // The job must exist; the side lists may legitimately be empty.
    state.store.get_crawl_job(&id).await.map_err(ApiError::from)?;

    let errors = state
        .store
        .get_crawl_errors(&id)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(errors))
}

/// POST /v1/batch/scrape
pub async fn start_batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchScrapeRequest>, JsonRejection>,
) -> Result<Json<BatchQueuedResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))?;
    let (id, invalid_urls) = state.runner.start_batch(req).await.map_err(ApiError::from)?;
    let url = state.runner.batch_status_url(&id);

    Ok(Json(BatchQueuedResponse {
        success: true,
        id,
        url,
        invalid_urls,
    }))
}

/// GET /v1/batch/scrape/{id}
pub async fn batch_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobSnapshot>, ApiError> {
    let job = state.store.get_batch_job(&id).await.map_err(ApiError::from)?;
    let snapshot = JobSnapshot::of_batch(&job, &state.runner.batch_status_url(&id));
    Ok(Json(snapshot))
}

/// GET /v1/batch/scrape/{id}/errors
pub async fn batch_errors(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ErrorsResponse>, ApiError> {
    let job = state.store.get_batch_job(&id).await.map_err(ApiError::from)?;
    Ok(Json(ErrorsResponse {
        errors: job.errors,
        robots_blocked: job.robots_blocked,
    }))
}
