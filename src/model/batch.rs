use crate::model::job::WebhookConfig;
use crate::model::scrape::ScrapeOptions;
use serde::{Deserialize, Serialize};

/// A request to scrape an explicit list of URLs as one job
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchScrapeRequest {
    pub urls: Vec<String>,
    #[serde(flatten)]
    pub options: ScrapeOptions,
    /// When false, any invalid URL fails the whole request; when true,
    /// invalid URLs are collected on the job and the rest proceed.
    #[serde(rename = "ignoreInvalidURLs")]
    pub ignore_invalid_urls: bool,
    pub webhook: Option<WebhookConfig>,
}

/// Response for `POST /v1/batch/scrape`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchQueuedResponse {
    pub success: bool,
    pub id: String,
    pub url: String,
    #[serde(rename = "invalidURLs", skip_serializing_if = "Vec::is_empty", default)]
    pub invalid_urls: Vec<String>,
}
