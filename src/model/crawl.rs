use crate::model::job::WebhookConfig;
use crate::model::scrape::ScrapeOptions;
use serde::{Deserialize, Serialize};

/// Hard upper bound on URLs a crawl job may process
pub const CRAWL_LIMIT_CAP: usize = 1_000;

/// Default crawl depth when none was requested
pub const DEFAULT_MAX_DEPTH: u32 = 10;

/// A request to crawl a site and scrape every discovered page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrawlRequest {
    pub url: String,
    pub exclude_paths: Vec<String>,
    pub include_paths: Vec<String>,
    /// Recursion depth for the fallback link-following crawl; 0 means default
    pub max_depth: u32,
    pub ignore_sitemap: bool,
    pub ignore_query_parameters: bool,
    /// Maximum URLs to process; 0 means default, never exceeds the cap
    pub limit: usize,
    pub allow_backward_links: bool,
    pub allow_external_links: bool,
    pub webhook: Option<WebhookConfig>,
    pub scrape_options: Option<ScrapeOptions>,
}

impl CrawlRequest {
    pub fn effective_limit(&self) -> usize {
        if self.limit == 0 {
            CRAWL_LIMIT_CAP
        } else {
            self.limit.min(CRAWL_LIMIT_CAP)
        }
    }

    pub fn effective_max_depth(&self) -> u32 {
        if self.max_depth == 0 {
            DEFAULT_MAX_DEPTH
        } else {
            self.max_depth
        }
    }

    /// The scrape template, defaulted to `[markdown]` when absent
    pub fn scrape_options(&self) -> ScrapeOptions {
        self.scrape_options.clone().unwrap_or_default()
    }
}

/// Response for `POST /v1/crawl`: the job ID and its status URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlQueuedResponse {
    pub success: bool,
    pub id: String,
    pub url: String,
}
