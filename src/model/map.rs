use serde::{Deserialize, Serialize};

/// Hard upper bound on URLs a single map request may return
pub const MAP_LIMIT_CAP: usize = 5_000;

/// A request to discover the URLs of a site
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapRequest {
    pub url: String,
    /// Case-insensitive substring filter on discovered URLs
    pub search: String,
    pub ignore_sitemap: bool,
    pub sitemap_only: bool,
    pub include_subdomains: bool,
    /// Maximum URLs to return; 0 means "use the cap"
    pub limit: usize,
    /// Harvest fetch deadline in milliseconds; 0 means the 30 s default
    pub timeout: u64,
    pub include_paths: Vec<String>,
    pub exclude_paths: Vec<String>,
}

impl MapRequest {
    /// The effective cap: defaults to 5 000 and never exceeds it
    pub fn effective_limit(&self) -> usize {
        if self.limit == 0 {
            MAP_LIMIT_CAP
        } else {
            self.limit.min(MAP_LIMIT_CAP)
        }
    }
}

/// Response for `POST /v1/map`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapResponse {
    pub success: bool,
    pub links: Vec<String>,
}
