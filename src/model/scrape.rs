use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Output formats a scrape can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    #[serde(rename = "markdown")]
    Markdown,
    #[serde(rename = "html")]
    Html,
    #[serde(rename = "rawHtml")]
    RawHtml,
    #[serde(rename = "links")]
    Links,
}

/// A request to scrape a single URL
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrapeRequest {
    pub url: String,
    pub formats: Vec<Format>,
    pub only_main_content: bool,
    pub include_tags: Vec<String>,
    pub exclude_tags: Vec<String>,
    pub headers: HashMap<String, String>,
    /// Milliseconds to wait between response headers and body read
    pub wait_for: u64,
    /// Overall deadline in milliseconds; 0 means "use the configured default"
    pub timeout: u64,
}

impl ScrapeRequest {
    /// Fills in the documented defaults: `[markdown]` when no formats were
    /// requested and the configured timeout when none was given.
    pub fn apply_defaults(&mut self, default_timeout_ms: u64) {
        if self.formats.is_empty() {
            self.formats = vec![Format::Markdown];
        }
        if self.timeout == 0 {
            self.timeout = default_timeout_ms;
        }
    }

    /// Returns true when the given format was requested
    pub fn wants(&self, format: Format) -> bool {
        self.formats.contains(&format)
    }
}

/// Scrape options without a URL, used as the per-URL template in batch
/// scrape and crawl requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrapeOptions {
    pub formats: Vec<Format>,
    pub only_main_content: bool,
    pub include_tags: Vec<String>,
    pub exclude_tags: Vec<String>,
    pub headers: HashMap<String, String>,
    pub wait_for: u64,
    pub timeout: u64,
}

impl ScrapeOptions {
    /// Materializes a full scrape request for one URL from this template
    pub fn to_request(&self, url: &str) -> ScrapeRequest {
        ScrapeRequest {
            url: url.to_string(),
            formats: self.formats.clone(),
            only_main_content: self.only_main_content,
            include_tags: self.include_tags.clone(),
            exclude_tags: self.exclude_tags.clone(),
            headers: self.headers.clone(),
            wait_for: self.wait_for,
            timeout: self.timeout,
        }
    }
}

/// The structured result of extracting one URL.
///
/// Only the requested format fields are populated; `metadata` is always
/// present and `metadata.source_url` always equals the request URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageArtifact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<String>>,
    pub metadata: PageMetadata,
}

/// Metadata extracted from (or about) a scraped page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageMetadata {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub language: String,
    #[serde(rename = "sourceURL")]
    pub source_url: String,
    /// HTTP status of the fetch; 0 when no response was received
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageArtifact {
    /// An artifact carrying only metadata, used for per-page fetch failures
    pub fn failed(source_url: &str, status_code: u16, error: String) -> Self {
        Self {
            metadata: PageMetadata {
                source_url: source_url.to_string(),
                status_code,
                error: Some(error),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// True when the fetch never produced a response (transport failure)
    pub fn is_transport_failure(&self) -> bool {
        self.metadata.status_code == 0 && self.metadata.error.is_some()
    }
}

/// Response envelope for `POST /v1/scrape`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResponse {
    pub success: bool,
    pub data: PageArtifact,
}
