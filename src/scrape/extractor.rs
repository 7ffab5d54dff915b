//! Page extractor: fetch one URL and produce a `PageArtifact`
//!
//! The extractor performs a single GET with a browser-like user agent,
//! enforces the request deadline, and converts the response into the
//! requested formats. Fetch failures are per-page results (an artifact
//! whose metadata carries the error), never process errors.

use crate::config::ScraperConfig;
use crate::model::{Format, PageArtifact, PageMetadata, ScrapeRequest};
use crate::scrape::filters::{filtered_body, FilterOptions};
use crate::scrape::markdown::to_markdown;
use crate::url::is_valid_absolute_url;
use crate::{Result, RummageError};
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Browser-like user agent sent with every outbound fetch
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/109.0.0.0 Safari/537.36";

/// Outcome of the network half of an extraction
enum Fetched {
    /// A 2xx response with its body
    Response { status: u16, body: String },
    /// Transport failure (status 0) or a non-2xx response
    Failed { status: u16, error: String },
}

/// Builds the shared HTTP client used for page fetches
pub fn build_http_client() -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(10))
        .redirect(reqwest::redirect::Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages and converts them into structured artifacts
#[derive(Clone)]
pub struct Extractor {
    client: Client,
    default_timeout_ms: u64,
    default_wait_ms: u64,
}

impl Extractor {
    pub fn new(client: Client, config: &ScraperConfig) -> Self {
        Self {
            client,
            default_timeout_ms: config.default_timeout_ms,
            default_wait_ms: config.default_wait_time_ms,
        }
    }

    /// Extracts one URL into a `PageArtifact`
    ///
    /// Returns `Err` only for structurally invalid requests. Transport
    /// failures and non-2xx responses yield an artifact whose metadata
    /// carries the status code and error message, with all format fields
    /// empty.
    pub async fn extract(&self, mut req: ScrapeRequest) -> Result<PageArtifact> {
        if !is_valid_absolute_url(&req.url) {
            return Err(RummageError::InvalidRequest(format!(
                "invalid URL: {}",
                req.url
            )));
        }

        req.apply_defaults(self.default_timeout_ms);
        if req.wait_for == 0 {
            req.wait_for = self.default_wait_ms;
        }

        match self.fetch(&req).await {
            Fetched::Response { status, body } => Ok(build_artifact(&req, status, &body)),
            Fetched::Failed { status, error } => {
                tracing::debug!("Fetch failed for {}: {}", req.url, error);
                Ok(PageArtifact::failed(&req.url, status, error))
            }
        }
    }

    /// Performs the GET under the request's overall deadline.
    ///
    /// The `wait_for` sleep sits between response headers and body read so
    /// that it counts against the deadline; a `wait_for` longer than the
    /// timeout therefore surfaces as a timeout.
    async fn fetch(&self, req: &ScrapeRequest) -> Fetched {
        let mut builder = self.client.get(&req.url);
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let wait_for = req.wait_for;
        let attempt = async move {
            let response = builder.send().await?;
            let status = response.status().as_u16();
            if wait_for > 0 {
                tokio::time::sleep(Duration::from_millis(wait_for)).await;
            }
            let body = response.text().await?;
            Ok::<(u16, String), reqwest::Error>((status, body))
        };

        match tokio::time::timeout(Duration::from_millis(req.timeout), attempt).await {
            Err(_) => Fetched::Failed {
                status: 0,
                error: format!("request timed out after {}ms", req.timeout),
            },
            Ok(Err(e)) => Fetched::Failed {
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                error: e.to_string(),
            },
            Ok(Ok((status, body))) => {
                if (200..300).contains(&status) {
                    Fetched::Response { status, body }
                } else {
                    Fetched::Failed {
                        status,
                        error: format!("HTTP error: {}", status),
                    }
                }
            }
        }
    }
}

/// Converts a fetched page into the requested formats plus metadata
fn build_artifact(req: &ScrapeRequest, status: u16, body: &str) -> PageArtifact {
    let mut artifact = PageArtifact {
        metadata: extract_metadata(body, &req.url, status),
        ..Default::default()
    };

    if req.wants(Format::Markdown) || req.wants(Format::Html) {
        let options = FilterOptions {
            only_main_content: req.only_main_content,
            include_tags: &req.include_tags,
            exclude_tags: &req.exclude_tags,
        };
        let filtered = filtered_body(body, &options);

        if req.wants(Format::Markdown) {
            artifact.markdown = Some(to_markdown(&filtered));
        }
        if req.wants(Format::Html) {
            artifact.html = Some(format!(
                "<!DOCTYPE html><html><body>{}</body></html>",
                filtered
            ));
        }
    }

    if req.wants(Format::RawHtml) {
        artifact.raw_html = Some(body.to_string());
    }

    if req.wants(Format::Links) {
        artifact.links = Some(extract_links(body, &req.url));
    }

    artifact
}

/// Pulls title, description and language out of the page head
fn extract_metadata(body: &str, source_url: &str, status: u16) -> PageMetadata {
    let document = Html::parse_document(body);

    let title = select_text(&document, "title");
    let description = select_meta_content(&document, "meta[property='og:description']")
        .or_else(|| select_meta_content(&document, "meta[name='description']"))
        .unwrap_or_default();
    let language = Selector::parse("html")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|el| el.value().attr("lang"))
                .map(|s| s.to_string())
        })
        .unwrap_or_default();

    PageMetadata {
        title,
        description,
        language,
        source_url: source_url.to_string(),
        status_code: status,
        error: None,
    }
}

fn select_text(document: &Html, selector_str: &str) -> String {
    Selector::parse(selector_str)
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
        })
        .unwrap_or_default()
}

fn select_meta_content(document: &Html, selector_str: &str) -> Option<String> {
    let selector = Selector::parse(selector_str).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.to_string())
        .filter(|s| !s.is_empty())
}

/// Collects the unique absolute links of the unfiltered page
///
/// Relative hrefs are resolved against the request URL; empty and
/// fragment-only hrefs are skipped, and only well-formed http(s) URLs are
/// kept, in first-seen document order.
fn extract_links(body: &str, source_url: &str) -> Vec<String> {
    let base = match Url::parse(source_url) {
        Ok(base) => base,
        Err(_) => return Vec::new(),
    };
    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let document = Html::parse_document(body);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let href = element.value().attr("href").unwrap_or("").trim();
        if href.is_empty() || href.starts_with('#') {
            continue;
        }

        let resolved = match base.join(href) {
            Ok(url) => url.to_string(),
            Err(_) => continue,
        };

        if !is_valid_absolute_url(&resolved) {
            continue;
        }

        if seen.insert(resolved.clone()) {
            links.push(resolved);
        }
    }

    links
}
