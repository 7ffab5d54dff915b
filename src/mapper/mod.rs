//! Site mapper: URL discovery by sitemap probing and link harvesting
//!
//! Discovery runs in two stages. Stage A probes the conventional sitemap
//! locations (plus robots.txt hints), following sitemap indexes
//! recursively. Stage B fetches the seed page itself and harvests its
//! anchors one hop deep. Both stages feed a shared, capped, deduplicating
//! accumulator, so the output is ordered (seed first, sitemap URLs before
//! harvested ones) and free of duplicates.

mod sitemap;

pub use sitemap::{parse_sitemap, robots_sitemap_hints, sitemap_candidates, SitemapDoc};

use crate::model::{MapRequest, MapResponse};
use crate::url::matches_paths;
use crate::{Result, RummageError};
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

/// Recursion guard for sitemap indexes that point at each other
const MAX_SITEMAP_DEPTH: u32 = 8;

/// URL filters applied to every candidate before it is accepted
#[derive(Debug, Clone, Default)]
pub struct DiscoveryFilter {
    pub include_paths: Vec<String>,
    pub exclude_paths: Vec<String>,
    /// Case-insensitive substring; empty matches everything
    pub search: String,
}

impl DiscoveryFilter {
    fn admits(&self, url: &str) -> bool {
        if !matches_paths(url, &self.include_paths, &self.exclude_paths) {
            return false;
        }
        if !self.search.is_empty()
            && !url.to_lowercase().contains(&self.search.to_lowercase())
        {
            return false;
        }
        true
    }
}

/// Capped, deduplicating URL accumulator shared by the discovery stages.
///
/// The seen set and the output list sit behind separate locks; callers
/// always take seen first, release it, then take the output lock. Neither
/// lock is ever held across an await point.
pub struct Discovery {
    seen: Mutex<HashSet<String>>,
    out: Mutex<Vec<String>>,
    cap: usize,
}

impl Discovery {
    /// Creates an accumulator whose first entry is the seed URL
    pub fn seeded(seed: &str, cap: usize) -> Self {
        let mut seen = HashSet::new();
        seen.insert(seed.to_string());
        Self {
            seen: Mutex::new(seen),
            out: Mutex::new(vec![seed.to_string()]),
            cap,
        }
    }

    /// Records a URL, returning true when it was newly appended.
    /// Duplicates and URLs beyond the cap are dropped.
    pub fn insert(&self, url: &str) -> bool {
        {
            let mut seen = match self.seen.lock() {
                Ok(seen) => seen,
                Err(_) => return false,
            };
            if !seen.insert(url.to_string()) {
                return false;
            }
        }

        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(_) => return false,
        };
        if out.len() >= self.cap {
            return false;
        }
        out.push(url.to_string());
        true
    }

    /// True once the output list has reached the cap
    pub fn is_full(&self) -> bool {
        self.out.lock().map(|out| out.len() >= self.cap).unwrap_or(true)
    }

    /// Copies the URLs discovered so far, in insertion order
    pub fn snapshot(&self) -> Vec<String> {
        self.out.lock().map(|out| out.clone()).unwrap_or_default()
    }

    /// Consumes the accumulator, yielding the discovered URLs in order
    pub fn into_links(self) -> Vec<String> {
        self.out.into_inner().unwrap_or_default()
    }
}

/// Discovers the URLs of a site
///
/// Runs sitemap probing (unless `ignore_sitemap`) and, unless
/// `sitemap_only`, a one-hop anchor harvest of the seed page. The result
/// list starts with the seed URL, never exceeds the limit, and contains
/// no duplicates.
pub async fn map(client: &Client, req: &MapRequest) -> Result<MapResponse> {
    if req.url.is_empty() {
        return Err(RummageError::InvalidRequest("URL is required".to_string()));
    }
    let base = Url::parse(&req.url)
        .map_err(|e| RummageError::InvalidRequest(format!("invalid URL: {}", e)))?;

    let filter = DiscoveryFilter {
        include_paths: req.include_paths.clone(),
        exclude_paths: req.exclude_paths.clone(),
        search: req.search.clone(),
    };
    let discovery = Discovery::seeded(&req.url, req.effective_limit());

    if !req.ignore_sitemap {
        probe_sitemaps(client, &base, &filter, &discovery).await;

        if req.sitemap_only {
            return Ok(MapResponse {
                success: true,
                links: discovery.into_links(),
            });
        }
    }

    harvest_links(
        client,
        &req.url,
        &base,
        req.include_subdomains,
        req.timeout,
        &filter,
        &discovery,
    )
    .await;

    Ok(MapResponse {
        success: true,
        links: discovery.into_links(),
    })
}

/// Stage A: probe the candidate sitemap URLs and ingest what they list
pub async fn probe_sitemaps(
    client: &Client,
    base: &Url,
    filter: &DiscoveryFilter,
    discovery: &Discovery,
) {
    let mut candidates = sitemap_candidates(base);

    let robots_url = format!(
        "{}://{}/robots.txt",
        base.scheme(),
        host_with_port(base)
    );
    if let Some(body) = sitemap::fetch_sitemap(client, &robots_url).await {
        let robots_txt = String::from_utf8_lossy(&body);
        candidates.extend(robots_sitemap_hints(&robots_txt));
    }

    for candidate in candidates {
        if discovery.is_full() {
            break;
        }
        process_sitemap(client, &candidate, filter, discovery, 0).await;
    }
}

/// Fetches one sitemap and ingests it, recursing through sitemap indexes
async fn process_sitemap(
    client: &Client,
    url: &str,
    filter: &DiscoveryFilter,
    discovery: &Discovery,
    depth: u32,
) {
    if depth > MAX_SITEMAP_DEPTH {
        tracing::debug!("Sitemap recursion limit reached at {}", url);
        return;
    }

    let Some(body) = sitemap::fetch_sitemap(client, url).await else {
        return;
    };

    match parse_sitemap(&body) {
        SitemapDoc::Index(children) => {
            for child in children {
                if discovery.is_full() {
                    return;
                }
                Box::pin(process_sitemap(client, &child, filter, discovery, depth + 1)).await;
            }
        }
        SitemapDoc::UrlSet(urls) => {
            for url in urls {
                if discovery.is_full() {
                    return;
                }
                if filter.admits(&url) {
                    discovery.insert(&url);
                }
            }
        }
    }
}

/// Stage B: fetch the seed page and harvest its anchors
async fn harvest_links(
    client: &Client,
    seed: &str,
    base: &Url,
    include_subdomains: bool,
    timeout_ms: u64,
    filter: &DiscoveryFilter,
    discovery: &Discovery,
) {
    let timeout = if timeout_ms == 0 { 30_000 } else { timeout_ms };

    let body = match client
        .get(seed)
        .timeout(Duration::from_millis(timeout))
        .send()
        .await
    {
        Ok(response) => match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("Failed to read seed page {}: {}", seed, e);
                return;
            }
        },
        Err(e) => {
            tracing::debug!("Failed to fetch seed page {}: {}", seed, e);
            return;
        }
    };

    for href in collect_hrefs(&body) {
        if discovery.is_full() {
            break;
        }

        let resolved = match base.join(&href) {
            Ok(url) => url,
            Err(_) => continue,
        };

        if !include_subdomains && resolved.host_str() != base.host_str() {
            continue;
        }

        let resolved = resolved.to_string();
        if filter.admits(&resolved) {
            discovery.insert(&resolved);
        }
    }
}

/// Pulls raw anchor hrefs out of a page, skipping empty and fragment-only
/// values. Parsing is synchronous; nothing borrowed from the DOM escapes.
pub fn collect_hrefs(body: &str) -> Vec<String> {
    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let document = Html::parse_document(body);
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty() && !href.starts_with('#'))
        .map(String::from)
        .collect()
}

fn host_with_port(base: &Url) -> String {
    let host = base.host_str().unwrap_or_default();
    match base.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}
