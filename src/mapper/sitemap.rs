//! Sitemap fetching and parsing
//!
//! Sitemaps come in three shapes: a sitemap index pointing at further
//! sitemaps, a `<urlset>` of page URLs, and (non-standard but common) a
//! plain-text list of URLs. All three are handled by one parser, with
//! gzip-encoded bodies unwrapped first.

use flate2::read::GzDecoder;
use regex::Regex;
use reqwest::Client;
use std::io::Read;
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

static LOC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<loc>\s*([^<]+?)\s*</loc>").expect("loc regex"));

static ROBOTS_SITEMAP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Sitemap:\s*(.+)").expect("robots sitemap regex"));

/// Deadline for each individual sitemap/robots fetch
const SITEMAP_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// A parsed sitemap document
#[derive(Debug, PartialEq)]
pub enum SitemapDoc {
    /// A sitemap index: entries are further sitemap URLs
    Index(Vec<String>),
    /// A URL set (or plain-text list): entries are page URLs
    UrlSet(Vec<String>),
}

/// Parses sitemap bytes into either an index or a URL list.
///
/// Tries XML `<loc>` extraction first; with no `<loc>` entries the body is
/// treated as a plain-text list, keeping non-empty non-comment lines that
/// start with a scheme.
pub fn parse_sitemap(data: &[u8]) -> SitemapDoc {
    let text = String::from_utf8_lossy(data);

    let locs: Vec<String> = LOC_RE
        .captures_iter(&text)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if !locs.is_empty() {
        if text.contains("<sitemapindex") {
            return SitemapDoc::Index(locs);
        }
        return SitemapDoc::UrlSet(locs);
    }

    let lines = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| line.starts_with("http://") || line.starts_with("https://"))
        .map(String::from)
        .collect();

    SitemapDoc::UrlSet(lines)
}

/// Candidate sitemap locations for a site, most conventional first.
///
/// The three well-known root names, plus the same three under the seed's
/// path when it is not the root.
pub fn sitemap_candidates(base: &Url) -> Vec<String> {
    let host = base.host_str().unwrap_or_default();
    let root = format!("{}://{}", base.scheme(), with_port(host, base));

    let mut candidates = vec![
        format!("{}/sitemap.xml", root),
        format!("{}/sitemap_index.xml", root),
        format!("{}/sitemap", root),
    ];

    let path = base.path().trim_end_matches('/');
    if !path.is_empty() {
        candidates.push(format!("{}{}/sitemap.xml", root, path));
        candidates.push(format!("{}{}/sitemap_index.xml", root, path));
        candidates.push(format!("{}{}/sitemap", root, path));
    }

    candidates
}

fn with_port(host: &str, base: &Url) -> String {
    match base.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// Extracts `Sitemap:` hints from a robots.txt body
pub fn robots_sitemap_hints(robots_txt: &str) -> Vec<String> {
    ROBOTS_SITEMAP_RE
        .captures_iter(robots_txt)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Fetches a sitemap URL, returning its decoded bytes on a 200 response
pub async fn fetch_sitemap(client: &Client, url: &str) -> Option<Vec<u8>> {
    let response = client
        .get(url)
        .timeout(SITEMAP_FETCH_TIMEOUT)
        .send()
        .await
        .ok()?;

    if response.status().as_u16() != 200 {
        return None;
    }

    let gzip_encoded = response
        .headers()
        .get(reqwest::header::CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("gzip"))
        .unwrap_or(false);

    let body = response.bytes().await.ok()?;
    Some(decode_body(url, gzip_encoded, &body))
}

/// Unwraps a gzip-compressed sitemap body.
///
/// reqwest already unwraps `Content-Encoding: gzip` transparently; the
/// magic-byte check catches `.gz` payloads served without the header, and
/// guards against decoding twice.
fn decode_body(url: &str, gzip_encoded: bool, body: &[u8]) -> Vec<u8> {
    let looks_gzip = body.len() >= 2 && body[0] == 0x1f && body[1] == 0x8b;

    if looks_gzip || gzip_encoded || url.ends_with(".gz") {
        let mut decoder = GzDecoder::new(body);
        let mut decoded = Vec::new();
        if decoder.read_to_end(&mut decoded).is_ok() {
            return decoded;
        }
    }

    body.to_vec()
}
