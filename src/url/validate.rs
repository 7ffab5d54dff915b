use url::Url;

/// Checks whether a string is a well-formed absolute http(s) URL
///
/// Returns true iff the string parses, its scheme is `http` or `https`,
/// and it carries a non-empty host.
///
/// # Examples
///
/// ```
/// use rummage::url::is_valid_absolute_url;
///
/// assert!(is_valid_absolute_url("https://example.com/page"));
/// assert!(!is_valid_absolute_url("/relative/path"));
/// assert!(!is_valid_absolute_url("ftp://example.com/"));
/// ```
pub fn is_valid_absolute_url(s: &str) -> bool {
    match Url::parse(s) {
        Ok(url) => {
            (url.scheme() == "http" || url.scheme() == "https")
                && url.host_str().map(|h| !h.is_empty()).unwrap_or(false)
        }
        Err(_) => false,
    }
}

/// Checks whether a string looks like a relative URL
///
/// A URL is relative when it lacks an `http://` or `https://` prefix.
pub fn is_relative_url(s: &str) -> bool {
    !s.starts_with("http://") && !s.starts_with("https://")
}

/// Resolves a reference against a base URL per RFC 3986
///
/// Returns `None` when the reference cannot be resolved.
pub fn resolve(base: &Url, reference: &str) -> Option<Url> {
    base.join(reference).ok()
}
