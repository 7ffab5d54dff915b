use url::Url;

/// Normalizes a URL for deduplication
///
/// # Normalization Steps
///
/// 1. Strip the fragment
/// 2. Optionally clear the query string
/// 3. Trim the trailing slash from the path (the root `/` is kept)
///
/// Scheme and host are preserved as-is. The function is idempotent:
/// `normalize(normalize(u)) == normalize(u)`.
///
/// # Arguments
///
/// * `url` - The URL to normalize
/// * `drop_query` - When true, the query string is removed as well
pub fn normalize(url: &Url, drop_query: bool) -> Url {
    let mut normalized = url.clone();

    normalized.set_fragment(None);

    if drop_query {
        normalized.set_query(None);
    }

    let path = normalized.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/').to_string();
        normalized.set_path(&trimmed);
    }

    normalized
}

/// Normalizes a URL string, returning the input unchanged when it does
/// not parse.
pub fn normalize_str(s: &str, drop_query: bool) -> String {
    match Url::parse(s) {
        Ok(url) => normalize(&url, drop_query).to_string(),
        Err(_) => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_strip_fragment() {
        let result = normalize(&parse("https://example.com/page#section"), false);
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_trim_trailing_slash() {
        let result = normalize(&parse("https://example.com/page/"), false);
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_root_slash_kept() {
        let result = normalize(&parse("https://example.com/"), false);
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_query_kept_by_default() {
        let result = normalize(&parse("https://example.com/page?a=1"), false);
        assert_eq!(result.as_str(), "https://example.com/page?a=1");
    }

    #[test]
    fn test_drop_query() {
        let result = normalize(&parse("https://example.com/page?a=1&b=2"), true);
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_scheme_and_host_preserved() {
        let result = normalize(&parse("http://Sub.Example.COM/Page/"), false);
        // The url crate lowercases hosts at parse time; nothing else changes
        assert_eq!(result.as_str(), "http://sub.example.com/Page");
    }

    #[test]
    fn test_idempotent() {
        for input in [
            "https://example.com/page/?q=1#frag",
            "https://example.com/",
            "http://example.com/a/b/c/",
        ] {
            let once = normalize(&parse(input), true);
            let twice = normalize(&once, true);
            assert_eq!(once, twice, "normalize not idempotent for {}", input);
        }
    }

    #[test]
    fn test_normalize_str_invalid_input_unchanged() {
        assert_eq!(normalize_str("not a url", false), "not a url");
    }
}
