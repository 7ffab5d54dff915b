/// Checks whether a URL passes the include/exclude path filters
///
/// When `include` is non-empty the URL string must contain at least one of
/// its entries; when `exclude` is non-empty it must contain none. Matching
/// is plain substring containment on the full URL string.
///
/// # Examples
///
/// ```
/// use rummage::url::matches_paths;
///
/// let include = vec!["/docs".to_string()];
/// let exclude = vec!["/private".to_string()];
///
/// assert!(matches_paths("https://example.com/docs/intro", &include, &exclude));
/// assert!(!matches_paths("https://example.com/blog", &include, &exclude));
/// assert!(!matches_paths("https://example.com/docs/private/x", &include, &exclude));
/// ```
pub fn matches_paths(url: &str, include: &[String], exclude: &[String]) -> bool {
    if !include.is_empty() && !include.iter().any(|p| url.contains(p.as_str())) {
        return false;
    }

    if exclude.iter().any(|p| url.contains(p.as_str())) {
        return false;
    }

    true
}

/// Checks whether a link path points outside the subtree of a base path
///
/// A link is backward when its path has fewer segments than the base path,
/// or diverges from the base before exhausting the base's segments. Crawls
/// use this to stay within the seed URL's subtree.
pub fn is_backward_link(base_path: &str, link_path: &str) -> bool {
    let base_parts: Vec<&str> = base_path
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    let link_parts: Vec<&str> = link_path
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    if link_parts.len() < base_parts.len() {
        return true;
    }

    for (i, base_part) in base_parts.iter().enumerate() {
        if link_parts.get(i) != Some(base_part) {
            return true;
        }
    }

    false
}
