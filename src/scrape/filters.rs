//! Content filters applied to a parsed page before format conversion
//!
//! The `scraper` DOM is read-only, so filtering works on serialized HTML:
//! parse, locate the matching elements, and splice their serialized form
//! out of (or into) the working string. Re-serializing a parsed tree is
//! stable, so after the first pass the element HTML always matches the
//! working string byte-for-byte.

use scraper::{Html, Selector};

/// Page chrome removed when only the main content is wanted
const CHROME_SELECTORS: &str =
    "header, nav, footer, aside, .sidebar, .nav, .menu, .advertisement, script, style, noscript";

/// Containers that count as "the main content" when present
const MAIN_SELECTORS: &str = "main, article, .content, .post, .entry, #content, #main, #post";

/// Options controlling the filter pipeline, taken from a scrape request
#[derive(Debug, Default)]
pub struct FilterOptions<'a> {
    pub only_main_content: bool,
    pub include_tags: &'a [String],
    pub exclude_tags: &'a [String],
}

/// Produces the filtered body HTML for markdown/html output.
///
/// Filters apply in order: main-content reduction, include-tags
/// restriction, exclude-tags removal.
pub fn filtered_body(page_html: &str, options: &FilterOptions) -> String {
    let mut body = body_inner_html(page_html);

    if options.only_main_content {
        body = remove_matching(&body, CHROME_SELECTORS);
        if let Some(main) = first_match(&body, MAIN_SELECTORS) {
            body = main;
        }
    }

    if !options.include_tags.is_empty() {
        let selector = options.include_tags.join(", ");
        body = concat_matches(&body, &selector);
    }

    for tag in options.exclude_tags {
        body = remove_matching(&body, tag);
    }

    body
}

/// Serializes the inner HTML of the document body
fn body_inner_html(page_html: &str) -> String {
    let document = Html::parse_document(page_html);
    match Selector::parse("body") {
        Ok(selector) => document
            .select(&selector)
            .next()
            .map(|body| body.inner_html())
            .unwrap_or_else(|| document.root_element().inner_html()),
        Err(_) => document.root_element().inner_html(),
    }
}

/// Removes every element matching the selector from the HTML string
fn remove_matching(html: &str, selector_str: &str) -> String {
    let selector = match Selector::parse(selector_str) {
        Ok(selector) => selector,
        Err(_) => return html.to_string(),
    };

    let document = Html::parse_fragment(html);
    let mut out = html.to_string();
    for element in document.select(&selector) {
        let fragment = element.html();
        if !fragment.is_empty() {
            out = out.replace(&fragment, "");
        }
    }
    out
}

/// Returns the outer HTML of the first element matching the selector
fn first_match(html: &str, selector_str: &str) -> Option<String> {
    let selector = Selector::parse(selector_str).ok()?;
    let document = Html::parse_fragment(html);
    document.select(&selector).next().map(|el| el.html())
}

/// Concatenates the outer HTML of every match, preserving document order
fn concat_matches(html: &str, selector_str: &str) -> String {
    let selector = match Selector::parse(selector_str) {
        Ok(selector) => selector,
        Err(_) => return String::new(),
    };

    let document = Html::parse_fragment(html);
    document
        .select(&selector)
        .map(|el| el.html())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head><title>T</title></head><body>
        <nav><a href="/">home</a></nav>
        <article><h1>Story</h1><p>Body text</p></article>
        <footer>footer text</footer>
    </body></html>"#;

    #[test]
    fn test_no_filters_returns_body() {
        let body = filtered_body(PAGE, &FilterOptions::default());
        assert!(body.contains("<nav>"));
        assert!(body.contains("Body text"));
        assert!(body.contains("footer text"));
        assert!(!body.contains("<title>"));
    }

    #[test]
    fn test_only_main_content_selects_article() {
        let options = FilterOptions {
            only_main_content: true,
            ..Default::default()
        };
        let body = filtered_body(PAGE, &options);
        assert!(body.contains("Body text"));
        assert!(!body.contains("home"));
        assert!(!body.contains("footer text"));
    }

    #[test]
    fn test_only_main_content_without_main_element() {
        let page = r#"<html><body><nav>chrome</nav><div><p>kept</p></div></body></html>"#;
        let options = FilterOptions {
            only_main_content: true,
            ..Default::default()
        };
        let body = filtered_body(page, &options);
        assert!(!body.contains("chrome"));
        assert!(body.contains("kept"));
    }

    #[test]
    fn test_main_content_removes_scripts() {
        let page = r#"<html><body><script>alert(1)</script><p>text</p></body></html>"#;
        let options = FilterOptions {
            only_main_content: true,
            ..Default::default()
        };
        let body = filtered_body(page, &options);
        assert!(!body.contains("alert"));
        assert!(body.contains("text"));
    }

    #[test]
    fn test_include_tags() {
        let include = vec!["p".to_string()];
        let options = FilterOptions {
            include_tags: &include,
            ..Default::default()
        };
        let page = r#"<html><body><h1>head</h1><p>one</p><div><p>two</p></div></body></html>"#;
        let body = filtered_body(page, &options);
        assert!(!body.contains("head"));
        assert!(body.contains("one"));
        assert!(body.contains("two"));
        // Document order is preserved
        assert!(body.find("one").unwrap() < body.find("two").unwrap());
    }

    #[test]
    fn test_exclude_tags() {
        let exclude = vec!["aside".to_string(), ".ad".to_string()];
        let options = FilterOptions {
            exclude_tags: &exclude,
            ..Default::default()
        };
        let page = r#"<html><body><p>kept</p><aside>gone</aside><div class="ad">ads</div></body></html>"#;
        let body = filtered_body(page, &options);
        assert!(body.contains("kept"));
        assert!(!body.contains("gone"));
        assert!(!body.contains("ads"));
    }

    #[test]
    fn test_include_then_exclude() {
        let include = vec!["article".to_string()];
        let exclude = vec!["span".to_string()];
        let options = FilterOptions {
            include_tags: &include,
            exclude_tags: &exclude,
            ..Default::default()
        };
        let page = r#"<html><body><article><p>kept</p><span>gone</span></article><p>outside</p></body></html>"#;
        let body = filtered_body(page, &options);
        assert!(body.contains("kept"));
        assert!(!body.contains("gone"));
        assert!(!body.contains("outside"));
    }
}
