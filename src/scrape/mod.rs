//! Page extraction module
//!
//! Fetches a single URL and converts it into the requested artifact
//! formats: Markdown, cleaned HTML, raw HTML and link lists, plus page
//! metadata.

mod extractor;
mod filters;
mod markdown;

pub use extractor::{build_http_client, Extractor, USER_AGENT};
pub use filters::{filtered_body, FilterOptions};
pub use markdown::{clean_markdown, to_markdown};
