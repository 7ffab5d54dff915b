//! HTML to Markdown conversion and cleanup

use regex::Regex;
use std::sync::LazyLock;

static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("newline regex"));

static CODE_LINE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\s+").expect("line number regex"));

/// Converts filtered body HTML to cleaned-up Markdown
pub fn to_markdown(body_html: &str) -> String {
    let markdown = htmd::convert(body_html).unwrap_or_default();
    clean_markdown(&markdown)
}

/// Cleans converter output:
///
/// 1. Collapses runs of three or more newlines down to two
/// 2. Drops a leading plain-text title that a `# ` heading repeats two
///    lines below
/// 3. Strips leading line-number tokens from lines inside fenced code
///    blocks
pub fn clean_markdown(input: &str) -> String {
    let collapsed = EXCESS_NEWLINES.replace_all(input, "\n\n");
    let deduped = drop_duplicate_title(&collapsed);
    strip_code_line_numbers(&deduped).trim().to_string()
}

/// Some pages render their title once as text and again as the first
/// heading; keep only the heading.
fn drop_duplicate_title(input: &str) -> String {
    let lines: Vec<&str> = input.split('\n').collect();
    if lines.len() > 2 {
        if let Some(heading) = lines[2].strip_prefix("# ") {
            if lines[0].trim() == heading.trim() {
                return lines[2..].join("\n");
            }
        }
    }
    input.to_string()
}

fn strip_code_line_numbers(input: &str) -> String {
    let mut in_fence = false;
    let mut out: Vec<String> = Vec::new();

    for line in input.split('\n') {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            out.push(line.to_string());
            continue;
        }

        if in_fence {
            out.push(CODE_LINE_NUMBER.replace(line, "").into_owned());
        } else {
            out.push(line.to_string());
        }
    }

    out.join("\n")
}
