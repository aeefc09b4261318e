//! `[[term]]` reference extraction.

use once_cell::sync::Lazy;
use regex::Regex;

static WIKI_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\]]+)\]\]").expect("valid wiki link regex"));

/// Returns every `[[term]]` capture in left-to-right order.
///
/// Terms are returned raw: internal whitespace is kept, duplicates are kept,
/// and nothing is slugified. Unterminated `[[` yields no match.
pub fn extract_links(content: &str) -> Vec<&str> {
    WIKI_LINK_RE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}
