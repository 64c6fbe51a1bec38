use std::sync::LazyLock;

use regex::Regex;

// `\s` covers line feeds, so they collapse like any other whitespace.
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Collapse every whitespace run into a single space and trim both ends.
pub fn normalize(s: &str) -> String {
    WHITESPACE_RE.replace_all(s, " ").trim().to_string()
}
