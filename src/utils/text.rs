//! Text normalization helpers.

use regex::Regex;
use std::sync::OnceLock;

/// Normalize a title for matching: trim and case-fold.
///
/// Matching is case-insensitive; everything else about the title is
/// preserved.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

fn trailing_year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*[\-\(\[\{]\s*(\d{4})[\)\]\}]?\s*$").unwrap())
}

/// Split a trailing year off a title, e.g. "Heat (1995)" -> ("Heat", Some(1995)).
///
/// Titles without a trailing year come back unchanged.
pub fn split_trailing_year(title: &str) -> (String, Option<u16>) {
    let trimmed = title.trim();
    if let Some(caps) = trailing_year_re().captures(trimmed) {
        let year = caps.get(1).and_then(|m| m.as_str().parse::<u16>().ok());
        let stripped = trailing_year_re().replace(trimmed, "").trim().to_string();
        if !stripped.is_empty() {
            return (stripped, year);
        }
    }
    (trimmed.to_string(), None)
}

fn tag_separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[,/|;]+").unwrap())
}

/// Split a combined tag string on `,` `/` `|` `;` separators, then
/// de-duplicate case-insensitively preserving first-seen order.
pub fn split_tags<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for value in values {
        for part in tag_separator_re().split(value) {
            let clean = part.trim();
            if clean.is_empty() {
                continue;
            }
            if seen.insert(clean.to_lowercase()) {
                out.push(clean.to_string());
            }
        }
    }
    out
}
