use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;
use url::Url;

/// Index-page suffixes observed on EDGAR filing detail links.
const INDEX_SUFFIXES: &[&str] = &["-index.htm", "-index.html"];

/// Derive the stable accession-style identifier from a filing's detail link.
///
/// Takes the last path segment and strips a recognized index-page suffix.
/// Example: `.../0001234567-25-000001-index.htm` -> `0001234567-25-000001`.
/// Never panics: a link with no usable path segment yields an empty string,
/// which callers treat as "skip this candidate".
pub fn extract_filing_id(link: &str) -> String {
    let segment = match Url::parse(link) {
        Ok(url) => last_segment(url.path()),
        // Not an absolute URL; fall back to treating the whole string as a path.
        Err(_) => last_segment(link),
    };

    for suffix in INDEX_SUFFIXES {
        if let Some(stripped) = segment.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }

    if segment.ends_with(".htm") || segment.ends_with(".html") {
        // Unknown suffix variant: keep the segment intact rather than guess.
        warn!(link = link, "unrecognized index-page suffix on filing link");
    }

    segment
}

fn last_segment(path: &str) -> String {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
        .to_string()
}

/// Split a feed title into (form type, company name).
///
/// EDGAR conventionally emits "<form type> - <company name>", but the reversed
/// order and separator-less titles show up too. A missing or unrecognizable
/// form type yields the "N/A" sentinel with the full title as the company.
pub fn parse_title(title: &str) -> (String, String) {
    let title = title.trim();

    if let Some((lhs, rhs)) = title.split_once(" - ") {
        if looks_like_form_type(lhs) {
            return (lhs.trim().to_string(), rhs.trim().to_string());
        }
        if let Some((head, tail)) = title.rsplit_once(" - ") {
            if looks_like_form_type(tail) {
                return (tail.trim().to_string(), head.trim().to_string());
            }
        }
        // Neither side looks like a form type; assume the feed convention.
        return (lhs.trim().to_string(), rhs.trim().to_string());
    }

    ("N/A".to_string(), title.to_string())
}

/// Form types are short, upper-case, and carry at least one digit
/// ("8-K", "10-Q", "424B2", "SC 13G/A").
fn looks_like_form_type(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() || s.len() > 12 {
        return false;
    }
    s.chars().any(|c| c.is_ascii_digit())
        && s.chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '-' | '/' | ' '))
}

static TAG_RE: OnceLock<Regex> = OnceLock::new();

/// Replace HTML tags with spaces, preserving line structure.
pub fn strip_html_tags(text: &str) -> String {
    let re = TAG_RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag regex is valid"));
    re.replace_all(text, " ").to_string()
}

/// Truncate a summary for chat delivery, preferring sentence then word
/// boundaries, always cutting on a char boundary.
pub fn truncate_summary(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }

    let mut cut = max_len;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    let truncated = &text[..cut];

    if let Some(pos) = truncated.rfind('.') {
        truncated[..pos + 1].to_string()
    } else if let Some(pos) = truncated.rfind(' ') {
        format!("{}...", &truncated[..pos])
    } else {
        format!("{}...", truncated)
    }
}
