//! HTML helpers for publisher article pages.

use std::sync::LazyLock;

use regex::Regex;

static LINK_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<link\b[^>]*>").expect("valid regex"));
static REL_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)(?:^|\s)rel\s*=\s*["']([^"']+)["']"#).expect("valid rel regex"));
static HREF_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)(?:^|\s)href\s*=\s*["']([^"']+)["']"#).expect("valid href regex"));
static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<p\b[^>]*>(.*?)</p\s*>").expect("valid paragraph regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Resolve the publisher URL declared in the page head.
///
/// Prefers `<link rel="canonical">`. When its href is not an absolute
/// `http(s)` URL, the first `<link rel="alternate">` is used instead.
#[must_use]
pub fn canonical_url(html: &str) -> Option<String> {
    let head = head_section(html);
    let canonical = find_link_href(head, "canonical")?;
    if canonical.contains("http") {
        return Some(canonical);
    }
    find_link_href(head, "alternate").or(Some(canonical))
}

/// Text of every `<p>` element mentioning at least one of `query_terms`.
///
/// Matching is case-sensitive: tickers and company names are matched as
/// written. Tags are stripped, common entities decoded, and whitespace
/// collapsed. Paragraphs that end up empty are dropped.
#[must_use]
pub fn extract_paragraphs(html: &str, query_terms: &[String]) -> Vec<String> {
    PARAGRAPH_RE
        .captures_iter(html)
        .filter_map(|cap| cap.get(1))
        .map(|m| clean_text(m.as_str()))
        .filter(|text| !text.is_empty())
        .filter(|text| query_terms.iter().any(|term| text.contains(term.as_str())))
        .collect()
}

/// Strip tags, decode the handful of entities news sites actually emit, and
/// collapse whitespace.
pub(crate) fn clean_text(fragment: &str) -> String {
    let stripped = TAG_RE.replace_all(fragment, " ");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&rsquo;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    WHITESPACE_RE.replace_all(&decoded, " ").trim().to_string()
}

fn head_section(html: &str) -> &str {
    // ASCII lowercasing keeps byte offsets aligned with the original.
    match html.to_ascii_lowercase().find("</head") {
        Some(end) => &html[..end],
        None => html,
    }
}

fn find_link_href(html: &str, rel: &str) -> Option<String> {
    LINK_TAG_RE
        .find_iter(html)
        .map(|m| m.as_str())
        .find(|tag| {
            extract_attr(&REL_ATTR_RE, tag).is_some_and(|value| {
                value
                    .split_ascii_whitespace()
                    .any(|token| token.eq_ignore_ascii_case(rel))
            })
        })
        .and_then(|tag| extract_attr(&HREF_ATTR_RE, tag))
        .map(|href| href.replace("&amp;", "&"))
}

fn extract_attr(re: &Regex, tag: &str) -> Option<String> {
    re.captures(tag)
        .and_then(|c| c.get(1).map(|m| m.as_str().trim().to_string()))
}
