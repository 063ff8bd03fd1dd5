//! Visible-text extraction for fetched pages.

use std::sync::LazyLock;

use regex::Regex;

static HIDDEN_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<noscript\b[^>]*>.*?</noscript\s*>|<svg\b[^>]*>.*?</svg\s*>",
    )
    .expect("valid hidden block regex")
});
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").expect("valid title regex")
});

/// Returns the trimmed `<title>` text, if any.
pub(crate) fn page_title(html: &str) -> Option<String> {
    TITLE_RE
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| clean_text(m.as_str()))
        .filter(|t| !t.is_empty())
}

/// Strips scripts, styles, comments, and tags, then collapses whitespace.
///
/// Plain-text bodies pass through with only whitespace collapsed.
pub(crate) fn visible_text(html: &str) -> String {
    let without_hidden = HIDDEN_BLOCK_RE.replace_all(html, " ");
    let without_comments = COMMENT_RE.replace_all(&without_hidden, " ");
    let without_tags = TAG_RE.replace_all(&without_comments, " ");
    clean_text(&without_tags)
}

/// First `max_chars` characters of `text`, and whether anything was cut.
pub(crate) fn bounded_prefix(text: &str, max_chars: usize) -> (String, bool) {
    let mut chars = text.chars();
    let prefix: String = chars.by_ref().take(max_chars).collect();
    let truncated = chars.next().is_some();
    (prefix, truncated)
}

fn clean_text(raw: &str) -> String {
    let decoded = decode_entities(raw);
    WHITESPACE_RE.replace_all(&decoded, " ").trim().to_string()
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
