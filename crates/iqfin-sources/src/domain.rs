//! URL and domain normalization for user-supplied company identifiers.

/// Ensures `input` carries a scheme, inserting `https://` when none is given.
///
/// Idempotent: an already-schemed URL is returned unchanged.
///
/// `"example.com"` becomes `"https://example.com"`.
#[must_use]
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed.trim_start_matches('/'))
    }
}

/// Reduces a domain or URL to its lowercase host, without scheme, path,
/// query, or port.
///
/// Falls back to a string split when the input does not parse as a URL.
#[must_use]
pub fn bare_domain(input: &str) -> String {
    let url = normalize_url(input);
    reqwest::Url::parse(&url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .unwrap_or_else(|| {
            tracing::debug!(input, "could not parse as URL; splitting host manually");
            let without_scheme = url.split_once("://").map_or(url.as_str(), |(_, rest)| rest);
            without_scheme
                .split(['/', '?', '#'])
                .next()
                .unwrap_or(without_scheme)
                .split(':')
                .next()
                .unwrap_or(without_scheme)
                .to_ascii_lowercase()
        })
}

fn has_scheme(s: &str) -> bool {
    s.split_once("://").is_some_and(|(scheme, _)| {
        !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}
