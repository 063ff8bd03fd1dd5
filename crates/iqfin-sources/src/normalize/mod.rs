//! Conversion of raw provider responses into [`SourceResult`]s.
//!
//! Clients only move bytes; all interpretation of status codes and bodies
//! happens here so every provider follows the same classification:
//! 401/402/403/429 are auth failures, other non-2xx are status failures, and
//! a body that is not the JSON we need is a malformed response. The brand
//! source is best-effort and never fails: every problem degrades to a
//! placeholder profile.

mod analysis;

use iqfin_core::{
    BrandProfile, ChatCompletion, ChatProvider, SourceFailure, SourceKind, SourcePayload,
    SourceResult, TokenUsage, WebExcerpt,
};
use serde_json::Value;

use crate::html::{bounded_prefix, page_title, visible_text};
use crate::pricing::estimate_cost;

pub use analysis::interpret_analysis;

/// Longest provider error message carried into a failure.
const MAX_ERROR_CHARS: usize = 300;

/// An HTTP response as received, before interpretation.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    /// Final URL after redirects.
    pub url: String,
    pub body: String,
}

impl RawResponse {
    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Which provider produced a [`RawResponse`], with the context needed to
/// interpret it.
#[derive(Debug, Clone, Copy)]
pub enum ProviderKind<'a> {
    /// `query` is the input as typed; `domain` is set only when it was a domain.
    Brand {
        query: &'a str,
        domain: Option<&'a str>,
    },
    Web { excerpt_chars: usize },
    Chat {
        provider: ChatProvider,
        requested_model: &'a str,
    },
}

/// Convert a raw provider response into a [`SourceResult`].
#[must_use]
pub fn normalize(raw: RawResponse, kind: ProviderKind<'_>) -> SourceResult {
    match kind {
        ProviderKind::Brand { query, domain } => normalize_brand(&raw, query, domain),
        ProviderKind::Web { excerpt_chars } => normalize_web(raw, excerpt_chars),
        ProviderKind::Chat {
            provider,
            requested_model,
        } => normalize_chat(&raw, provider, requested_model),
    }
}

fn normalize_brand(raw: &RawResponse, query: &str, domain: Option<&str>) -> SourceResult {
    let placeholder = || SourcePayload::Brand(BrandProfile::placeholder(query, domain));

    if !raw.is_success() {
        return SourceResult::degraded(
            placeholder(),
            format!("brand lookup returned HTTP {}", raw.status),
        );
    }

    let Ok(body) = serde_json::from_str::<Value>(&raw.body) else {
        return SourceResult::degraded(placeholder(), "brand lookup returned a non-JSON body");
    };

    // Some providers wrap the record in `{"brand": {...}}`.
    let record = body
        .get("brand")
        .filter(|b| b.is_object())
        .unwrap_or(&body);

    let name = string_field(record, &["name", "title"]);
    let profile = BrandProfile {
        name: name.clone().unwrap_or_else(|| query.trim().to_string()),
        domain: string_field(record, &["domain"]).or_else(|| domain.map(str::to_string)),
        industry: industry_field(record),
        description: string_field(record, &["description", "summary"]),
        logo_url: logo_field(record),
        colors: color_list(record),
    };

    if name.is_none() {
        return SourceResult::degraded(
            SourcePayload::Brand(profile),
            "brand lookup response had no name",
        );
    }
    SourceResult::success(SourcePayload::Brand(profile))
}

fn normalize_web(raw: RawResponse, excerpt_chars: usize) -> SourceResult {
    if !raw.is_success() {
        return SourceResult::failure(
            SourceKind::Web,
            SourceFailure::from_http_status(
                raw.status,
                format!("{} returned HTTP {}", raw.url, raw.status),
            ),
        );
    }

    let text = visible_text(&raw.body);
    let (text, truncated) = bounded_prefix(&text, excerpt_chars);
    SourceResult::success(SourcePayload::Web(WebExcerpt {
        title: page_title(&raw.body),
        url: raw.url,
        status: raw.status,
        text,
        truncated,
    }))
}

fn normalize_chat(raw: &RawResponse, provider: ChatProvider, requested_model: &str) -> SourceResult {
    let fail = |failure| SourceResult::failure(SourceKind::Analysis, failure);
    let body = serde_json::from_str::<Value>(&raw.body).ok();

    if !raw.is_success() {
        let message = body
            .as_ref()
            .and_then(provider_error_message)
            .unwrap_or_else(|| truncate(raw.body.trim(), MAX_ERROR_CHARS));
        return fail(SourceFailure::from_http_status(
            raw.status,
            format!("{provider} returned HTTP {}: {message}", raw.status),
        ));
    }

    let Some(body) = body else {
        return fail(SourceFailure::malformed(format!(
            "{provider} returned a non-JSON body"
        )));
    };

    // OpenRouter reports upstream failures as 200 with an `error` object.
    if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
        let message = provider_error_message(&body).unwrap_or_else(|| error.to_string());
        let code = error
            .get("code")
            .and_then(Value::as_u64)
            .and_then(|c| u16::try_from(c).ok());
        return fail(match code {
            Some(code) => SourceFailure::from_http_status(code, format!("{provider}: {message}")),
            None => SourceFailure::malformed(format!("{provider} reported an error: {message}")),
        });
    }

    let text = body
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty());
    let Some(text) = text else {
        return fail(SourceFailure::malformed(format!(
            "{provider} response has no choices[0].message.content"
        )));
    };

    let model = body
        .get("model")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or(requested_model)
        .to_string();
    let usage = body.get("usage").and_then(parse_usage);
    let estimated_cost_usd = usage.as_ref().and_then(|u| estimate_cost(&model, u));

    SourceResult::success(SourcePayload::Completion(ChatCompletion {
        provider,
        model,
        text: text.to_string(),
        usage,
        estimated_cost_usd,
    }))
}

fn parse_usage(value: &Value) -> Option<TokenUsage> {
    let count = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
    };
    let prompt_tokens = count("prompt_tokens")?;
    let completion_tokens = count("completion_tokens")?;
    let total_tokens =
        count("total_tokens").unwrap_or_else(|| prompt_tokens.saturating_add(completion_tokens));
    Some(TokenUsage {
        prompt_tokens,
        completion_tokens,
        total_tokens,
    })
}

fn provider_error_message(body: &Value) -> Option<String> {
    let error = body.get("error")?;
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())?;
    Some(truncate(message.trim(), MAX_ERROR_CHARS))
}

fn string_field(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn industry_field(record: &Value) -> Option<String> {
    if let Some(industry) = string_field(record, &["industry"]) {
        return Some(industry);
    }
    // `{"industries": [{"name": "Fintech"}, ...]}` or `["Fintech", ...]`
    record
        .get("industries")
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(|first| first.as_str().or_else(|| first.get("name").and_then(Value::as_str)))
        .map(str::to_string)
}

fn logo_field(record: &Value) -> Option<String> {
    let logo = record.get("logo").or_else(|| record.get("logo_url"))?;
    logo.as_str()
        .or_else(|| logo.get("url").and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn color_list(record: &Value) -> Vec<String> {
    record
        .get("colors")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|c| c.as_str().or_else(|| c.get("hex").and_then(Value::as_str)))
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
