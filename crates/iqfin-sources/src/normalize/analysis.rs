//! Interpretation of AI completion text as structured JSON or markdown.

use std::sync::LazyLock;

use iqfin_core::{AnalysisBody, StructuredAnalysis};
use regex::Regex;
use serde_json::Value;

/// A fenced code block: optional language label, then the interior up to the
/// closing fence (or end of text when the model was cut off mid-block).
static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[ \t]*([A-Za-z0-9_+-]*)[^\n]*\n(.*?)(?:```|\z)")
        .expect("valid fence regex")
});

/// Decide once whether a completion is structured JSON or opaque markdown.
///
/// Candidate order:
/// 1. the interior of the first fenced block labeled `json`;
/// 2. otherwise the interior of the first fenced block of any label;
/// 3. the full text.
///
/// The first candidate that parses as a JSON object with at least one
/// non-empty field wins. When none does,
/// the untouched text is returned as [`AnalysisBody::Markdown`]; that is an
/// expected outcome, not an error.
#[must_use]
pub fn interpret_analysis(text: &str) -> AnalysisBody {
    let fenced = fenced_candidate(text);
    let structured = fenced
        .into_iter()
        .chain(std::iter::once(text))
        .find_map(parse_object);

    match structured {
        Some(analysis) => AnalysisBody::Structured(analysis),
        None => AnalysisBody::Markdown(text.to_string()),
    }
}

fn fenced_candidate(text: &str) -> Option<&str> {
    let mut first_any = None;
    for cap in FENCE_RE.captures_iter(text) {
        let label = cap.get(1).map_or("", |m| m.as_str());
        let Some(interior) = cap.get(2).map(|m| m.as_str()) else {
            continue;
        };
        if label.eq_ignore_ascii_case("json") {
            return Some(interior);
        }
        if first_any.is_none() {
            first_any = Some(interior);
        }
    }
    first_any
}

fn parse_object(candidate: &str) -> Option<StructuredAnalysis> {
    match serde_json::from_str::<Value>(candidate.trim()) {
        Ok(Value::Object(map)) => {
            Some(StructuredAnalysis::from_object(map)).filter(|analysis| !analysis.is_empty())
        }
        _ => None,
    }
}
