//! AI analysis payloads: raw completions and their normalized form.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::app_config::ChatProvider;

/// Token counters reported by a chat-completion provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// First completion extracted from a chat provider response, before the
/// text has been interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    pub provider: ChatProvider,
    /// Model that actually served the request (may differ from the one asked for).
    pub model: String,
    pub text: String,
    pub usage: Option<TokenUsage>,
    pub estimated_cost_usd: Option<Decimal>,
}

/// Analysis fields pulled from a JSON answer.
///
/// The five well-known keys get typed slots; every other key is kept in
/// `sections` in the order the model produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executive_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strengths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub risks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth_potential: Option<String>,
    #[serde(flatten)]
    pub sections: Map<String, Value>,
}

impl StructuredAnalysis {
    /// Split a JSON object into the known fields and the remaining sections.
    ///
    /// Known fields are accepted leniently: a list where a string is expected
    /// is joined, a string where a list is expected becomes one item.
    #[must_use]
    pub fn from_object(mut object: Map<String, Value>) -> Self {
        let executive_summary = object
            .remove("executive_summary")
            .and_then(value_to_text);
        let strengths = object
            .remove("strengths")
            .map(value_to_list)
            .unwrap_or_default();
        let risks = object
            .remove("risks")
            .map(value_to_list)
            .unwrap_or_default();
        let market_position = object.remove("market_position").and_then(value_to_text);
        let growth_potential = object.remove("growth_potential").and_then(value_to_text);

        Self {
            executive_summary,
            strengths,
            risks,
            market_position,
            growth_potential,
            sections: object,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.executive_summary.is_none()
            && self.strengths.is_empty()
            && self.risks.is_empty()
            && self.market_position.is_none()
            && self.growth_potential.is_none()
            && self.sections.is_empty()
    }
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let s = s.trim().to_string();
            (!s.is_empty()).then_some(s)
        }
        Value::Array(items) => {
            let joined = items
                .into_iter()
                .filter_map(value_to_text)
                .collect::<Vec<_>>()
                .join(" ");
            (!joined.is_empty()).then_some(joined)
        }
        other => Some(other.to_string()),
    }
}

fn value_to_list(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.into_iter().filter_map(value_to_text).collect(),
        other => value_to_text(other).into_iter().collect(),
    }
}

/// Interpreted AI output: structured JSON or display-ready markdown.
///
/// Decided once when the completion is normalized; downstream code matches
/// on the variant instead of re-inspecting the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", content = "content", rename_all = "snake_case")]
pub enum AnalysisBody {
    Structured(StructuredAnalysis),
    Markdown(String),
}

impl AnalysisBody {
    #[must_use]
    pub fn is_structured(&self) -> bool {
        matches!(self, AnalysisBody::Structured(_))
    }
}

/// Normalized result of the analysis stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiAnalysis {
    pub provider: ChatProvider,
    pub model: String,
    pub body: AnalysisBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost_usd: Option<Decimal>,
}

impl AiAnalysis {
    /// Attach an interpreted body to the completion's provider metadata.
    #[must_use]
    pub fn from_completion(completion: ChatCompletion, body: AnalysisBody) -> Self {
        Self {
            provider: completion.provider,
            model: completion.model,
            body,
            usage: completion.usage,
            estimated_cost_usd: completion.estimated_cost_usd,
        }
    }
}
