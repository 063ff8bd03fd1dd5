use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Chat-completion provider used for the analysis stage.
///
/// Both providers speak the same `/chat/completions` wire shape; they differ
/// in endpoint, credential variable, default model, and attribution headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatProvider {
    OpenRouter,
    OpenAi,
}

impl ChatProvider {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ChatProvider::OpenRouter => "openrouter",
            ChatProvider::OpenAi => "openai",
        }
    }

    #[must_use]
    pub fn default_base_url(self) -> &'static str {
        match self {
            ChatProvider::OpenRouter => "https://openrouter.ai/api/v1",
            ChatProvider::OpenAi => "https://api.openai.com/v1",
        }
    }

    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            ChatProvider::OpenRouter => "openrouter/auto",
            ChatProvider::OpenAi => "gpt-4o-mini",
        }
    }

    /// Environment variable holding this provider's API key.
    #[must_use]
    pub fn api_key_var(self) -> &'static str {
        match self {
            ChatProvider::OpenRouter => "OPENROUTER_API_KEY",
            ChatProvider::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl std::fmt::Display for ChatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openrouter" => Ok(ChatProvider::OpenRouter),
            "openai" => Ok(ChatProvider::OpenAi),
            other => Err(format!(
                "unknown provider \"{other}\" (expected openrouter or openai)"
            )),
        }
    }
}

/// Shape of the analysis the model is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    /// Seven-section markdown B2B intelligence report.
    #[default]
    Report,
    /// Single JSON object with summary, strengths, risks, position, growth.
    Structured,
}

impl std::fmt::Display for PromptStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromptStyle::Report => write!(f, "report"),
            PromptStyle::Structured => write!(f, "structured"),
        }
    }
}

impl FromStr for PromptStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "report" | "markdown" => Ok(PromptStyle::Report),
            "structured" | "json" => Ok(PromptStyle::Structured),
            other => Err(format!(
                "unknown prompt style \"{other}\" (expected report or structured)"
            )),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub user_agent: String,
    pub ai_provider: ChatProvider,
    pub ai_api_key: String,
    pub ai_model: String,
    pub ai_base_url: String,
    pub ai_temperature: f32,
    pub ai_max_tokens: u32,
    pub ai_timeout_secs: u64,
    pub prompt_style: PromptStyle,
    pub brand_api_url: String,
    pub brand_api_key: String,
    pub brand_timeout_secs: u64,
    pub web_timeout_secs: u64,
    pub web_excerpt_chars: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("user_agent", &self.user_agent)
            .field("ai_provider", &self.ai_provider)
            .field("ai_api_key", &"[redacted]")
            .field("ai_model", &self.ai_model)
            .field("ai_base_url", &self.ai_base_url)
            .field("ai_temperature", &self.ai_temperature)
            .field("ai_max_tokens", &self.ai_max_tokens)
            .field("ai_timeout_secs", &self.ai_timeout_secs)
            .field("prompt_style", &self.prompt_style)
            .field("brand_api_url", &self.brand_api_url)
            .field("brand_api_key", &"[redacted]")
            .field("brand_timeout_secs", &self.brand_timeout_secs)
            .field("web_timeout_secs", &self.web_timeout_secs)
            .field("web_excerpt_chars", &self.web_excerpt_chars)
            .finish()
    }
}
