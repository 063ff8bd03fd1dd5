//! Chat-completion client for OpenRouter and OpenAI.
//!
//! Both providers accept the same `/chat/completions` request; OpenRouter
//! additionally receives attribution headers.

use std::time::Duration;

use iqfin_core::{ChatProvider, SourceKind, SourceResult};
use reqwest::{Client, Url};
use serde::Serialize;

use crate::error::{transport_failure, SourceError};
use crate::normalize::{normalize, ProviderKind, RawResponse};
use crate::source::Source;

const OPENROUTER_REFERER: &str = "http://localhost:8501";
const OPENROUTER_TITLE: &str = "iqfin";

/// Settings for one [`ChatClient`].
#[derive(Debug, Clone)]
pub struct ChatClientConfig {
    pub provider: ChatProvider,
    /// API root, e.g. `https://openrouter.ai/api/v1`.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Fixed system role sent ahead of every prompt.
    pub system_prompt: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Client for one chat-completion provider.
pub struct ChatClient {
    client: Client,
    endpoint: Url,
    config: ChatClientConfig,
}

impl ChatClient {
    /// Creates a client posting to `{base_url}/chat/completions`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidEndpoint`] if `base_url` does not form a
    /// valid URL, or [`SourceError::Http`] if the `reqwest::Client` cannot be
    /// constructed.
    pub fn new(config: ChatClientConfig) -> Result<Self, SourceError> {
        let raw_endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&raw_endpoint).map_err(|e| SourceError::InvalidEndpoint {
            endpoint: raw_endpoint.clone(),
            reason: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    /// Sends `prompt` as the user message and normalizes the completion.
    ///
    /// Every failure, including timeouts, is returned as a
    /// [`SourceResult::Failure`] for [`SourceKind::Analysis`].
    pub async fn complete(&self, prompt: &str) -> SourceResult {
        let provider = self.config.provider;
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.config.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        tracing::debug!(
            provider = %provider,
            model = %self.config.model,
            prompt_chars = prompt.chars().count(),
            "sending chat completion"
        );

        let raw = match self.send(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                let failure = transport_failure(&e);
                tracing::warn!(provider = %provider, error = %failure, "chat completion failed");
                return SourceResult::failure(SourceKind::Analysis, failure);
            }
        };

        normalize(
            raw,
            ProviderKind::Chat {
                provider,
                requested_model: &self.config.model,
            },
        )
    }

    async fn send(&self, request: &ChatRequest<'_>) -> Result<RawResponse, reqwest::Error> {
        let mut builder = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.config.api_key)
            .json(request);
        if self.config.provider == ChatProvider::OpenRouter {
            builder = builder
                .header("HTTP-Referer", OPENROUTER_REFERER)
                .header("X-Title", OPENROUTER_TITLE);
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let url = resp.url().to_string();
        let body = resp.text().await?;
        Ok(RawResponse { status, url, body })
    }
}

impl Source for ChatClient {
    fn kind(&self) -> SourceKind {
        SourceKind::Analysis
    }

    async fn fetch(&self, input: &str) -> SourceResult {
        self.complete(input).await
    }
}
