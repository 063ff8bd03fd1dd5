//! Company-website fetch client.

use std::time::Duration;

use iqfin_core::{SourceKind, SourceResult};
use reqwest::{redirect, Client};

use crate::domain::normalize_url;
use crate::error::{transport_failure, SourceError};
use crate::normalize::{normalize, ProviderKind, RawResponse};
use crate::source::Source;

const MAX_REDIRECTS: usize = 10;

/// Body bytes read per excerpt character; markup outweighs visible text.
const BODY_BYTES_PER_EXCERPT_CHAR: usize = 64;

/// Fetches a company homepage and keeps a bounded excerpt of its visible text.
pub struct WebFetchClient {
    client: Client,
    excerpt_chars: usize,
}

impl WebFetchClient {
    /// Creates a client that keeps at most `excerpt_chars` characters of page text.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the `reqwest::Client` cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        excerpt_chars: usize,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            excerpt_chars,
        })
    }

    /// GETs the page for `input` (scheme added when missing).
    ///
    /// Non-2xx statuses and transport errors are returned as failures.
    pub async fn fetch_page(&self, input: &str) -> SourceResult {
        let url = normalize_url(input);
        let raw = match self.read(&url).await {
            Ok(raw) => raw,
            Err(e) => {
                let failure = transport_failure(&e);
                tracing::warn!(url = %url, error = %failure, "website fetch failed");
                return SourceResult::failure(SourceKind::Web, failure);
            }
        };

        let result = normalize(
            raw,
            ProviderKind::Web {
                excerpt_chars: self.excerpt_chars,
            },
        );
        match result.failure_reason() {
            Some(failure) => tracing::warn!(url = %url, error = %failure, "website fetch failed"),
            None => tracing::debug!(url = %url, "website fetched"),
        }
        result
    }

    /// Reads at most [`body_byte_cap`] bytes of the body; the rest of the
    /// response is dropped unread.
    async fn read(&self, url: &str) -> Result<RawResponse, reqwest::Error> {
        let mut resp = self.client.get(url).send().await?;
        let status = resp.status().as_u16();
        let final_url = resp.url().to_string();

        let cap = body_byte_cap(self.excerpt_chars);
        let mut body = Vec::new();
        while let Some(chunk) = resp.chunk().await? {
            if append_capped(&mut body, &chunk, cap) {
                tracing::debug!(url = %final_url, cap, "page body cut at byte cap");
                break;
            }
        }

        Ok(RawResponse {
            status,
            url: final_url,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

pub(crate) const fn body_byte_cap(excerpt_chars: usize) -> usize {
    excerpt_chars.saturating_mul(BODY_BYTES_PER_EXCERPT_CHAR)
}

/// Appends as much of `chunk` as fits under `cap`; `true` once `body` is full.
fn append_capped(body: &mut Vec<u8>, chunk: &[u8], cap: usize) -> bool {
    let room = cap.saturating_sub(body.len());
    body.extend_from_slice(&chunk[..chunk.len().min(room)]);
    body.len() >= cap
}

impl Source for WebFetchClient {
    fn kind(&self) -> SourceKind {
        SourceKind::Web
    }

    async fn fetch(&self, input: &str) -> SourceResult {
        self.fetch_page(input).await
    }
}
