//! Brand-identity lookup client.

use std::time::Duration;

use iqfin_core::{BrandProfile, Query, SourceKind, SourcePayload, SourceResult};
use reqwest::{Client, Url};

use crate::domain::bare_domain;
use crate::error::{transport_failure, SourceError};
use crate::normalize::{normalize, ProviderKind, RawResponse};
use crate::source::Source;

/// Client for the brand-identity endpoint.
///
/// Best-effort: every problem, including transport errors, resolves to a
/// degraded result carrying a placeholder profile named after the input.
pub struct BrandClient {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl BrandClient {
    /// Creates a client that posts lookups to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidEndpoint`] if `endpoint` is not an
    /// absolute URL, or [`SourceError::Http`] if the `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        endpoint: &str,
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, SourceError> {
        let endpoint = Url::parse(endpoint).map_err(|e| SourceError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.to_owned(),
        })
    }

    /// Looks up the brand profile for the company in `input`.
    ///
    /// `input` may be a bare domain, a full URL, or a company name; only the
    /// lowercased host is sent. A placeholder profile keeps `input` as typed
    /// and carries a domain only when `input` looks like one.
    pub async fn lookup(&self, input: &str) -> SourceResult {
        let input = input.trim();
        let lookup_key = bare_domain(input);
        let domain = known_domain(input);
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "domain": lookup_key }))
            .send()
            .await;

        let raw = match response {
            Ok(resp) => {
                let status = resp.status().as_u16();
                let url = resp.url().to_string();
                match resp.text().await {
                    Ok(body) => RawResponse { status, url, body },
                    Err(e) => return degraded_on_transport(input, domain.as_deref(), &e),
                }
            }
            Err(e) => return degraded_on_transport(input, domain.as_deref(), &e),
        };

        let result = normalize(
            raw,
            ProviderKind::Brand {
                query: input,
                domain: domain.as_deref(),
            },
        );
        if let SourceResult::Success {
            degraded: Some(note),
            ..
        } = &result
        {
            tracing::warn!(lookup = %lookup_key, note = %note, "brand lookup degraded");
        } else {
            tracing::debug!(lookup = %lookup_key, "brand lookup succeeded");
        }
        result
    }
}

/// The bare domain of `input`, or `None` when `input` reads as a company name.
fn known_domain(input: &str) -> Option<String> {
    Query::parse(input)
        .ok()
        .filter(Query::is_domain_like)
        .map(|query| bare_domain(query.as_str()))
}

fn degraded_on_transport(input: &str, domain: Option<&str>, err: &reqwest::Error) -> SourceResult {
    let failure = transport_failure(err);
    tracing::warn!(query = input, error = %failure, "brand lookup unavailable; using placeholder");
    SourceResult::degraded(
        SourcePayload::Brand(BrandProfile::placeholder(input, domain)),
        failure.to_string(),
    )
}

impl Source for BrandClient {
    fn kind(&self) -> SourceKind {
        SourceKind::Brand
    }

    async fn fetch(&self, input: &str) -> SourceResult {
        self.lookup(input).await
    }
}
