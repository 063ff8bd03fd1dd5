//! Enrichment orchestration.

use std::time::Instant;

use chrono::Utc;
use iqfin_core::{
    AiAnalysis, AppConfig, BrandProfile, ChatCompletion, PromptStyle, Query, Report,
    ReportOutcome, SourceFailure, SourceKind, SourcePayload, SourceResult, SourceState,
    SourceStatus, StageFailure, WebExcerpt,
};
use iqfin_sources::{
    interpret_analysis, BrandClient, ChatClient, ChatClientConfig, Source, WebFetchClient,
};

use crate::error::EnrichError;
use crate::policy::{PolicyTable, SourcePolicy};
use crate::prompt::{build_prompt, system_prompt};

/// Runs one query through brand lookup, website fetch, and AI analysis.
///
/// Holds no per-run state; one `Enricher` can serve any number of
/// concurrent [`Enricher::enrich`] calls.
pub struct Enricher<B, W, A> {
    brand: B,
    web: W,
    analysis: A,
    style: PromptStyle,
    policies: PolicyTable,
}

/// The production wiring: HTTP clients for every source.
pub type LiveEnricher = Enricher<BrandClient, WebFetchClient, ChatClient>;

impl LiveEnricher {
    /// Builds every source client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Client`] if any client cannot be constructed
    /// (bad endpoint URL, TLS backend failure).
    pub fn from_config(config: &AppConfig) -> Result<Self, EnrichError> {
        let brand = BrandClient::new(
            &config.brand_api_url,
            &config.brand_api_key,
            config.brand_timeout_secs,
            &config.user_agent,
        )
        .map_err(|source| EnrichError::Client {
            client: "brand",
            source,
        })?;

        let web = WebFetchClient::new(
            config.web_timeout_secs,
            &config.user_agent,
            config.web_excerpt_chars,
        )
        .map_err(|source| EnrichError::Client {
            client: "web",
            source,
        })?;

        let analysis = ChatClient::new(ChatClientConfig {
            provider: config.ai_provider,
            base_url: config.ai_base_url.clone(),
            api_key: config.ai_api_key.clone(),
            model: config.ai_model.clone(),
            temperature: config.ai_temperature,
            max_tokens: config.ai_max_tokens,
            timeout_secs: config.ai_timeout_secs,
            user_agent: config.user_agent.clone(),
            system_prompt: system_prompt(config.prompt_style).to_string(),
        })
        .map_err(|source| EnrichError::Client {
            client: "analysis",
            source,
        })?;

        Ok(Self::new(brand, web, analysis, config.prompt_style))
    }
}

impl<B: Source, W: Source, A: Source> Enricher<B, W, A> {
    #[must_use]
    pub fn new(brand: B, web: W, analysis: A, style: PromptStyle) -> Self {
        Self {
            brand,
            web,
            analysis,
            style,
            policies: PolicyTable::default(),
        }
    }

    /// Replaces the default [`PolicyTable`].
    #[must_use]
    pub fn with_policies(mut self, policies: PolicyTable) -> Self {
        self.policies = policies;
        self
    }

    /// Enrich `query` into a [`Report`].
    ///
    /// 1. Brand lookup and website fetch run concurrently.
    /// 2. A failed source whose policy is [`SourcePolicy::Required`] ends the
    ///    run: the report carries that stage's failure and no analysis. With
    ///    the default table only the analysis is required.
    /// 3. Whatever arrived is rendered into the analysis prompt and exactly
    ///    one chat completion is requested.
    /// 4. The completion text is classified once as structured or markdown.
    ///
    /// A report with no completion is always failed, whatever the analysis
    /// policy says. Never retries and never returns early without a report.
    pub async fn enrich(&self, query: &Query) -> Report {
        let started = Instant::now();
        let input = query.as_str();
        tracing::debug!(query = input, "starting enrichment");

        let (brand_result, web_result) =
            tokio::join!(self.brand.fetch(input), self.web.fetch(input));

        let mut sources = Vec::with_capacity(3);

        let (status, brand_payload) = self.settle(SourceKind::Brand, brand_result);
        sources.push(status);
        let brand: Option<BrandProfile> = match brand_payload {
            Ok(SourcePayload::Brand(profile)) => Some(profile),
            _ => None,
        };

        let (status, web_payload) = self.settle(SourceKind::Web, web_result);
        sources.push(status);
        let web: Option<WebExcerpt> = match web_payload {
            Ok(SourcePayload::Web(excerpt)) => Some(excerpt),
            _ => None,
        };

        let outcome = match self.required_failure(&sources) {
            Some(failure) => ReportOutcome::Failed(failure),
            None => self.analyze_with(query, brand.as_ref(), web.as_ref(), &mut sources).await,
        };

        let report = Report::new(query.clone(), Utc::now(), brand, web, outcome, sources);
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match report.failure() {
            Some(failure) => tracing::error!(
                query = input,
                elapsed_ms,
                error = %failure,
                "enrichment failed"
            ),
            None => tracing::info!(
                query = input,
                elapsed_ms,
                sources_used = report.sources_used(),
                "report complete"
            ),
        }
        report
    }

    async fn analyze_with(
        &self,
        query: &Query,
        brand: Option<&BrandProfile>,
        web: Option<&WebExcerpt>,
        sources: &mut Vec<SourceStatus>,
    ) -> ReportOutcome {
        let prompt = build_prompt(self.style, query, brand, web);
        let analysis_result = self.analysis.fetch(&prompt).await;

        let (status, analysis_payload) = self.settle(SourceKind::Analysis, analysis_result);
        sources.push(status);
        let completion = analysis_payload.and_then(|payload| match payload {
            SourcePayload::Completion(completion) => Ok(completion),
            other => Err(SourceFailure::malformed(format!(
                "analysis source returned a {} payload",
                other.source()
            ))),
        });
        match completion {
            Ok(completion) => ReportOutcome::Analyzed(analyze(completion)),
            Err(failure) => ReportOutcome::Failed(StageFailure {
                stage: SourceKind::Analysis,
                failure,
            }),
        }
    }

    /// The first recorded failure of a source the table marks required.
    fn required_failure(&self, sources: &[SourceStatus]) -> Option<StageFailure> {
        sources.iter().find_map(|status| match &status.state {
            SourceState::Failed { failure } if self.policies.get(status.source).is_required() => {
                Some(StageFailure {
                    stage: status.source,
                    failure: failure.clone(),
                })
            }
            _ => None,
        })
    }

    fn settle(
        &self,
        kind: SourceKind,
        result: SourceResult,
    ) -> (SourceStatus, Result<SourcePayload, SourceFailure>) {
        settle_source(kind, self.policies.get(kind), result)
    }
}

fn analyze(completion: ChatCompletion) -> AiAnalysis {
    let body = interpret_analysis(&completion.text);
    tracing::debug!(
        model = %completion.model,
        structured = body.is_structured(),
        "analysis interpreted"
    );
    AiAnalysis::from_completion(completion, body)
}

/// Record the status of one source result and hand back its payload.
///
/// A payload of the wrong kind is treated as a malformed response.
fn settle_source(
    kind: SourceKind,
    policy: SourcePolicy,
    result: SourceResult,
) -> (SourceStatus, Result<SourcePayload, SourceFailure>) {
    let (state, payload) = match result {
        SourceResult::Success { payload, .. } if payload.source() != kind => {
            let failure = SourceFailure::malformed(format!(
                "{kind} source returned a {} payload",
                payload.source()
            ));
            log_failure(kind, policy, &failure);
            (
                SourceState::Failed {
                    failure: failure.clone(),
                },
                Err(failure),
            )
        }
        SourceResult::Success {
            payload,
            degraded: Some(note),
            ..
        } => {
            tracing::warn!(source = %kind, note = %note, "source degraded");
            (SourceState::Degraded { note }, Ok(payload))
        }
        SourceResult::Success {
            payload,
            degraded: None,
            ..
        } => {
            tracing::debug!(source = %kind, "source ok");
            (SourceState::Ok, Ok(payload))
        }
        SourceResult::Failure { failure, .. } => {
            log_failure(kind, policy, &failure);
            (
                SourceState::Failed {
                    failure: failure.clone(),
                },
                Err(failure),
            )
        }
    };
    (
        SourceStatus {
            source: kind,
            state,
        },
        payload,
    )
}

fn log_failure(kind: SourceKind, policy: SourcePolicy, failure: &SourceFailure) {
    match policy {
        SourcePolicy::BestEffort => {
            tracing::warn!(source = %kind, error = %failure, "best-effort source failed; continuing");
        }
        SourcePolicy::Required => {
            tracing::error!(source = %kind, error = %failure, "required source failed");
        }
    }
}
