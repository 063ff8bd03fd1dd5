//! End-to-end enrichment scenarios.
//!
//! Most tests drive the orchestrator with canned sources; the last one wires
//! the real HTTP clients against a wiremock server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use iqfin_core::{
    AnalysisBody, AppConfig, BrandProfile, ChatCompletion, ChatProvider, FailureKind,
    PromptStyle, Query, SourceFailure, SourceKind, SourcePayload, SourceResult, SourceState,
    TokenUsage, WebExcerpt,
};
use iqfin_enrich::{Enricher, LiveEnricher, PolicyTable, SourcePolicy};
use iqfin_sources::Source;
use rust_decimal::Decimal;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A source that returns the same result every time and records its inputs.
struct Canned {
    kind: SourceKind,
    result: SourceResult,
    calls: AtomicUsize,
    inputs: Mutex<Vec<String>>,
}

impl Canned {
    fn new(kind: SourceKind, result: SourceResult) -> Self {
        Self {
            kind,
            result,
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_input(&self) -> String {
        self.inputs
            .lock()
            .expect("inputs lock")
            .last()
            .cloned()
            .unwrap_or_default()
    }
}

impl Source for Canned {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch(&self, input: &str) -> SourceResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs
            .lock()
            .expect("inputs lock")
            .push(input.to_string());
        self.result.clone()
    }
}

/// Lets a test keep a handle on a source the enricher owns.
struct SharedSource(Arc<Canned>);

impl Source for SharedSource {
    fn kind(&self) -> SourceKind {
        self.0.kind()
    }

    async fn fetch(&self, input: &str) -> SourceResult {
        self.0.fetch(input).await
    }
}

fn stripe_brand() -> SourceResult {
    SourceResult::success(SourcePayload::Brand(BrandProfile {
        name: "Stripe".to_string(),
        domain: Some("stripe.com".to_string()),
        industry: Some("Fintech".to_string()),
        description: None,
        logo_url: None,
        colors: vec!["#635BFF".to_string()],
    }))
}

fn stripe_page() -> SourceResult {
    SourceResult::success(SourcePayload::Web(WebExcerpt {
        url: "https://stripe.com/".to_string(),
        status: 200,
        title: Some("Stripe | Financial Infrastructure".to_string()),
        text: "Millions of companies use Stripe to accept payments.".to_string(),
        truncated: false,
    }))
}

fn json_completion() -> SourceResult {
    SourceResult::success(SourcePayload::Completion(ChatCompletion {
        provider: ChatProvider::OpenAi,
        model: "gpt-4o-mini".to_string(),
        text: "```json\n{\"executive_summary\": \"Payments leader.\", \"strengths\": [\"developer love\"]}\n```"
            .to_string(),
        usage: Some(TokenUsage {
            prompt_tokens: 1000,
            completion_tokens: 500,
            total_tokens: 1500,
        }),
        estimated_cost_usd: Some(Decimal::new(45, 5)),
    }))
}

fn query(s: &str) -> Query {
    Query::parse(s).expect("valid query")
}

#[tokio::test]
async fn full_success_produces_complete_report() {
    let enricher = Enricher::new(
        Canned::new(SourceKind::Brand, stripe_brand()),
        Canned::new(SourceKind::Web, stripe_page()),
        Canned::new(SourceKind::Analysis, json_completion()),
        PromptStyle::Structured,
    );

    let report = enricher.enrich(&query("stripe.com")).await;

    assert!(!report.is_failed());
    assert_eq!(report.brand().map(|b| b.name.as_str()), Some("Stripe"));
    assert!(report.web().is_some());
    let analysis = report.analysis().expect("analysis present");
    let AnalysisBody::Structured(body) = &analysis.body else {
        panic!("expected structured body, got {:?}", analysis.body);
    };
    assert_eq!(body.executive_summary.as_deref(), Some("Payments leader."));
    assert_eq!(body.strengths, vec!["developer love".to_string()]);
    assert_eq!(report.sources_used(), 3);
    assert_eq!(report.estimated_cost_usd(), Some(Decimal::new(45, 5)));
}

#[tokio::test]
async fn every_source_is_called_exactly_once() {
    let brand = Arc::new(Canned::new(SourceKind::Brand, stripe_brand()));
    let web = Arc::new(Canned::new(SourceKind::Web, stripe_page()));
    let analysis = Arc::new(Canned::new(SourceKind::Analysis, json_completion()));
    let enricher = Enricher::new(
        SharedSource(brand.clone()),
        SharedSource(web.clone()),
        SharedSource(analysis.clone()),
        PromptStyle::Report,
    );

    let _report = enricher.enrich(&query("stripe.com")).await;

    assert_eq!(brand.calls(), 1);
    assert_eq!(web.calls(), 1);
    assert_eq!(analysis.calls(), 1);
    assert_eq!(brand.last_input(), "stripe.com");
    assert_eq!(web.last_input(), "stripe.com");
}

#[tokio::test]
async fn prompt_carries_upstream_data() {
    let analysis = Arc::new(Canned::new(SourceKind::Analysis, json_completion()));
    let enricher = Enricher::new(
        Canned::new(SourceKind::Brand, stripe_brand()),
        Canned::new(SourceKind::Web, stripe_page()),
        SharedSource(analysis.clone()),
        PromptStyle::Report,
    );

    let _report = enricher.enrich(&query("stripe.com")).await;

    assert_eq!(analysis.calls(), 1);
    let prompt = analysis.last_input();
    assert!(prompt.starts_with("Company: Stripe\n"));
    assert!(prompt.contains("Industry: Fintech"));
    assert!(prompt.contains("Millions of companies use Stripe"));
}

#[tokio::test]
async fn brand_forbidden_degrades_and_pipeline_continues() {
    let degraded_brand = SourceResult::degraded(
        SourcePayload::Brand(BrandProfile::placeholder("stripe.com", Some("stripe.com"))),
        "brand lookup returned HTTP 403",
    );
    let enricher = Enricher::new(
        Canned::new(SourceKind::Brand, degraded_brand),
        Canned::new(SourceKind::Web, stripe_page()),
        Canned::new(SourceKind::Analysis, json_completion()),
        PromptStyle::Report,
    );

    let report = enricher.enrich(&query("stripe.com")).await;

    assert!(!report.is_failed());
    assert_eq!(report.brand().map(|b| b.name.as_str()), Some("stripe.com"));
    assert!(matches!(
        report.source_state(SourceKind::Brand),
        Some(SourceState::Degraded { .. })
    ));
    assert!(report.analysis().is_some());
}

#[tokio::test]
async fn web_failure_is_recorded_but_not_fatal() {
    let web_failure = SourceResult::failure(
        SourceKind::Web,
        SourceFailure::status(404, "https://stripe.com/ returned HTTP 404"),
    );
    let enricher = Enricher::new(
        Canned::new(SourceKind::Brand, stripe_brand()),
        Canned::new(SourceKind::Web, web_failure),
        Canned::new(SourceKind::Analysis, json_completion()),
        PromptStyle::Report,
    );

    let report = enricher.enrich(&query("stripe.com")).await;

    assert!(!report.is_failed());
    assert!(report.web().is_none());
    assert!(matches!(
        report.source_state(SourceKind::Web),
        Some(SourceState::Failed { .. })
    ));
    assert_eq!(report.sources_used(), 2);
}

#[tokio::test]
async fn required_web_failure_fails_report_before_analysis() {
    let web_failure = SourceResult::failure(
        SourceKind::Web,
        SourceFailure::status(404, "https://stripe.com/ returned HTTP 404"),
    );
    let analysis = Arc::new(Canned::new(SourceKind::Analysis, json_completion()));
    let enricher = Enricher::new(
        Canned::new(SourceKind::Brand, stripe_brand()),
        Canned::new(SourceKind::Web, web_failure),
        SharedSource(analysis.clone()),
        PromptStyle::Report,
    )
    .with_policies(PolicyTable::default().with(SourceKind::Web, SourcePolicy::Required));

    let report = enricher.enrich(&query("stripe.com")).await;

    assert!(report.is_failed());
    assert!(report.analysis().is_none());
    let failure = report.failure().expect("stage failure");
    assert_eq!(failure.stage, SourceKind::Web);
    assert_eq!(failure.failure.kind, FailureKind::Status);
    assert_eq!(failure.failure.status, Some(404));
    assert_eq!(analysis.calls(), 0, "no completion after a required failure");
    assert!(report.source_state(SourceKind::Analysis).is_none());
}

#[tokio::test]
async fn required_brand_degraded_is_not_a_failure() {
    let degraded_brand = SourceResult::degraded(
        SourcePayload::Brand(BrandProfile::placeholder("Open AI Inc", None)),
        "brand lookup returned HTTP 403",
    );
    let enricher = Enricher::new(
        Canned::new(SourceKind::Brand, degraded_brand),
        Canned::new(SourceKind::Web, stripe_page()),
        Canned::new(SourceKind::Analysis, json_completion()),
        PromptStyle::Report,
    )
    .with_policies(PolicyTable::default().with(SourceKind::Brand, SourcePolicy::Required));

    let report = enricher.enrich(&query("Open AI Inc")).await;

    assert!(!report.is_failed());
    assert_eq!(report.brand().map(|b| b.name.as_str()), Some("Open AI Inc"));
}

#[tokio::test]
async fn ai_timeout_fails_report_without_analysis() {
    let timeout = SourceResult::failure(
        SourceKind::Analysis,
        SourceFailure::transport("request timed out: operation timed out"),
    );
    let enricher = Enricher::new(
        Canned::new(SourceKind::Brand, stripe_brand()),
        Canned::new(SourceKind::Web, stripe_page()),
        Canned::new(SourceKind::Analysis, timeout),
        PromptStyle::Report,
    );

    let report = enricher.enrich(&query("stripe.com")).await;

    assert!(report.is_failed());
    assert!(report.analysis().is_none());
    let failure = report.failure().expect("stage failure");
    assert_eq!(failure.stage, SourceKind::Analysis);
    assert_eq!(failure.failure.kind, FailureKind::Transport);
    assert!(report.estimated_cost_usd().is_none());
}

#[tokio::test]
async fn markdown_completion_is_kept_verbatim() {
    let markdown = SourceResult::success(SourcePayload::Completion(ChatCompletion {
        provider: ChatProvider::OpenRouter,
        model: "openrouter/auto".to_string(),
        text: "## 🏢 Company Overview\n- Founded 2010".to_string(),
        usage: None,
        estimated_cost_usd: None,
    }));
    let enricher = Enricher::new(
        Canned::new(SourceKind::Brand, stripe_brand()),
        Canned::new(SourceKind::Web, stripe_page()),
        Canned::new(SourceKind::Analysis, markdown),
        PromptStyle::Report,
    );

    let report = enricher.enrich(&query("Stripe")).await;

    let analysis = report.analysis().expect("analysis present");
    assert_eq!(
        analysis.body,
        AnalysisBody::Markdown("## 🏢 Company Overview\n- Founded 2010".to_string())
    );
}

#[tokio::test]
async fn live_clients_against_mock_server() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/brand"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "Example Co",
            "industry": "Testing",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><title>Example</title><body>We test things.</body></html>"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "choices": [{ "message": { "role": "assistant", "content": "```json\n{\"risks\": [\"none\"]}\n```" } }],
            "usage": { "prompt_tokens": 1000, "completion_tokens": 500, "total_tokens": 1500 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = AppConfig {
        log_level: "debug".to_string(),
        user_agent: "iqfin-test/0.1".to_string(),
        ai_provider: ChatProvider::OpenAi,
        ai_api_key: "sk-test".to_string(),
        ai_model: "gpt-4o-mini".to_string(),
        ai_base_url: format!("{}/v1", server.uri()),
        ai_temperature: 0.7,
        ai_max_tokens: 3000,
        ai_timeout_secs: 5,
        prompt_style: PromptStyle::Structured,
        brand_api_url: format!("{}/brand", server.uri()),
        brand_api_key: "brand-test-key".to_string(),
        brand_timeout_secs: 5,
        web_timeout_secs: 5,
        web_excerpt_chars: 5000,
    };
    let enricher = LiveEnricher::from_config(&config).expect("enricher should build");

    let report = enricher.enrich(&query(&server.uri())).await;

    assert!(!report.is_failed(), "failure: {:?}", report.failure());
    assert_eq!(report.brand().map(|b| b.name.as_str()), Some("Example Co"));
    assert_eq!(report.web().and_then(|w| w.title.as_deref()), Some("Example"));
    let analysis = report.analysis().expect("analysis present");
    assert!(analysis.body.is_structured());
    assert_eq!(report.estimated_cost_usd(), Some(Decimal::new(45, 5)));
    assert_eq!(report.sources_used(), 3);
}
