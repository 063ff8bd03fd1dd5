use chrono::{TimeZone, Utc};
use iqfin_core::{
    AiAnalysis, ChatProvider, FailureKind, Query, ReportOutcome, SourceFailure, SourceKind,
    SourceStatus, StageFailure, TokenUsage,
};
use rust_decimal::Decimal;
use serde_json::json;

use super::*;

fn stripe_brand() -> BrandProfile {
    BrandProfile {
        name: "Stripe".to_string(),
        domain: Some("stripe.com".to_string()),
        industry: Some("Fintech".to_string()),
        description: None,
        logo_url: Some("https://cdn.example.com/stripe.svg".to_string()),
        colors: vec!["#635BFF".to_string(), "#0A2540".to_string()],
    }
}

fn ok(source: SourceKind) -> SourceStatus {
    SourceStatus {
        source,
        state: SourceState::Ok,
    }
}

fn report_with(body: AnalysisBody, sources: Vec<SourceStatus>) -> Report {
    let analysis = AiAnalysis {
        provider: ChatProvider::OpenAi,
        model: "gpt-4o-mini".to_string(),
        body,
        usage: Some(TokenUsage {
            prompt_tokens: 1000,
            completion_tokens: 500,
            total_tokens: 1500,
        }),
        estimated_cost_usd: Some(Decimal::new(45, 5)),
    };
    Report::new(
        Query::parse("stripe.com").expect("valid query"),
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap(),
        Some(stripe_brand()),
        None,
        ReportOutcome::Analyzed(analysis),
        sources,
    )
}

#[test]
fn header_and_metrics_line() {
    let report = report_with(
        AnalysisBody::Markdown("## 🏢 Company Overview\n- Payments".to_string()),
        vec![ok(SourceKind::Brand), ok(SourceKind::Web), ok(SourceKind::Analysis)],
    );
    let md = render_markdown(&report);

    assert!(md.starts_with("# Stripe\n\n*Fintech · stripe.com*\n"));
    assert!(md.contains(
        "**Generated**: Mar 14 · **Sources**: 3/3 · **Tokens**: 1500 · **Est. cost**: $0.00045"
    ));
    assert!(md.contains("- **Palette**: `#635BFF` `#0A2540`"));
    assert!(md.ends_with("## 🏢 Company Overview\n- Payments\n"));
}

#[test]
fn structured_body_renders_sections_in_order() {
    let mut body = StructuredAnalysis {
        executive_summary: Some("Payments leader.".to_string()),
        strengths: vec!["Developer love".to_string()],
        risks: vec!["Competition".to_string()],
        market_position: None,
        growth_potential: Some("High".to_string()),
        ..StructuredAnalysis::default()
    };
    body.sections
        .insert("sales_intelligence".to_string(), json!(["Self-serve", "Enterprise"]));

    let report = report_with(AnalysisBody::Structured(body), vec![ok(SourceKind::Analysis)]);
    let md = render_markdown(&report);

    let summary = md.find("## Executive Summary").expect("summary heading");
    let strengths = md.find("## Strengths\n\n- Developer love").expect("strengths");
    let growth = md.find("## Growth Potential\n\nHigh").expect("growth");
    let sales = md
        .find("## Sales Intelligence\n\n- Self-serve\n- Enterprise")
        .expect("extra section");
    assert!(summary < strengths && strengths < growth && growth < sales);
    assert!(!md.contains("## Market Position"));
}

#[test]
fn degraded_source_is_noted() {
    let sources = vec![
        SourceStatus {
            source: SourceKind::Brand,
            state: SourceState::Degraded {
                note: "brand lookup returned HTTP 403".to_string(),
            },
        },
        ok(SourceKind::Analysis),
    ];
    let md = render_markdown(&report_with(AnalysisBody::Markdown("x".to_string()), sources));
    assert!(md.contains("> brand degraded: brand lookup returned HTTP 403"));
}

#[test]
fn failed_report_renders_only_the_error() {
    let failure = StageFailure {
        stage: SourceKind::Analysis,
        failure: SourceFailure::transport("operation timed out"),
    };
    let report = Report::new(
        Query::parse("stripe.com").expect("valid query"),
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap(),
        None,
        None,
        ReportOutcome::Failed(failure.clone()),
        vec![SourceStatus {
            source: SourceKind::Analysis,
            state: SourceState::Failed {
                failure: failure.failure.clone(),
            },
        }],
    );
    assert_eq!(failure.failure.kind, FailureKind::Transport);

    let md = render_markdown(&report);
    assert!(md.starts_with("# stripe.com\n"));
    assert!(md.contains("**Tokens**: n/a · **Est. cost**: n/a"));
    assert!(md.contains("**Error**: analysis stage failed (transport error: operation timed out)"));
    assert!(!md.contains("---"));
}

#[test]
fn title_case_splits_separators() {
    assert_eq!(title_case("sales_intelligence"), "Sales Intelligence");
    assert_eq!(title_case("contact-strategy"), "Contact Strategy");
    assert_eq!(title_case("icp"), "Icp");
}
