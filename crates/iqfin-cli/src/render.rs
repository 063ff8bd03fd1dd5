//! Markdown presentation of a finished report.

use iqfin_core::{
    AnalysisBody, BrandProfile, Report, SourceState, StructuredAnalysis, WebExcerpt,
};
use serde_json::Value;

/// Characters of website text shown in the summary section.
const WEB_SUMMARY_CHARS: usize = 500;

/// Render `report` as a markdown document.
///
/// Failed reports render only their header and the failure line; callers
/// that must not show partial output check [`Report::failure`] first.
#[must_use]
pub(crate) fn render_markdown(report: &Report) -> String {
    let mut lines: Vec<String> = Vec::new();

    let company = report
        .brand()
        .map_or(report.query().as_str(), |b| b.name.as_str());
    lines.push(format!("# {company}"));
    if let Some(subtitle) = subtitle(report.brand()) {
        lines.push(String::new());
        lines.push(subtitle);
    }
    lines.push(String::new());
    lines.push(metrics_line(report));

    for status in report.sources() {
        match &status.state {
            SourceState::Ok => {}
            SourceState::Degraded { note } => {
                lines.push(String::new());
                lines.push(format!("> {} degraded: {note}", status.source));
            }
            SourceState::Failed { failure } => {
                lines.push(String::new());
                lines.push(format!("> {} unavailable: {failure}", status.source));
            }
        }
    }

    if let Some(failure) = report.failure() {
        lines.push(String::new());
        lines.push(format!("**Error**: {failure}"));
        return finish(lines);
    }

    if let Some(brand) = report.brand() {
        push_brand(&mut lines, brand);
    }
    if let Some(web) = report.web() {
        push_web(&mut lines, web);
    }

    if let Some(analysis) = report.analysis() {
        lines.push(String::new());
        lines.push("---".to_string());
        match &analysis.body {
            AnalysisBody::Structured(body) => push_structured(&mut lines, body),
            AnalysisBody::Markdown(text) => {
                lines.push(String::new());
                lines.push(text.trim_end().to_string());
            }
        }
    }

    finish(lines)
}

fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn subtitle(brand: Option<&BrandProfile>) -> Option<String> {
    let brand = brand?;
    let parts: Vec<&str> = [brand.industry.as_deref(), brand.domain.as_deref()]
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .collect();
    (!parts.is_empty()).then(|| format!("*{}*", parts.join(" · ")))
}

fn metrics_line(report: &Report) -> String {
    let generated = report.generated_at().format("%b %d");
    let total = report.sources().len();
    let used = report.sources_used();
    let tokens = report
        .analysis()
        .and_then(|a| a.usage)
        .map_or_else(|| "n/a".to_string(), |u| u.total_tokens.to_string());
    let cost = report
        .estimated_cost_usd()
        .map_or_else(|| "n/a".to_string(), |c| format!("${c}"));
    format!(
        "**Generated**: {generated} · **Sources**: {used}/{total} · **Tokens**: {tokens} · **Est. cost**: {cost}"
    )
}

fn push_brand(lines: &mut Vec<String>, brand: &BrandProfile) {
    if brand.logo_url.is_none() && brand.colors.is_empty() && brand.description.is_none() {
        return;
    }
    lines.push(String::new());
    lines.push("## Brand".to_string());
    lines.push(String::new());
    if let Some(description) = &brand.description {
        lines.push(description.clone());
        lines.push(String::new());
    }
    if let Some(logo) = &brand.logo_url {
        lines.push(format!("- **Logo**: {logo}"));
    }
    if !brand.colors.is_empty() {
        let swatches: Vec<String> = brand.colors.iter().map(|c| format!("`{c}`")).collect();
        lines.push(format!("- **Palette**: {}", swatches.join(" ")));
    }
}

fn push_web(lines: &mut Vec<String>, web: &WebExcerpt) {
    lines.push(String::new());
    lines.push("## Website".to_string());
    lines.push(String::new());
    match &web.title {
        Some(title) => lines.push(format!("**{title}** ({})", web.url)),
        None => lines.push(web.url.clone()),
    }
    let mut chars = web.text.chars();
    let summary: String = chars.by_ref().take(WEB_SUMMARY_CHARS).collect();
    if !summary.is_empty() {
        lines.push(String::new());
        let ellipsis = if chars.next().is_some() || web.truncated {
            "…"
        } else {
            ""
        };
        lines.push(format!("> {summary}{ellipsis}"));
    }
}

fn push_structured(lines: &mut Vec<String>, body: &StructuredAnalysis) {
    push_text_section(lines, "Executive Summary", body.executive_summary.as_deref());
    push_list_section(lines, "Strengths", &body.strengths);
    push_list_section(lines, "Risks", &body.risks);
    push_text_section(lines, "Market Position", body.market_position.as_deref());
    push_text_section(lines, "Growth Potential", body.growth_potential.as_deref());

    for (key, value) in &body.sections {
        let heading = title_case(key);
        match value {
            Value::Array(items) => {
                let items: Vec<String> = items.iter().map(value_text).collect();
                push_list_section(lines, &heading, &items);
            }
            Value::Null => {}
            other => push_text_section(lines, &heading, Some(&value_text(other))),
        }
    }
}

fn push_text_section(lines: &mut Vec<String>, heading: &str, text: Option<&str>) {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return;
    };
    lines.push(String::new());
    lines.push(format!("## {heading}"));
    lines.push(String::new());
    lines.push(text.to_string());
}

fn push_list_section(lines: &mut Vec<String>, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(format!("## {heading}"));
    lines.push(String::new());
    lines.extend(items.iter().map(|item| format!("- {item}")));
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `"sales_intelligence"` → `"Sales Intelligence"`.
fn title_case(key: &str) -> String {
    key.split(['_', '-', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
