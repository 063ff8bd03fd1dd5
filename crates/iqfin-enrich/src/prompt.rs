//! Analysis prompt rendering.
//!
//! Pure and deterministic: the same query and upstream data always render the
//! same prompt. Every upstream field is optional and missing ones render as
//! [`PLACEHOLDER`]. Spliced fields and the website excerpt are capped so the
//! prompt stays under [`MAX_PROMPT_CHARS`] for any input size.

use iqfin_core::{BrandProfile, PromptStyle, Query, WebExcerpt};

/// Longest website excerpt spliced into a prompt, in characters.
pub const MAX_EXCERPT_CHARS: usize = 2500;
/// Longest single-line field (query, name, industry, title), in characters.
pub const MAX_FIELD_CHARS: usize = 200;
/// Hard upper bound on a rendered prompt, in characters.
pub const MAX_PROMPT_CHARS: usize = 6000;
/// Rendered in place of any missing upstream field.
pub const PLACEHOLDER: &str = "to be determined";

const REPORT_SYSTEM_PROMPT: &str = "You are a B2B business intelligence analyst. \
     Provide concise, actionable insights in clear markdown format.";

const STRUCTURED_SYSTEM_PROMPT: &str = "You are a B2B business intelligence analyst. \
     Respond with a single valid JSON object and no other text.";

const REPORT_INSTRUCTIONS: &str = "\
Provide a comprehensive B2B business intelligence report in this EXACT format:

## 🏢 Company Overview
- Company name and legal structure
- Year founded and headquarters location
- Core products/services
- Target market and industry vertical
- Key executives and leadership

## 💼 Business Model
- Primary revenue streams
- Pricing model (SaaS, license, etc.)
- Estimated company size
- Funding status and investors

## 🎯 Target Customer Profile
- Ideal customer characteristics
- Buyer personas and decision-makers
- ICP description

## 📊 Market Position
- Main competitors
- Unique value proposition
- Market differentiators

## 🤝 Sales Intelligence
- Typical sales cycle length
- Primary sales channels
- Key partnerships

## 📞 Contact Strategy
- Best channels to reach decision-makers
- Recommended outreach approach
- Pain points to address

## 📰 Recent Developments
- Recent news and updates
- Growth trajectory

Format with clear headers, bullet points, and concise information.";

const STRUCTURED_INSTRUCTIONS: &str = "\
Analyze this company for a B2B sales team. Respond with only a JSON object \
using exactly these keys:
- \"executive_summary\": two or three sentences on what the company does and for whom
- \"strengths\": array of short strings
- \"risks\": array of short strings
- \"market_position\": one paragraph on competitors and differentiation
- \"growth_potential\": one paragraph on trajectory and opportunities

Use \"to be determined\" for anything you cannot support from the context or \
general knowledge.";

/// System role sent ahead of prompts rendered in `style`.
#[must_use]
pub fn system_prompt(style: PromptStyle) -> &'static str {
    match style {
        PromptStyle::Report => REPORT_SYSTEM_PROMPT,
        PromptStyle::Structured => STRUCTURED_SYSTEM_PROMPT,
    }
}

/// Render the user prompt for one analysis.
///
/// The company name prefers the brand profile's name over the raw query.
/// The domain comes from the brand profile, else from the query when the
/// query is itself a domain.
#[must_use]
pub fn build_prompt(
    style: PromptStyle,
    query: &Query,
    brand: Option<&BrandProfile>,
    web: Option<&WebExcerpt>,
) -> String {
    let company = brand.map_or(query.as_str(), |b| b.name.as_str());
    let domain = brand
        .and_then(|b| b.domain.as_deref())
        .or_else(|| query.is_domain_like().then_some(query.as_str()));
    let industry = brand.and_then(|b| b.industry.as_deref());
    let description = brand.and_then(|b| b.description.as_deref());
    let title = web.and_then(|w| w.title.as_deref());
    let excerpt = web
        .map(|w| w.text.trim())
        .filter(|t| !t.is_empty())
        .map(|t| cap(t, MAX_EXCERPT_CHARS));

    let instructions = match style {
        PromptStyle::Report => REPORT_INSTRUCTIONS,
        PromptStyle::Structured => STRUCTURED_INSTRUCTIONS,
    };
    let mut prompt = format!(
        "Company: {company}\n\
         Query: {query}\n\
         Domain: {domain}\n\
         Industry: {industry}\n\
         Brand description: {description}\n\
         Website title: {title}\n\
         \n\
         Website excerpt:\n\
         {excerpt}\n\
         \n\
         {instructions}",
        company = field(Some(company)),
        query = field(Some(query.as_str())),
        domain = field(domain),
        industry = field(industry),
        description = field(description),
        title = field(title),
        excerpt = excerpt.as_deref().unwrap_or(PLACEHOLDER),
    );

    if prompt.chars().count() > MAX_PROMPT_CHARS {
        prompt = cap(&prompt, MAX_PROMPT_CHARS);
    }
    prompt
}

/// One-line field: whitespace collapsed, capped, placeholder when absent.
fn field(value: Option<&str>) -> String {
    let collapsed = value
        .map(|v| v.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|v| !v.is_empty());
    match collapsed {
        Some(v) => cap(&v, MAX_FIELD_CHARS),
        None => PLACEHOLDER.to_string(),
    }
}

fn cap(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
#[path = "prompt_test.rs"]
mod tests;
