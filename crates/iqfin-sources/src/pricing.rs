//! Per-model token rates used to estimate the cost of a completion.
//!
//! Rates are USD per million tokens. Lookup ignores any provider prefix
//! (`openai/gpt-4o-mini` and `gpt-4o-mini` price the same) and matches dated
//! snapshots by prefix (`gpt-4o-mini-2024-07-18`). Routers such as
//! `openrouter/auto` have no fixed rate; the served model reported in the
//! response is priced instead when available.

use iqfin_core::TokenUsage;
use rust_decimal::Decimal;

/// USD per million tokens for one model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelRate {
    pub input_per_million: Decimal,
    pub output_per_million: Decimal,
}

/// `(model prefix, input, output)` in thousandths of a dollar per million tokens.
///
/// More specific prefixes must precede shorter ones sharing their stem.
const RATES: &[(&str, i64, i64)] = &[
    ("gpt-4o-mini", 150, 600),
    ("gpt-4o", 2_500, 10_000),
    ("gpt-4.1-nano", 100, 400),
    ("gpt-4.1-mini", 400, 1_600),
    ("gpt-4.1", 2_000, 8_000),
    ("gpt-3.5-turbo", 500, 1_500),
    ("claude-3.5-sonnet", 3_000, 15_000),
    ("claude-3-5-sonnet", 3_000, 15_000),
    ("claude-3-haiku", 250, 1_250),
    ("claude-3.5-haiku", 800, 4_000),
    ("claude-3-5-haiku", 800, 4_000),
];

/// Rate for `model`, or `None` when the model is not in the table.
#[must_use]
pub fn rate_for(model: &str) -> Option<ModelRate> {
    let name = model
        .rsplit('/')
        .next()
        .unwrap_or(model)
        .trim()
        .to_ascii_lowercase();

    RATES
        .iter()
        .find(|(prefix, _, _)| name.starts_with(prefix))
        .map(|&(_, input, output)| ModelRate {
            input_per_million: Decimal::new(input, 3),
            output_per_million: Decimal::new(output, 3),
        })
}

/// Estimated USD cost of `usage` on `model`.
///
/// Returns `None` for unpriced models.
#[must_use]
pub fn estimate_cost(model: &str, usage: &TokenUsage) -> Option<Decimal> {
    let rate = rate_for(model)?;
    let million = Decimal::from(1_000_000u32);
    let input = Decimal::from(usage.prompt_tokens) * rate.input_per_million;
    let output = Decimal::from(usage.completion_tokens) * rate.output_per_million;
    Some(((input + output) / million).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(prompt: u32, completion: u32) -> TokenUsage {
        TokenUsage {
            prompt_tokens: prompt,
            completion_tokens: completion,
            total_tokens: prompt + completion,
        }
    }

    #[test]
    fn gpt_4o_mini_cost() {
        let cost = estimate_cost("gpt-4o-mini", &usage(1_000, 500)).unwrap();
        assert_eq!(cost, Decimal::new(45, 5));
    }

    #[test]
    fn provider_prefix_and_date_suffix_are_ignored() {
        let plain = rate_for("gpt-4o-mini").unwrap();
        assert_eq!(rate_for("openai/gpt-4o-mini"), Some(plain));
        assert_eq!(rate_for("gpt-4o-mini-2024-07-18"), Some(plain));
    }

    #[test]
    fn mini_is_not_priced_as_full_model() {
        let mini = rate_for("gpt-4o-mini").unwrap();
        let full = rate_for("gpt-4o").unwrap();
        assert!(mini.input_per_million < full.input_per_million);
    }

    #[test]
    fn router_model_has_no_rate() {
        assert!(rate_for("openrouter/auto").is_none());
        assert!(estimate_cost("openrouter/auto", &usage(10, 10)).is_none());
    }

    #[test]
    fn zero_usage_costs_nothing() {
        let cost = estimate_cost("anthropic/claude-3.5-sonnet", &usage(0, 0)).unwrap();
        assert!(cost.is_zero());
    }
}
