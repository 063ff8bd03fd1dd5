use std::env::VarError;
use std::fmt::Display;
use std::str::FromStr;

use crate::app_config::{AppConfig, ChatProvider, PromptStyle};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Credentials are checked here so a missing key stops the process at
/// startup instead of surfacing as a failed request later.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        non_blank(&lookup, var).ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        non_blank(&lookup, var).unwrap_or_else(|| default.to_string())
    };

    let ai_provider: ChatProvider = parse_or_default(&lookup, "IQFIN_AI_PROVIDER", "openrouter")?;
    let ai_api_key = require(ai_provider.api_key_var())?;
    let ai_model = or_default("IQFIN_AI_MODEL", ai_provider.default_model());
    let ai_base_url = or_default("IQFIN_AI_BASE_URL", ai_provider.default_base_url());
    let ai_temperature: f32 = parse_or_default(&lookup, "IQFIN_AI_TEMPERATURE", "0.7")?;
    if !(0.0..=2.0).contains(&ai_temperature) {
        return Err(ConfigError::InvalidEnvVar {
            var: "IQFIN_AI_TEMPERATURE".to_string(),
            reason: format!("{ai_temperature} is outside 0.0..=2.0"),
        });
    }
    let ai_max_tokens: u32 = parse_or_default(&lookup, "IQFIN_AI_MAX_TOKENS", "3000")?;
    let ai_timeout_secs: u64 = parse_or_default(&lookup, "IQFIN_AI_TIMEOUT_SECS", "30")?;
    let prompt_style: PromptStyle = parse_or_default(&lookup, "IQFIN_PROMPT_STYLE", "report")?;

    let brand_api_url = require("BRAND_API_URL")?;
    let brand_api_key = require("BRAND_API_KEY")?;
    let brand_timeout_secs: u64 = parse_or_default(&lookup, "IQFIN_BRAND_TIMEOUT_SECS", "15")?;

    let web_timeout_secs: u64 = parse_or_default(&lookup, "IQFIN_WEB_TIMEOUT_SECS", "30")?;
    let web_excerpt_chars: usize = parse_or_default(&lookup, "IQFIN_WEB_EXCERPT_CHARS", "5000")?;
    if web_excerpt_chars == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "IQFIN_WEB_EXCERPT_CHARS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let log_level = or_default("IQFIN_LOG_LEVEL", "info");
    let user_agent = or_default("IQFIN_USER_AGENT", "iqfin/0.1 (company-intelligence)");

    Ok(AppConfig {
        log_level,
        user_agent,
        ai_provider,
        ai_api_key,
        ai_model,
        ai_base_url,
        ai_temperature,
        ai_max_tokens,
        ai_timeout_secs,
        prompt_style,
        brand_api_url,
        brand_api_key,
        brand_timeout_secs,
        web_timeout_secs,
        web_excerpt_chars,
    })
}

/// The value of `var`, or `None` when it is unset or blank.
fn non_blank<F>(lookup: &F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    lookup(var).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or_default<T, F>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Result<String, VarError>,
{
    let raw = non_blank(lookup, var).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
