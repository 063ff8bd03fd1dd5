//! Shared domain types and configuration for the IQFIN enrichment pipeline.

pub mod analysis;
pub mod app_config;
pub mod config;
pub mod profile;
pub mod query;
pub mod report;
pub mod source;

use thiserror::Error;

pub use analysis::{AiAnalysis, AnalysisBody, ChatCompletion, StructuredAnalysis, TokenUsage};
pub use app_config::{AppConfig, ChatProvider, PromptStyle};
pub use config::{load_app_config, load_app_config_from_env};
pub use profile::{BrandProfile, WebExcerpt};
pub use query::{Query, QueryError};
pub use report::{Report, ReportOutcome, SourceState, SourceStatus, StageFailure};
pub use source::{FailureKind, SourceFailure, SourceKind, SourcePayload, SourceResult};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
