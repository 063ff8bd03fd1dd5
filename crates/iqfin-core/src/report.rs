//! The merged output of one enrichment run.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::AiAnalysis;
use crate::profile::{BrandProfile, WebExcerpt};
use crate::query::Query;
use crate::source::{SourceFailure, SourceKind};

/// Terminal failure of a required stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFailure {
    pub stage: SourceKind,
    pub failure: SourceFailure,
}

impl std::fmt::Display for StageFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} stage failed ({})", self.stage, self.failure)
    }
}

/// Either the analysis the report exists for, or why it is missing.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    Analyzed(AiAnalysis),
    Failed(StageFailure),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SourceState {
    Ok,
    Degraded { note: String },
    Failed { failure: SourceFailure },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStatus {
    pub source: SourceKind,
    #[serde(flatten)]
    pub state: SourceState,
}

/// Enrichment result for one query. Immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    id: Uuid,
    query: Query,
    generated_at: DateTime<Utc>,
    brand: Option<BrandProfile>,
    web: Option<WebExcerpt>,
    outcome: ReportOutcome,
    sources: Vec<SourceStatus>,
}

/// Export document: `{query, timestamp, brand?, web?, analysis?, error?, cost?, sources}`.
#[derive(Debug, Serialize)]
pub struct ReportDocument<'a> {
    pub id: Uuid,
    pub query: &'a Query,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<&'a BrandProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web: Option<&'a WebExcerpt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<&'a AiAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a StageFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<Decimal>,
    pub sources: &'a [SourceStatus],
}

impl Report {
    #[must_use]
    pub fn new(
        query: Query,
        generated_at: DateTime<Utc>,
        brand: Option<BrandProfile>,
        web: Option<WebExcerpt>,
        outcome: ReportOutcome,
        sources: Vec<SourceStatus>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            query,
            generated_at,
            brand,
            web,
            outcome,
            sources,
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn query(&self) -> &Query {
        &self.query
    }

    #[must_use]
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    #[must_use]
    pub fn brand(&self) -> Option<&BrandProfile> {
        self.brand.as_ref()
    }

    #[must_use]
    pub fn web(&self) -> Option<&WebExcerpt> {
        self.web.as_ref()
    }

    #[must_use]
    pub fn outcome(&self) -> &ReportOutcome {
        &self.outcome
    }

    #[must_use]
    pub fn analysis(&self) -> Option<&AiAnalysis> {
        match &self.outcome {
            ReportOutcome::Analyzed(analysis) => Some(analysis),
            ReportOutcome::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn failure(&self) -> Option<&StageFailure> {
        match &self.outcome {
            ReportOutcome::Failed(failure) => Some(failure),
            ReportOutcome::Analyzed(_) => None,
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, ReportOutcome::Failed(_))
    }

    #[must_use]
    pub fn sources(&self) -> &[SourceStatus] {
        &self.sources
    }

    #[must_use]
    pub fn source_state(&self, source: SourceKind) -> Option<&SourceState> {
        self.sources
            .iter()
            .find(|s| s.source == source)
            .map(|s| &s.state)
    }

    /// Number of sources that contributed data (full or degraded).
    #[must_use]
    pub fn sources_used(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| !matches!(s.state, SourceState::Failed { .. }))
            .count()
    }

    /// Total estimated spend for the run, when any source reported one.
    #[must_use]
    pub fn estimated_cost_usd(&self) -> Option<Decimal> {
        self.analysis().and_then(|a| a.estimated_cost_usd)
    }

    #[must_use]
    pub fn to_document(&self) -> ReportDocument<'_> {
        ReportDocument {
            id: self.id,
            query: &self.query,
            timestamp: self.generated_at,
            brand: self.brand.as_ref(),
            web: self.web.as_ref(),
            analysis: self.analysis(),
            error: self.failure(),
            cost: self.estimated_cost_usd(),
            sources: &self.sources,
        }
    }

    /// Serialize the export document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_document())
    }
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
