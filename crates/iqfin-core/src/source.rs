//! Tagged outcomes of individual source calls.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::ChatCompletion;
use crate::profile::{BrandProfile, WebExcerpt};

/// The external data providers the pipeline draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Brand,
    Web,
    Analysis,
}

impl SourceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Brand => "brand",
            SourceKind::Web => "web",
            SourceKind::Analysis => "analysis",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a failed source call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Connection, TLS, or timeout failure.
    Transport,
    /// Credentials rejected or quota exhausted.
    Auth,
    /// Any other non-2xx HTTP status.
    Status,
    /// Body missing, not JSON where JSON was required, or missing fields.
    MalformedResponse,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Transport => write!(f, "transport error"),
            FailureKind::Auth => write!(f, "auth error"),
            FailureKind::Status => write!(f, "unexpected status"),
            FailureKind::MalformedResponse => write!(f, "malformed response"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct SourceFailure {
    pub kind: FailureKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
}

impl SourceFailure {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Transport,
            status: None,
            message: message.into(),
        }
    }

    pub fn auth(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Auth,
            status,
            message: message.into(),
        }
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Status,
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::MalformedResponse,
            status: None,
            message: message.into(),
        }
    }

    /// Classify a non-2xx HTTP status: credential and quota statuses become
    /// [`FailureKind::Auth`], everything else [`FailureKind::Status`].
    pub fn from_http_status(status: u16, message: impl Into<String>) -> Self {
        if matches!(status, 401 | 402 | 403 | 429) {
            Self::auth(Some(status), message)
        } else {
            Self::status(status, message)
        }
    }
}

/// Provider-specific data carried by a successful source call.
#[derive(Debug, Clone, PartialEq)]
pub enum SourcePayload {
    Brand(BrandProfile),
    Web(WebExcerpt),
    Completion(ChatCompletion),
}

impl SourcePayload {
    #[must_use]
    pub fn source(&self) -> SourceKind {
        match self {
            SourcePayload::Brand(_) => SourceKind::Brand,
            SourcePayload::Web(_) => SourceKind::Web,
            SourcePayload::Completion(_) => SourceKind::Analysis,
        }
    }
}

/// Outcome of one external call. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceResult {
    Success {
        source: SourceKind,
        payload: SourcePayload,
        /// Set when a best-effort source fell back to placeholder data.
        degraded: Option<String>,
    },
    Failure {
        source: SourceKind,
        failure: SourceFailure,
    },
}

impl SourceResult {
    #[must_use]
    pub fn success(payload: SourcePayload) -> Self {
        SourceResult::Success {
            source: payload.source(),
            payload,
            degraded: None,
        }
    }

    pub fn degraded(payload: SourcePayload, note: impl Into<String>) -> Self {
        SourceResult::Success {
            source: payload.source(),
            payload,
            degraded: Some(note.into()),
        }
    }

    #[must_use]
    pub fn failure(source: SourceKind, failure: SourceFailure) -> Self {
        SourceResult::Failure { source, failure }
    }

    #[must_use]
    pub fn source(&self) -> SourceKind {
        match self {
            SourceResult::Success { source, .. } | SourceResult::Failure { source, .. } => *source,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, SourceResult::Success { .. })
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, SourceResult::Success { degraded: Some(_), .. })
    }

    #[must_use]
    pub fn payload(&self) -> Option<&SourcePayload> {
        match self {
            SourceResult::Success { payload, .. } => Some(payload),
            SourceResult::Failure { .. } => None,
        }
    }

    #[must_use]
    pub fn failure_reason(&self) -> Option<&SourceFailure> {
        match self {
            SourceResult::Failure { failure, .. } => Some(failure),
            SourceResult::Success { .. } => None,
        }
    }
}
