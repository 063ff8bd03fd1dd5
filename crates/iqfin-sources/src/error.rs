use iqfin_core::SourceFailure;
use thiserror::Error;

/// Errors raised while constructing a source client.
///
/// Fetches themselves never fail with this type; they report
/// [`SourceFailure`] inside a `SourceResult`.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid endpoint \"{endpoint}\": {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

/// Classify a `reqwest` send/read error as a transport failure.
pub(crate) fn transport_failure(err: &reqwest::Error) -> SourceFailure {
    if err.is_timeout() {
        SourceFailure::transport(format!("request timed out: {err}"))
    } else if err.is_connect() {
        SourceFailure::transport(format!("connection failed: {err}"))
    } else {
        SourceFailure::transport(err.to_string())
    }
}
