use iqfin_sources::SourceError;
use thiserror::Error;

/// Errors raised while wiring an [`crate::Enricher`] from configuration.
///
/// Enrichment itself never returns `Err`; source problems end up in the report.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("failed to build {client} client: {source}")]
    Client {
        client: &'static str,
        #[source]
        source: SourceError,
    },
}
