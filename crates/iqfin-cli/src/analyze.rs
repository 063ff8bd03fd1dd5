//! `analyze` command handler.

use std::path::Path;

use anyhow::Context;
use iqfin_core::{AppConfig, Query};
use iqfin_enrich::LiveEnricher;

use crate::render::render_markdown;

/// Run one enrichment and print the result.
///
/// Markdown goes to stdout unless `json` is set, in which case the export
/// document is printed instead. With `output`, the export document is also
/// written to that path, including when the analysis failed.
///
/// # Errors
///
/// Returns an error if the clients cannot be built, the export cannot be
/// written, or the analysis stage failed. A failed analysis never prints a
/// partial report.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    query: &Query,
    json: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let enricher = LiveEnricher::from_config(config)?;
    let report = enricher.enrich(query).await;

    if let Some(path) = output {
        let document = report.to_json_pretty()?;
        std::fs::write(path, document)
            .with_context(|| format!("failed to write export to {}", path.display()))?;
        tracing::info!(report_id = %report.id(), path = %path.display(), "export written");
    }

    if let Some(failure) = report.failure() {
        anyhow::bail!("{failure}");
    }

    if json {
        println!("{}", report.to_json_pretty()?);
    } else {
        print!("{}", render_markdown(&report));
    }
    Ok(())
}
