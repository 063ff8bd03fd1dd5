//! Enrichment orchestration for IQFIN.
//!
//! Gathers brand metadata and website text in parallel, renders an analysis
//! prompt from whatever arrived, asks one chat provider for the analysis, and
//! merges everything into a [`iqfin_core::Report`]. By default brand and web
//! sources are best-effort and the analysis is required; see [`PolicyTable`].

pub mod error;
pub mod pipeline;
pub mod policy;
pub mod prompt;

pub use error::EnrichError;
pub use pipeline::{Enricher, LiveEnricher};
pub use policy::{policy_for, PolicyTable, SourcePolicy};
pub use prompt::{build_prompt, system_prompt, MAX_PROMPT_CHARS};
