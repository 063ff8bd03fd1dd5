//! Source clients for the enrichment pipeline.
//!
//! Each client wraps exactly one outbound HTTP call (brand lookup, website
//! fetch, chat completion) and hands the raw response to [`normalize`], which
//! turns it into a [`iqfin_core::SourceResult`]. Clients never retry and never
//! return `Err` from a fetch: transport problems become typed failures.

pub mod brand;
pub mod chat;
pub mod domain;
pub mod error;
pub mod normalize;
pub mod pricing;
pub mod source;
pub mod web;

mod html;

pub use brand::BrandClient;
pub use chat::{ChatClient, ChatClientConfig};
pub use domain::{bare_domain, normalize_url};
pub use error::SourceError;
pub use normalize::{interpret_analysis, normalize, ProviderKind, RawResponse};
pub use pricing::{estimate_cost, rate_for, ModelRate};
pub use source::Source;
pub use web::WebFetchClient;
