use std::future::Future;

use iqfin_core::{SourceKind, SourceResult};

/// One external data provider.
///
/// `fetch` performs exactly one outbound call and always resolves to a
/// [`SourceResult`]; failures are values, not `Err`.
pub trait Source: Send + Sync {
    fn kind(&self) -> SourceKind;

    fn fetch(&self, input: &str) -> impl Future<Output = SourceResult> + Send;
}
