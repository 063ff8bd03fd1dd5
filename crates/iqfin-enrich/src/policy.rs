//! Failure tolerance per source.

use iqfin_core::SourceKind;

/// How the orchestrator treats a source that did not fully succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePolicy {
    /// Failures and degraded results are recorded; the run continues.
    BestEffort,
    /// A failure ends the run with a stage failure and no analysis.
    Required,
}

impl SourcePolicy {
    #[must_use]
    pub fn is_required(self) -> bool {
        matches!(self, SourcePolicy::Required)
    }
}

/// Default policy of each source.
#[must_use]
pub const fn policy_for(kind: SourceKind) -> SourcePolicy {
    match kind {
        SourceKind::Brand | SourceKind::Web => SourcePolicy::BestEffort,
        SourceKind::Analysis => SourcePolicy::Required,
    }
}

/// The policy table the orchestrator consults for every source.
///
/// Starts from [`policy_for`]; individual entries can be overridden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyTable {
    brand: SourcePolicy,
    web: SourcePolicy,
    analysis: SourcePolicy,
}

impl PolicyTable {
    #[must_use]
    pub const fn get(&self, kind: SourceKind) -> SourcePolicy {
        match kind {
            SourceKind::Brand => self.brand,
            SourceKind::Web => self.web,
            SourceKind::Analysis => self.analysis,
        }
    }

    /// Returns the table with `kind` set to `policy`.
    #[must_use]
    pub const fn with(mut self, kind: SourceKind, policy: SourcePolicy) -> Self {
        match kind {
            SourceKind::Brand => self.brand = policy,
            SourceKind::Web => self.web = policy,
            SourceKind::Analysis => self.analysis = policy,
        }
        self
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self {
            brand: policy_for(SourceKind::Brand),
            web: policy_for(SourceKind::Web),
            analysis: policy_for(SourceKind::Analysis),
        }
    }
}
