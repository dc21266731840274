//! Install outcomes as reported to the host.

use nupack_core::PackageIdentity;
use nupack_install::{InstallState, PackageOutcome};

/// What happened to one identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// Downloaded and extracted in this run.
    Installed,
    /// A completed install was already present.
    AlreadyInstalled,
    /// This identity could not be installed.
    Failed,
}

/// Per-package result of an install operation.
#[derive(Debug)]
pub struct InstallOutcome {
    /// The package this outcome describes.
    pub identity: PackageIdentity,
    /// What happened.
    pub kind: OutcomeKind,
    /// Source name the artifact came from.
    pub source: String,
    /// Package description.
    pub description: Option<String>,
    /// Whether this is the package the caller asked for, as opposed to
    /// a dependency pulled in alongside it.
    pub requested: bool,
    /// Failure detail for [`OutcomeKind::Failed`].
    pub error: Option<String>,
}

/// The full result of one install operation.
#[derive(Debug)]
pub struct InstallReport {
    /// Per-package outcomes, requested package first.
    pub outcomes: Vec<InstallOutcome>,
}

impl InstallReport {
    pub(crate) fn from_batch(
        outcomes: Vec<PackageOutcome>,
        root: &PackageIdentity,
    ) -> Self {
        let mut outcomes: Vec<InstallOutcome> = outcomes
            .into_iter()
            .map(|outcome| {
                let requested = &outcome.identity == root;
                let (kind, error) = match outcome.state {
                    InstallState::Installed(_) => (OutcomeKind::Installed, None),
                    InstallState::AlreadyInstalled => (OutcomeKind::AlreadyInstalled, None),
                    InstallState::Failed(err) => (OutcomeKind::Failed, Some(err.to_string())),
                };
                InstallOutcome {
                    identity: outcome.identity,
                    kind,
                    source: outcome.source,
                    description: outcome.description,
                    requested,
                    error,
                }
            })
            .collect();
        // Requested package first, dependencies after in name order.
        outcomes.sort_by(|a, b| {
            b.requested
                .cmp(&a.requested)
                .then_with(|| a.identity.key().cmp(&b.identity.key()))
        });
        Self { outcomes }
    }

    /// Whether every identity in the operation is now present. Partial
    /// success is still reported per package, but the operation as a
    /// whole fails so automation does not mistake it for complete.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| o.kind != OutcomeKind::Failed)
    }

    /// The outcomes that failed.
    #[must_use]
    pub fn failures(&self) -> Vec<&InstallOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.kind == OutcomeKind::Failed)
            .collect()
    }

    /// The outcome for the requested package itself.
    #[must_use]
    pub fn requested(&self) -> Option<&InstallOutcome> {
        self.outcomes.iter().find(|o| o.requested)
    }
}
