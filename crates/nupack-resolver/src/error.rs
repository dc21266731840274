//! Error types for graph building and resolution.

use crate::candidate::DependencyEdge;
use thiserror::Error;

/// Resolver-specific error types.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The root package was not found in any enabled source.
    #[error("package not found: {name}")]
    RootNotFound {
        /// Requested root name.
        name: String,
    },

    /// No version of some required name satisfies all incoming
    /// constraints simultaneously.
    #[error("no version of '{name}' satisfies {}", format_edges(edges))]
    Unsatisfiable {
        /// Package name whose constraints conflict.
        name: String,
        /// The conflicting incoming edges.
        edges: Vec<DependencyEdge>,
    },

    /// Selection oscillated past the iteration bound without settling.
    /// Reported as a constraint failure because committing would require
    /// backtracking, which this resolver deliberately does not do.
    #[error("resolution did not converge while selecting '{name}'")]
    NoFixpoint {
        /// The last package name whose selection kept changing.
        name: String,
    },

    /// The operation was cancelled.
    #[error("resolution cancelled")]
    Cancelled,
}

fn format_edges(edges: &[DependencyEdge]) -> String {
    if edges.is_empty() {
        return "any available version (none were discoverable)".to_string();
    }
    edges
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ResolveError {
    /// The package name this error is about, when it has one.
    #[must_use]
    pub fn package_name(&self) -> Option<&str> {
        match self {
            Self::RootNotFound { name }
            | Self::Unsatisfiable { name, .. }
            | Self::NoFixpoint { name } => Some(name),
            Self::Cancelled => None,
        }
    }
}

/// Result type for resolver operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

impl From<ResolveError> for nupack_core::Error {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::RootNotFound { name } => Self::NotFound { name },
            ResolveError::Unsatisfiable { ref name, .. } => Self::Unsatisfiable {
                name: name.clone(),
                detail: err.to_string(),
            },
            ResolveError::NoFixpoint { name } => Self::Unsatisfiable {
                name: name.clone(),
                detail: format!("resolution did not converge while selecting '{name}'"),
            },
            ResolveError::Cancelled => Self::Cancelled,
        }
    }
}
