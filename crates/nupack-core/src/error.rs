//! The shared error type.
//!
//! Component crates define their own `thiserror` enums and convert into
//! this one at the provider boundary, so hosts see a single taxonomy:
//! per-source failures, terminal resolution failures, and per-package
//! installation failures.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced across nupack components.
#[derive(Error, Debug)]
pub enum Error {
    /// The requested root package matched nothing in any enabled source.
    #[error("no package found matching '{name}'")]
    NotFound {
        /// Requested package name.
        name: String,
    },

    /// The resolver could not pick one version per name.
    #[error("unable to resolve '{name}': {detail}")]
    Unsatisfiable {
        /// Package name whose constraints conflict.
        name: String,
        /// Human-readable description of the conflicting edges.
        detail: String,
    },

    /// Talking to one catalog source failed.
    #[error("source '{name}' failed: {message}")]
    Source {
        /// Source name.
        name: String,
        /// Error message.
        message: String,
    },

    /// Downloaded content is not a valid package archive.
    #[error("package '{package}' is not a valid archive: {message}")]
    MalformedArtifact {
        /// Package identity string.
        package: String,
        /// Error message.
        message: String,
    },

    /// Disk failure while materializing a package.
    #[error("extraction failed at {path}: {message}")]
    Extraction {
        /// Destination path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// I/O error with path context.
    #[error("io error at {path}: {message}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Configuration problem.
    #[error("configuration error: {0}")]
    Config(String),

    /// The operation was cancelled.
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Create a root-not-found error.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create an unsatisfiable-constraint error.
    #[must_use]
    pub fn unsatisfiable(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Unsatisfiable {
            name: name.into(),
            detail: detail.into(),
        }
    }

    /// Create a per-source error.
    #[must_use]
    pub fn source(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            name: source.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Whether this error aborts the whole operation rather than one
    /// package or source.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Unsatisfiable { .. } | Self::Cancelled
        )
    }
}

/// Result alias for nupack operations.
pub type Result<T> = std::result::Result<T, Error>;
