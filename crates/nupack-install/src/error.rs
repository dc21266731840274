//! Error types for the installer.

use std::path::PathBuf;
use thiserror::Error;

/// Installer-specific error types. All of these are per-package: one
/// identity failing never stops the rest of the batch.
#[derive(Error, Debug)]
pub enum InstallError {
    /// Fetching the artifact bytes failed.
    #[error("download failed for {package}: {message}")]
    Download {
        /// Package identity string.
        package: String,
        /// Error message.
        message: String,
    },

    /// Downloaded content is not a valid package archive.
    #[error("{package} is not a valid package archive: {message}")]
    MalformedArtifact {
        /// Package identity string.
        package: String,
        /// Error message.
        message: String,
    },

    /// Disk failure while extracting.
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

    /// The operation was cancelled.
    #[error("install cancelled")]
    Cancelled,
}

impl InstallError {
    /// Create an I/O error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Create a malformed-artifact error.
    #[must_use]
    pub fn malformed(package: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedArtifact {
            package: package.into(),
            message: message.into(),
        }
    }
}

/// Result type for install operations.
pub type Result<T> = std::result::Result<T, InstallError>;

impl From<InstallError> for nupack_core::Error {
    fn from(err: InstallError) -> Self {
        match err {
            InstallError::Download { package, message } => Self::Source {
                name: package,
                message,
            },
            InstallError::MalformedArtifact { package, message } => {
                Self::MalformedArtifact { package, message }
            }
            InstallError::Extraction { path, message } => Self::Extraction { path, message },
            InstallError::Io { path, message } => Self::Io { path, message },
            InstallError::Cancelled => Self::Cancelled,
        }
    }
}
