//! Error types for configuration handling.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-specific error types.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// I/O error with path context.
    #[error("io error at {path}: {message}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Malformed configuration file.
    #[error("invalid configuration at {path}: {message}")]
    Parse {
        /// File path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// A named source does not exist in the registry.
    #[error("unknown source: {0}")]
    UnknownSource(String),

    /// A source with the same name is already registered.
    #[error("source already registered: {0}")]
    DuplicateSource(String),

    /// Protocol version outside the supported set.
    #[error("unsupported protocol version {0} (expected 2 or 3)")]
    InvalidProtocolVersion(u32),

    /// Source location is not a valid URL.
    #[error("invalid source location: {0}")]
    InvalidUrl(String),

    /// No platform configuration directory could be determined.
    #[error("cannot determine a configuration directory")]
    NoConfigDir,
}

impl ConfigError {
    /// Create an I/O error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

impl From<ConfigError> for nupack_core::Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
