//! Error types for catalog queries.

use thiserror::Error;

/// Catalog-specific error types. Every variant names the source it came
/// from; one source failing never aborts queries against the others.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Transport-level failure reaching the source.
    #[error("source '{name}' unreachable: {message}")]
    Unreachable {
        /// Source name.
        name: String,
        /// Error message.
        message: String,
    },

    /// The source answered with an unexpected HTTP status.
    #[error("source '{name}' returned HTTP {status}")]
    Status {
        /// Source name.
        name: String,
        /// HTTP status code.
        status: u16,
    },

    /// The source answered with a body the client cannot parse.
    #[error("source '{name}' returned a malformed response: {message}")]
    MalformedResponse {
        /// Source name.
        name: String,
        /// Error message.
        message: String,
    },

    /// The client itself was misconfigured.
    #[error("invalid catalog configuration: {message}")]
    InvalidConfig {
        /// Error message.
        message: String,
    },

    /// I/O failure writing a downloaded artifact.
    #[error("io error writing {path}: {message}")]
    Io {
        /// Destination path.
        path: std::path::PathBuf,
        /// Error message.
        message: String,
    },
}

impl CatalogError {
    /// Map a reqwest error onto the taxonomy.
    #[must_use]
    pub fn from_reqwest(source: &str, err: &reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::Status {
                name: source.to_string(),
                status: status.as_u16(),
            };
        }
        if err.is_decode() || err.is_body() {
            return Self::MalformedResponse {
                name: source.to_string(),
                message: err.to_string(),
            };
        }
        Self::Unreachable {
            name: source.to_string(),
            message: err.to_string(),
        }
    }

    /// The source this error belongs to, when it has one.
    #[must_use]
    pub fn source_name(&self) -> Option<&str> {
        match self {
            Self::Unreachable { name, .. }
            | Self::Status { name, .. }
            | Self::MalformedResponse { name, .. } => Some(name),
            Self::InvalidConfig { .. } | Self::Io { .. } => None,
        }
    }

    /// Whether retrying the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Unreachable { .. } => true,
            Self::Status { status, .. } => matches!(status, 408 | 429 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

impl From<CatalogError> for nupack_core::Error {
    fn from(err: CatalogError) -> Self {
        let source = err.source_name().unwrap_or("catalog").to_string();
        Self::Source {
            name: source,
            message: err.to_string(),
        }
    }
}
