//! The seam between the resolver and the catalog backend.
//!
//! The graph builder only needs two questions answered per source:
//! "what does this exact package version depend on" and "what versions
//! of this name exist". Keeping that behind a trait lets the resolver be
//! tested against in-memory fixtures.

use async_trait::async_trait;
use nupack_core::{PackageIdentity, PackageName, PackageVersion, TargetFramework, VersionRange};
use thiserror::Error;

/// A failure talking to one source. Recorded per source and carried in
/// the candidate set; never fatal on its own.
#[derive(Debug, Clone, Error)]
#[error("source '{name}': {message}")]
pub struct SourceFault {
    /// Source name.
    pub name: String,
    /// Error message.
    pub message: String,
}

impl SourceFault {
    /// Create a fault for a named source.
    #[must_use]
    pub fn new(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: source.into(),
            message: message.into(),
        }
    }
}

/// A declared dependency as the graph builder consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRequest {
    /// Dependency package name.
    pub name: PackageName,
    /// Required version range.
    pub range: VersionRange,
}

/// Metadata for one concrete package version, already narrowed to the
/// target framework the operation asked for.
#[derive(Debug, Clone)]
pub struct PackageInfo {
    /// The package this metadata describes.
    pub identity: PackageIdentity,
    /// Name of the source that provided the metadata; downloads go back
    /// to the same source.
    pub source: String,
    /// Whether the version is listed for discovery.
    pub listed: bool,
    /// Package description.
    pub description: Option<String>,
    /// Dependencies applying to the requested framework.
    pub dependencies: Vec<DependencyRequest>,
}

/// One queryable metadata source.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// The source name, echoed into candidates and faults.
    fn name(&self) -> &str;

    /// Dependency metadata for an exact identity, narrowed to
    /// `framework`. `Ok(None)` when the source does not carry it.
    async fn dependency_info(
        &self,
        identity: &PackageIdentity,
        framework: &TargetFramework,
    ) -> Result<Option<PackageInfo>, SourceFault>;

    /// All published versions of `name`, ascending. `Ok(None)` when the
    /// source does not know the name.
    async fn versions(&self, name: &PackageName)
        -> Result<Option<Vec<PackageVersion>>, SourceFault>;
}
