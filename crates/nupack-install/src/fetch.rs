//! The seam between the installer and artifact transport.

use crate::error::Result;
use async_trait::async_trait;
use nupack_core::PackageIdentity;
use std::path::Path;

/// Downloads artifact bytes for an identity from a named source.
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Stream the artifact for `identity` from `source` into `dest`.
    /// Returns the number of bytes written.
    async fn download(
        &self,
        source: &str,
        identity: &PackageIdentity,
        dest: &Path,
    ) -> Result<u64>;
}
