//! Adapters plugging the catalog into the resolver and installer seams.

use async_trait::async_trait;
use nupack_catalog::{CatalogSet, FeedClient};
use nupack_core::{PackageIdentity, PackageName, PackageVersion, TargetFramework};
use nupack_install::{ArtifactFetcher, InstallError};
use nupack_resolver::{DependencyRequest, MetadataSource, PackageInfo, SourceFault};
use std::sync::Arc;

/// One feed client exposed as a resolver metadata source.
pub(crate) struct FeedMetadataSource {
    client: Arc<FeedClient>,
}

impl FeedMetadataSource {
    pub(crate) fn new(client: Arc<FeedClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MetadataSource for FeedMetadataSource {
    fn name(&self) -> &str {
        self.client.source_name()
    }

    async fn dependency_info(
        &self,
        identity: &PackageIdentity,
        framework: &TargetFramework,
    ) -> Result<Option<PackageInfo>, SourceFault> {
        let metadata = self
            .client
            .dependency_info(identity)
            .await
            .map_err(|e| SourceFault::new(self.client.source_name(), e.to_string()))?;

        Ok(metadata.map(|metadata| {
            let dependencies = metadata
                .dependencies_for(framework)
                .iter()
                .map(|dep| DependencyRequest {
                    name: dep.name.clone(),
                    range: dep.range.clone(),
                })
                .collect();
            PackageInfo {
                identity: metadata.identity.clone(),
                source: metadata.source.clone(),
                listed: metadata.listed,
                description: metadata.description.clone(),
                dependencies,
            }
        }))
    }

    async fn versions(
        &self,
        name: &PackageName,
    ) -> Result<Option<Vec<PackageVersion>>, SourceFault> {
        self.client
            .versions(name)
            .await
            .map_err(|e| SourceFault::new(self.client.source_name(), e.to_string()))
    }
}

/// The catalog set exposed as the installer's artifact transport.
pub(crate) struct CatalogArtifactFetcher {
    catalog: CatalogSet,
}

impl CatalogArtifactFetcher {
    pub(crate) fn new(catalog: CatalogSet) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl ArtifactFetcher for CatalogArtifactFetcher {
    async fn download(
        &self,
        source: &str,
        identity: &PackageIdentity,
        dest: &std::path::Path,
    ) -> Result<u64, InstallError> {
        let client = self
            .catalog
            .find(source)
            .ok_or_else(|| InstallError::Download {
                package: identity.to_string(),
                message: format!("source '{source}' is not enabled"),
            })?;
        client
            .download_to(identity, dest)
            .await
            .map_err(|e| InstallError::Download {
                package: identity.to_string(),
                message: e.to_string(),
            })
    }
}
