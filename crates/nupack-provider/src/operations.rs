//! The operations exposed to the host command surface.

use crate::adapters::{CatalogArtifactFetcher, FeedMetadataSource};
use crate::outcome::InstallReport;
use crate::request::{InstallRequest, SourceOptions};
use nupack_catalog::{CatalogError, CatalogSet, SearchHit};
use nupack_config::{PackageSource, Settings};
use nupack_core::{Error, PackageIdentity, PackageName, PackageVersion, Result, VersionRange};
use nupack_install::{
    DestinationMode, InstallItem, InstalledPackageRecord, Installer, InstallerConfig, StoreLayout,
};
use nupack_resolver::{resolve, GraphBuilder, GraphConfig, MetadataSource, ResolveError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

/// Search results with any per-source failures that occurred alongside.
#[derive(Debug)]
pub struct SearchResults {
    /// Merged, deduplicated hits across all queried sources.
    pub hits: Vec<SearchHit>,
    /// Messages for sources that failed; the hits above still stand.
    pub source_errors: Vec<String>,
}

/// One concrete version of a package found in a source.
#[derive(Debug, Clone)]
pub struct FoundPackage {
    /// The package identity.
    pub identity: PackageIdentity,
    /// Source that carries it.
    pub source: String,
}

/// The package provider: a settings snapshot plus the operations the
/// host surface calls.
#[derive(Debug)]
pub struct Provider {
    settings: Settings,
}

impl Provider {
    /// Create a provider over a settings snapshot.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// The settings snapshot this provider operates on.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Resolve and install a package with its transitive dependencies.
    ///
    /// Terminal failures (root not found, unsatisfiable constraints,
    /// every source unreachable, cancellation) come back as `Err`;
    /// per-package failures are reported inside the `Ok` report, which
    /// then answers `is_success() == false`.
    pub async fn install_or_save(
        &self,
        request: &InstallRequest,
        cancel: &CancellationToken,
    ) -> Result<InstallReport> {
        let catalog = CatalogSet::from_settings(&self.settings, request.sources.as_deref())?;
        if catalog.is_empty() {
            return Err(Error::Config(
                "no enabled package sources match the request".into(),
            ));
        }

        let root = self.pin_root(&catalog, request).await?;
        info!(%root, "resolving");

        let sources: Vec<Arc<dyn MetadataSource>> = catalog
            .clients()
            .iter()
            .map(|client| {
                Arc::new(FeedMetadataSource::new(Arc::clone(client))) as Arc<dyn MetadataSource>
            })
            .collect();
        let builder = GraphBuilder::new(
            sources,
            GraphConfig {
                framework: request.options.framework.clone(),
                max_concurrent: self.settings.max_concurrent_fetch,
            },
        );
        let candidates = builder.build(root.clone(), cancel).await.map_err(Error::from)?;

        let resolved = resolve(&candidates, &root, request.options.dependency_behavior)
            .map_err(|err| {
                // A root with no candidates and nothing but faults means
                // the sources were unreachable, not that the package is
                // unknown.
                if matches!(err, ResolveError::RootNotFound { .. }) && candidates.is_empty() {
                    if let Some(fault) = candidates.faults().first() {
                        return Error::source(&fault.name, &fault.message);
                    }
                }
                Error::from(err)
            })?;
        info!(packages = resolved.len(), "resolved");

        let items: Vec<InstallItem> = resolved
            .iter()
            .map(|identity| {
                let candidate = candidates
                    .get(identity)
                    .expect("resolved identities come from the candidate set");
                InstallItem {
                    identity: identity.clone(),
                    source: candidate.source.clone(),
                    description: candidate.description.clone(),
                }
            })
            .collect();

        let installer = Installer::new(
            Arc::new(CatalogArtifactFetcher::new(catalog)),
            StoreLayout::new(&self.settings.store_root),
            InstallerConfig {
                max_concurrent: self.settings.max_concurrent_install,
            },
        );
        let batch = installer
            .install_all(items, &request.destination, cancel)
            .await;

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(InstallReport::from_batch(batch.outcomes, &root))
    }

    /// Pin the root identity for a request.
    ///
    /// An exact version is taken as-is. Otherwise the highest version
    /// satisfying the constraint wins, across all queried sources,
    /// gated by the pre-release flag — the dependency policy only
    /// applies below the root.
    async fn pin_root(
        &self,
        catalog: &CatalogSet,
        request: &InstallRequest,
    ) -> Result<PackageIdentity> {
        if let Some(range) = &request.version {
            if range.is_exact() {
                let version = range.minimum().expect("exact ranges have a minimum").clone();
                return Ok(PackageIdentity::new(request.name.clone(), version));
            }
        }

        let mut merged: Vec<PackageVersion> = Vec::new();
        let mut first_fault: Option<CatalogError> = None;
        let mut fault_count = 0usize;
        for client in catalog.clients() {
            match client.versions(&request.name).await {
                Ok(Some(versions)) => merged.extend(versions),
                Ok(None) => {}
                Err(err) => {
                    warn!(source = client.source_name(), %err, "version query failed");
                    fault_count += 1;
                    if first_fault.is_none() {
                        first_fault = Some(err);
                    }
                }
            }
        }
        merged.sort();
        merged.dedup();

        let best = merged.into_iter().rev().find(|version| {
            (request.include_prerelease || !version.is_prerelease())
                && request
                    .version
                    .as_ref()
                    .is_none_or(|range| range.contains(version))
        });

        match best {
            Some(version) => Ok(PackageIdentity::new(request.name.clone(), version)),
            None => {
                if fault_count == catalog.clients().len() {
                    // Every source failed: surface the transport problem
                    // instead of claiming the package does not exist.
                    Err(first_fault.expect("at least one fault recorded").into())
                } else {
                    Err(Error::not_found(request.name.as_str()))
                }
            }
        }
    }

    /// Search the enabled sources.
    pub async fn search(
        &self,
        query: &str,
        include_prerelease: bool,
        sources: Option<&[String]>,
    ) -> Result<SearchResults> {
        let catalog = CatalogSet::from_settings(&self.settings, sources)?;
        let (hits, failures) = catalog.search(query, include_prerelease).await?;
        Ok(SearchResults {
            hits,
            source_errors: failures.iter().map(ToString::to_string).collect(),
        })
    }

    /// Find the versions of one package name, newest first. The first
    /// source that knows the name answers, matching graph-build order.
    pub async fn find_package(
        &self,
        name: &PackageName,
        range: Option<&VersionRange>,
        include_prerelease: bool,
        sources: Option<&[String]>,
    ) -> Result<Vec<FoundPackage>> {
        let catalog = CatalogSet::from_settings(&self.settings, sources)?;
        for client in catalog.clients() {
            match client.versions(name).await {
                Ok(Some(versions)) => {
                    let mut found: Vec<FoundPackage> = versions
                        .into_iter()
                        .rev()
                        .filter(|v| include_prerelease || !v.is_prerelease())
                        .filter(|v| range.is_none_or(|r| r.contains(v)))
                        .map(|version| FoundPackage {
                            identity: PackageIdentity::new(name.clone(), version),
                            source: client.source_name().to_string(),
                        })
                        .collect();
                    if found.is_empty() {
                        continue;
                    }
                    found.sort_by(|a, b| b.identity.version.cmp(&a.identity.version));
                    return Ok(found);
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(source = client.source_name(), %err, "version query failed");
                }
            }
        }
        Ok(Vec::new())
    }

    /// Installed packages under a destination.
    pub fn enumerate_installed(
        &self,
        destination: &DestinationMode,
    ) -> Result<Vec<InstalledPackageRecord>> {
        StoreLayout::new(&self.settings.store_root)
            .enumerate_installed(destination)
            .map_err(Error::from)
    }

    /// The registered sources.
    #[must_use]
    pub fn sources(&self) -> &[PackageSource] {
        self.settings.sources.all()
    }

    /// Register a new source and persist the registry.
    pub fn register_source(
        &mut self,
        name: &str,
        location: Url,
        options: &SourceOptions,
        trusted: bool,
    ) -> Result<()> {
        let mut source = PackageSource::new(name, location);
        if let Some(protocol) = options.protocol_version {
            source.protocol_version = protocol;
        }
        source.trusted = trusted;
        self.settings.sources.register(source)?;
        self.settings.save_sources().map_err(Error::from)
    }

    /// Remove a source and persist the registry.
    pub fn unregister_source(&mut self, name: &str) -> Result<PackageSource> {
        let removed = self.settings.sources.unregister(name)?;
        self.settings.save_sources()?;
        Ok(removed)
    }

    /// Update a source in place and persist the registry.
    pub fn set_source(&mut self, name: &str, options: &SourceOptions) -> Result<()> {
        self.settings
            .sources
            .set(name, options.location.clone(), options.protocol_version)?;
        self.settings.save_sources().map_err(Error::from)
    }

    /// Enable or disable a source and persist the registry.
    pub fn set_source_enabled(&mut self, name: &str, enabled: bool) -> Result<()> {
        self.settings.sources.set_enabled(name, enabled)?;
        self.settings.save_sources().map_err(Error::from)
    }
}
