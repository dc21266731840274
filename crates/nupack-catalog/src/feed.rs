//! A client for one package feed.

use crate::error::{CatalogError, Result};
use crate::http::HttpClient;
use crate::types::{
    DependencyGroup, PackageDependency, PackageMetadata, RegistrationLeaf, SearchHit, SearchPage,
    VersionList,
};
use nupack_core::{
    AHashSet, PackageIdentity, PackageName, PackageVersion, TargetFramework, VersionRange,
};
use nupack_config::PackageSource;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace, warn};
use url::Url;

/// Search page size requested from feeds.
const SEARCH_PAGE_SIZE: usize = 50;

/// Client for a single configured package source.
#[derive(Debug, Clone)]
pub struct FeedClient {
    /// Source name, echoed into every error and result.
    name: Arc<str>,
    /// Endpoint base URL.
    base: Url,
    /// Shared transport.
    http: Arc<HttpClient>,
}

impl FeedClient {
    /// Create a client for a configured source.
    #[must_use]
    pub fn new(source: &PackageSource, http: Arc<HttpClient>) -> Self {
        Self {
            name: Arc::from(source.name.as_str()),
            base: source.location.clone(),
            http,
        }
    }

    /// The source name this client queries.
    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.name
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| CatalogError::InvalidConfig {
                message: format!("cannot build endpoint '{path}' from {}: {e}", self.base),
            })
    }

    /// Search the feed, paginating transparently.
    ///
    /// Pages of [`SEARCH_PAGE_SIZE`] are requested until a short page
    /// signals end-of-results; all pages merge into one deduplicated
    /// sequence. Zero hits is a valid, empty result.
    pub async fn search(&self, query: &str, include_prerelease: bool) -> Result<Vec<SearchHit>> {
        let mut hits = Vec::new();
        let mut seen: AHashSet<String> = AHashSet::new();
        let mut skip = 0usize;

        loop {
            let mut url = self.endpoint("query")?;
            url.query_pairs_mut()
                .append_pair("q", query)
                .append_pair("skip", &skip.to_string())
                .append_pair("take", &SEARCH_PAGE_SIZE.to_string())
                .append_pair("prerelease", if include_prerelease { "true" } else { "false" });

            let page: SearchPage = match self.http.get_json(&self.name, &url).await? {
                Some(page) => page,
                // A feed without a search endpoint has nothing to offer.
                None => return Ok(hits),
            };

            let page_len = page.data.len();
            trace!(source = %self.name, skip, page_len, "search page");

            for entry in page.data {
                let Some(identity) = parse_identity(&entry.id, &entry.version) else {
                    warn!(source = %self.name, id = %entry.id, version = %entry.version,
                        "skipping unparseable search entry");
                    continue;
                };
                if !include_prerelease && identity.version.is_prerelease() {
                    continue;
                }
                if seen.insert(identity.key()) {
                    hits.push(SearchHit {
                        identity,
                        description: entry.description,
                        source: self.name.to_string(),
                    });
                }
            }

            if page_len < SEARCH_PAGE_SIZE {
                break;
            }
            skip += SEARCH_PAGE_SIZE;
        }

        debug!(source = %self.name, query, hits = hits.len(), "search complete");
        Ok(hits)
    }

    /// All published versions of a package, ascending. `Ok(None)` when
    /// the feed does not know the name at all.
    pub async fn versions(&self, name: &PackageName) -> Result<Option<Vec<PackageVersion>>> {
        let url = self.endpoint(&format!("package/{}/index.json", name.normalized()))?;
        let Some(list) = self.http.get_json::<VersionList>(&self.name, &url).await? else {
            return Ok(None);
        };

        let mut versions = Vec::with_capacity(list.versions.len());
        for raw in &list.versions {
            match PackageVersion::parse(raw) {
                Some(v) => versions.push(v),
                None => {
                    return Err(CatalogError::MalformedResponse {
                        name: self.name.to_string(),
                        message: format!("unparseable version '{raw}' for {name}"),
                    })
                }
            }
        }
        versions.sort();
        Ok(Some(versions))
    }

    /// Dependency metadata for one concrete package version.
    ///
    /// `Ok(None)` means this feed does not carry the identity; transport
    /// and parse failures surface as errors tagged with the source.
    pub async fn dependency_info(
        &self,
        identity: &PackageIdentity,
    ) -> Result<Option<PackageMetadata>> {
        let url = self.endpoint(&format!(
            "registration/{}/{}.json",
            identity.name.normalized(),
            identity.version
        ))?;

        let Some(leaf) = self
            .http
            .get_json::<RegistrationLeaf>(&self.name, &url)
            .await?
        else {
            return Ok(None);
        };

        let mut groups = Vec::with_capacity(leaf.dependency_groups.len());
        for group in leaf.dependency_groups {
            let framework = group
                .target_framework
                .as_deref()
                .map_or_else(TargetFramework::any, TargetFramework::new);

            let mut dependencies = Vec::with_capacity(group.dependencies.len());
            for dep in group.dependencies {
                let name = PackageName::parse(&dep.id).ok_or_else(|| {
                    CatalogError::MalformedResponse {
                        name: self.name.to_string(),
                        message: format!("invalid dependency id '{}'", dep.id),
                    }
                })?;
                let range = match dep.range.as_deref() {
                    None | Some("") => VersionRange::any(),
                    Some(raw) => {
                        VersionRange::parse(raw).ok_or_else(|| CatalogError::MalformedResponse {
                            name: self.name.to_string(),
                            message: format!("invalid dependency range '{raw}'"),
                        })?
                    }
                };
                dependencies.push(PackageDependency { name, range });
            }
            groups.push(DependencyGroup {
                framework,
                dependencies,
            });
        }

        Ok(Some(PackageMetadata {
            identity: identity.clone(),
            listed: leaf.listed,
            description: leaf.description,
            source: self.name.to_string(),
            groups,
        }))
    }

    /// Download the package artifact to `dest`, streaming. Returns the
    /// number of bytes written.
    pub async fn download_to(&self, identity: &PackageIdentity, dest: &Path) -> Result<u64> {
        let name = identity.name.normalized();
        let version = identity.version.to_string();
        let url = self.endpoint(&format!("package/{name}/{version}/{name}.{version}.nupkg"))?;
        self.http.get_to_file(&self.name, &url, dest).await
    }
}

fn parse_identity(id: &str, version: &str) -> Option<PackageIdentity> {
    Some(PackageIdentity::new(
        PackageName::parse(id)?,
        PackageVersion::parse(version)?,
    ))
}
