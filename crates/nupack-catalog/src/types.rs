//! Wire DTOs and the domain types built from them.

use nupack_core::{PackageIdentity, PackageName, TargetFramework, VersionRange};
use serde::{Deserialize, Serialize};

/// One page of search results as a feed returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    /// Total hits across all pages, when the feed reports it.
    #[serde(default)]
    pub total_hits: Option<u64>,
    /// Entries on this page.
    pub data: Vec<SearchEntry>,
}

/// One search hit on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntry {
    /// Package id.
    pub id: String,
    /// Latest matching version.
    pub version: String,
    /// Package description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Flat version list for one package id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionList {
    /// All published version strings.
    pub versions: Vec<String>,
}

/// Registration document for one (id, version) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationLeaf {
    /// Package id.
    pub id: String,
    /// Package version.
    pub version: String,
    /// Whether the version is listed for discovery.
    #[serde(default = "default_true")]
    pub listed: bool,
    /// Package description.
    #[serde(default)]
    pub description: Option<String>,
    /// Declared dependencies grouped by target framework.
    #[serde(default)]
    pub dependency_groups: Vec<DependencyGroupDto>,
}

fn default_true() -> bool {
    true
}

/// One framework-specific dependency group on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyGroupDto {
    /// Target framework moniker; absent means the any-framework group.
    #[serde(default)]
    pub target_framework: Option<String>,
    /// Dependencies in this group.
    #[serde(default)]
    pub dependencies: Vec<DependencyDto>,
}

/// One declared dependency on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyDto {
    /// Dependency package id.
    pub id: String,
    /// Version range in bracket notation; absent means any version.
    #[serde(default)]
    pub range: Option<String>,
}

/// A search hit with its originating source attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Matched package identity.
    pub identity: PackageIdentity,
    /// Package description.
    pub description: Option<String>,
    /// Name of the source that returned the hit.
    pub source: String,
}

/// A declared dependency in domain form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDependency {
    /// Dependency package name.
    pub name: PackageName,
    /// Required version range.
    pub range: VersionRange,
}

/// Dependency metadata for one concrete package version.
#[derive(Debug, Clone)]
pub struct PackageMetadata {
    /// The package this metadata describes.
    pub identity: PackageIdentity,
    /// Whether the version is listed for discovery.
    pub listed: bool,
    /// Package description.
    pub description: Option<String>,
    /// Name of the source that provided the metadata.
    pub source: String,
    /// Dependency groups keyed by framework.
    pub groups: Vec<DependencyGroup>,
}

/// A framework-specific dependency group in domain form.
#[derive(Debug, Clone)]
pub struct DependencyGroup {
    /// Target framework of this group.
    pub framework: TargetFramework,
    /// Dependencies declared for that framework.
    pub dependencies: Vec<PackageDependency>,
}

impl PackageMetadata {
    /// The dependencies applying to `framework`.
    ///
    /// Exact moniker match wins, then the any-framework group; a package
    /// with neither declares no dependencies for that framework.
    #[must_use]
    pub fn dependencies_for(&self, framework: &TargetFramework) -> &[PackageDependency] {
        if let Some(group) = self.groups.iter().find(|g| &g.framework == framework) {
            return &group.dependencies;
        }
        if let Some(group) = self.groups.iter().find(|g| g.framework.is_any()) {
            return &group.dependencies;
        }
        &[]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nupack_core::PackageVersion;

    fn metadata_with_groups(groups: Vec<DependencyGroup>) -> PackageMetadata {
        PackageMetadata {
            identity: PackageIdentity::new(
                PackageName::parse("pkg").unwrap(),
                PackageVersion::new(1, 0, 0),
            ),
            listed: true,
            description: None,
            source: "test".into(),
            groups,
        }
    }

    fn dep(name: &str) -> PackageDependency {
        PackageDependency {
            name: PackageName::parse(name).unwrap(),
            range: VersionRange::any(),
        }
    }

    #[test]
    fn exact_framework_group_wins_over_any() {
        let metadata = metadata_with_groups(vec![
            DependencyGroup {
                framework: TargetFramework::any(),
                dependencies: vec![dep("fallback")],
            },
            DependencyGroup {
                framework: TargetFramework::new("net8.0"),
                dependencies: vec![dep("specific")],
            },
        ]);

        let deps = metadata.dependencies_for(&TargetFramework::new("net8.0"));
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name.as_str(), "specific");
    }

    #[test]
    fn missing_framework_falls_back_to_any() {
        let metadata = metadata_with_groups(vec![DependencyGroup {
            framework: TargetFramework::any(),
            dependencies: vec![dep("fallback")],
        }]);
        let deps = metadata.dependencies_for(&TargetFramework::new("net6.0"));
        assert_eq!(deps[0].name.as_str(), "fallback");
    }

    #[test]
    fn no_matching_group_means_no_dependencies() {
        let metadata = metadata_with_groups(vec![DependencyGroup {
            framework: TargetFramework::new("net48"),
            dependencies: vec![dep("windows-only")],
        }]);
        assert!(metadata
            .dependencies_for(&TargetFramework::new("net8.0"))
            .is_empty());
    }
}
