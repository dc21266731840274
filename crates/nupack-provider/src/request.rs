//! Typed request and per-operation option types.
//!
//! Each operation kind carries its own option struct; the host's command
//! dispatch (a clap subcommand enum, a switch on an operation tag) picks
//! the struct — options are never discovered by inspecting values at
//! runtime.

use nupack_core::{PackageName, TargetFramework, VersionRange};
use nupack_config::ProtocolVersion;
use nupack_install::DestinationMode;
use nupack_resolver::ResolutionPolicy;
use url::Url;

/// Options specific to the install operation.
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Target framework used to narrow dependency groups.
    pub framework: TargetFramework,
    /// Which satisfying version to prefer for dependencies.
    pub dependency_behavior: ResolutionPolicy,
}

/// Options specific to the set-source operation.
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    /// New endpoint location, when changing it.
    pub location: Option<Url>,
    /// New protocol version, when changing it.
    pub protocol_version: Option<ProtocolVersion>,
}

/// A request to install a package (and its dependencies).
#[derive(Debug, Clone)]
pub struct InstallRequest {
    /// Requested package name.
    pub name: PackageName,
    /// Version constraint; `None` installs the latest version. An exact
    /// pin is the `[v]` range.
    pub version: Option<VersionRange>,
    /// Whether pre-release versions may be chosen.
    pub include_prerelease: bool,
    /// Restrict the operation to these source names; `None` uses every
    /// enabled source.
    pub sources: Option<Vec<String>>,
    /// Where extraction writes.
    pub destination: DestinationMode,
    /// Install-specific options.
    pub options: InstallOptions,
}

impl InstallRequest {
    /// A request for the latest version of `name` into the global store.
    #[must_use]
    pub fn new(name: PackageName) -> Self {
        Self {
            name,
            version: None,
            include_prerelease: false,
            sources: None,
            destination: DestinationMode::GlobalStore,
            options: InstallOptions::default(),
        }
    }

    /// Constrain the version.
    #[must_use]
    pub fn with_version(mut self, version: VersionRange) -> Self {
        self.version = Some(version);
        self
    }

    /// Allow pre-release versions.
    #[must_use]
    pub const fn with_prerelease(mut self, include: bool) -> Self {
        self.include_prerelease = include;
        self
    }

    /// Restrict to named sources.
    #[must_use]
    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = Some(sources);
        self
    }

    /// Change the destination.
    #[must_use]
    pub fn with_destination(mut self, destination: DestinationMode) -> Self {
        self.destination = destination;
        self
    }

    /// Change the dependency resolution policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: ResolutionPolicy) -> Self {
        self.options.dependency_behavior = policy;
        self
    }

    /// Change the target framework.
    #[must_use]
    pub fn with_framework(mut self, framework: TargetFramework) -> Self {
        self.options.framework = framework;
        self
    }
}
