//! The package source registry.
//!
//! A source is a named catalog endpoint. The registry is a persisted list
//! with plain CRUD semantics; the hard resolution work never touches it
//! beyond asking "which sources are enabled".

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;
use url::Url;

/// Catalog wire protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ProtocolVersion {
    /// Legacy OData-style protocol.
    V2,
    /// JSON service-index protocol.
    #[default]
    V3,
}

impl ProtocolVersion {
    /// Numeric form as it appears in configuration.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        match self {
            Self::V2 => 2,
            Self::V3 => 3,
        }
    }
}

impl TryFrom<u32> for ProtocolVersion {
    type Error = ConfigError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            2 => Ok(Self::V2),
            3 => Ok(Self::V3),
            other => Err(ConfigError::InvalidProtocolVersion(other)),
        }
    }
}

impl From<ProtocolVersion> for u32 {
    fn from(value: ProtocolVersion) -> Self {
        value.as_u32()
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

/// A named catalog endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSource {
    /// Source name, unique within the registry (case-insensitive).
    pub name: String,
    /// Endpoint base URL.
    pub location: Url,
    /// Wire protocol version.
    #[serde(default)]
    pub protocol_version: ProtocolVersion,
    /// Disabled sources are skipped by every operation.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Whether artifacts from this source are trusted without prompting.
    #[serde(default)]
    pub trusted: bool,
}

fn default_true() -> bool {
    true
}

impl PackageSource {
    /// Create an enabled source with the default protocol.
    #[must_use]
    pub fn new(name: impl Into<String>, location: Url) -> Self {
        Self {
            name: name.into(),
            location,
            protocol_version: ProtocolVersion::default(),
            enabled: true,
            trusted: false,
        }
    }
}

/// The persisted list of package sources.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRegistry {
    /// Registered sources, in registration order. Order matters: the
    /// graph builder takes the first non-empty answer.
    sources: Vec<PackageSource>,
}

impl SourceRegistry {
    /// An empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// A registry seeded with the default public feed.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        if let Ok(url) = Url::parse("https://api.nuget.org/v3/index.json") {
            let _ = registry.register(PackageSource::new("nuget.org", url));
        }
        registry
    }

    /// Load the registry from a JSON file. A missing file yields an
    /// empty registry rather than an error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no source registry file");
                return Ok(Self::new());
            }
            Err(e) => return Err(ConfigError::io(path, &e)),
        };
        serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Persist the registry as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, &e))?;
        }
        let contents =
            serde_json::to_string_pretty(self).expect("source registry serializes to JSON");
        std::fs::write(path, contents).map_err(|e| ConfigError::io(path, &e))
    }

    /// Register a new source.
    pub fn register(&mut self, source: PackageSource) -> Result<()> {
        if self.find(&source.name).is_some() {
            return Err(ConfigError::DuplicateSource(source.name));
        }
        debug!(name = %source.name, location = %source.location, "registering source");
        self.sources.push(source);
        Ok(())
    }

    /// Remove a source by name.
    pub fn unregister(&mut self, name: &str) -> Result<PackageSource> {
        let idx = self
            .position(name)
            .ok_or_else(|| ConfigError::UnknownSource(name.to_string()))?;
        Ok(self.sources.remove(idx))
    }

    /// Update an existing source's location and/or protocol version.
    pub fn set(
        &mut self,
        name: &str,
        location: Option<Url>,
        protocol_version: Option<ProtocolVersion>,
    ) -> Result<&PackageSource> {
        let idx = self
            .position(name)
            .ok_or_else(|| ConfigError::UnknownSource(name.to_string()))?;
        let source = &mut self.sources[idx];
        if let Some(location) = location {
            source.location = location;
        }
        if let Some(protocol_version) = protocol_version {
            source.protocol_version = protocol_version;
        }
        Ok(&self.sources[idx])
    }

    /// Enable or disable a source.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<()> {
        let idx = self
            .position(name)
            .ok_or_else(|| ConfigError::UnknownSource(name.to_string()))?;
        self.sources[idx].enabled = enabled;
        Ok(())
    }

    /// Look up a source by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&PackageSource> {
        self.position(name).map(|i| &self.sources[i])
    }

    /// All sources, in registration order.
    #[must_use]
    pub fn all(&self) -> &[PackageSource] {
        &self.sources
    }

    /// Enabled sources, optionally filtered to a set of names.
    ///
    /// An explicit filter naming only unknown sources yields an empty
    /// slice; the caller decides whether that is an error.
    #[must_use]
    pub fn enabled(&self, filter: Option<&[String]>) -> Vec<&PackageSource> {
        self.sources
            .iter()
            .filter(|s| s.enabled)
            .filter(|s| match filter {
                Some(names) => names.iter().any(|n| n.eq_ignore_ascii_case(&s.name)),
                None => true,
            })
            .collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.sources
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
    }
}
