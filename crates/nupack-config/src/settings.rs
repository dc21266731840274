//! The per-operation settings snapshot.

use crate::error::{ConfigError, Result};
use crate::source::SourceRegistry;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Everything one resolve-and-install operation needs to know about its
/// environment, captured once and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding `sources.json`.
    pub config_dir: PathBuf,
    /// Root of the global package store.
    pub store_root: PathBuf,
    /// The source registry as of snapshot time.
    pub sources: SourceRegistry,
    /// Concurrent metadata queries during graph building.
    pub max_concurrent_fetch: usize,
    /// Concurrent downloads during installation.
    pub max_concurrent_install: usize,
    /// HTTP request timeout.
    pub request_timeout: Duration,
}

impl Settings {
    /// Snapshot settings from the platform config directory.
    ///
    /// `NUPACK_CONFIG` overrides the configuration directory and
    /// `NUPACK_HOME` the package store root.
    pub fn load() -> Result<Self> {
        let config_dir = match std::env::var_os("NUPACK_CONFIG") {
            Some(dir) => PathBuf::from(dir),
            None => directories::ProjectDirs::from("", "", "nupack")
                .ok_or(ConfigError::NoConfigDir)?
                .config_dir()
                .to_path_buf(),
        };
        let store_root = match std::env::var_os("NUPACK_HOME") {
            Some(dir) => PathBuf::from(dir),
            None => directories::ProjectDirs::from("", "", "nupack")
                .ok_or(ConfigError::NoConfigDir)?
                .data_dir()
                .join("packages"),
        };
        Self::from_dirs(config_dir, store_root)
    }

    /// Snapshot settings rooted at explicit directories.
    pub fn from_dirs(config_dir: impl Into<PathBuf>, store_root: impl Into<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.into();
        let store_root = store_root.into();
        let registry_path = Self::registry_path_in(&config_dir);
        let sources = if registry_path.exists() {
            SourceRegistry::load(&registry_path)?
        } else {
            debug!(path = %registry_path.display(), "seeding default sources");
            SourceRegistry::with_defaults()
        };

        Ok(Self {
            config_dir,
            store_root,
            sources,
            max_concurrent_fetch: 16,
            max_concurrent_install: 4,
            request_timeout: Duration::from_secs(30),
        })
    }

    /// Path of the persisted source registry.
    #[must_use]
    pub fn registry_path(&self) -> PathBuf {
        Self::registry_path_in(&self.config_dir)
    }

    fn registry_path_in(config_dir: &Path) -> PathBuf {
        config_dir.join("sources.json")
    }

    /// Persist the snapshot's source registry back to disk.
    pub fn save_sources(&self) -> Result<()> {
        self.sources.save(&self.registry_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_dirs_seed_default_sources() {
        let dir = tempfile::tempdir().unwrap();
        let settings =
            Settings::from_dirs(dir.path().join("config"), dir.path().join("store")).unwrap();
        assert!(settings.sources.find("nuget.org").is_some());
    }

    #[test]
    fn saved_registry_is_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config");

        let mut settings = Settings::from_dirs(&config, dir.path().join("store")).unwrap();
        settings.sources.set_enabled("nuget.org", false).unwrap();
        settings.save_sources().unwrap();

        let reloaded = Settings::from_dirs(&config, dir.path().join("store")).unwrap();
        let source = reloaded.sources.find("nuget.org").unwrap();
        assert!(!source.enabled);
    }
}
