//! Destination layout and the already-installed check.

use crate::error::{InstallError, Result};
use crate::record::{InstalledPackageRecord, RECORD_FILE};
use nupack_core::PackageIdentity;
use std::path::{Path, PathBuf};

/// Where extraction writes and how "already installed" is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationMode {
    /// The per-user shared package store: `<root>/<name>/<version>/`.
    GlobalStore,
    /// A caller-specified directory: `<dir>/<name>.<version>/`.
    Directory(PathBuf),
}

/// Resolves identities to on-disk paths under a destination mode.
#[derive(Debug, Clone)]
pub struct StoreLayout {
    store_root: PathBuf,
}

impl StoreLayout {
    /// Create a layout over the global store root.
    #[must_use]
    pub fn new(store_root: impl Into<PathBuf>) -> Self {
        Self {
            store_root: store_root.into(),
        }
    }

    /// The directory a package extracts into.
    #[must_use]
    pub fn package_dir(&self, mode: &DestinationMode, identity: &PackageIdentity) -> PathBuf {
        match mode {
            DestinationMode::GlobalStore => self
                .store_root
                .join(identity.name.normalized())
                .join(identity.version.to_string()),
            DestinationMode::Directory(dir) => dir.join(format!(
                "{}.{}",
                identity.name.normalized(),
                identity.version
            )),
        }
    }

    /// Whether the identity is already materialized under `mode`.
    ///
    /// Presence means a completed extraction: only the final record file
    /// counts, so a crashed or cancelled install never reads as present.
    #[must_use]
    pub fn is_installed(&self, mode: &DestinationMode, identity: &PackageIdentity) -> bool {
        self.package_dir(mode, identity).join(RECORD_FILE).is_file()
    }

    /// Read the record of an installed identity, if present.
    pub fn record(
        &self,
        mode: &DestinationMode,
        identity: &PackageIdentity,
    ) -> Result<Option<InstalledPackageRecord>> {
        InstalledPackageRecord::load(&self.package_dir(mode, identity))
    }

    /// Enumerate every completed install under `mode`.
    pub fn enumerate_installed(
        &self,
        mode: &DestinationMode,
    ) -> Result<Vec<InstalledPackageRecord>> {
        let mut records = Vec::new();
        match mode {
            DestinationMode::GlobalStore => {
                for name_dir in read_dirs(&self.store_root)? {
                    for version_dir in read_dirs(&name_dir)? {
                        if let Some(record) = InstalledPackageRecord::load(&version_dir)? {
                            records.push(record);
                        }
                    }
                }
            }
            DestinationMode::Directory(dir) => {
                for package_dir in read_dirs(dir)? {
                    if let Some(record) = InstalledPackageRecord::load(&package_dir)? {
                        records.push(record);
                    }
                }
            }
        }
        records.sort_by(|a, b| a.identity.key().cmp(&b.identity.key()));
        Ok(records)
    }
}

/// Subdirectories of `path`; a missing directory is an empty store.
fn read_dirs(path: &Path) -> Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(InstallError::io(path, &e)),
    };
    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| InstallError::io(path, &e))?;
        if entry.path().is_dir() {
            dirs.push(entry.path());
        }
    }
    Ok(dirs)
}
