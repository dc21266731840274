//! The durable record of an installed package.

use crate::error::{InstallError, Result};
use chrono::{DateTime, Utc};
use nupack_core::PackageIdentity;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the install record inside a package directory. Presence
/// of this file is what "already installed" means.
pub const RECORD_FILE: &str = ".nupack-record.json";

/// Written once after an extraction fully completes; never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledPackageRecord {
    /// The installed package.
    pub identity: PackageIdentity,
    /// Name of the source the artifact came from.
    pub source: String,
    /// Directory the content was extracted into.
    pub install_path: PathBuf,
    /// Number of files extracted.
    pub file_count: usize,
    /// SHA-256 of the downloaded artifact, lowercase hex.
    pub content_hash: String,
    /// When the extraction completed.
    pub installed_at: DateTime<Utc>,
}

impl InstalledPackageRecord {
    /// Read a record from a package directory. `Ok(None)` when the
    /// directory holds no record.
    pub fn load(package_dir: &Path) -> Result<Option<Self>> {
        let path = package_dir.join(RECORD_FILE);
        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(InstallError::io(&path, &e)),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| InstallError::Io {
                path,
                message: format!("corrupt install record: {e}"),
            })
    }

    /// Write the record into a package directory.
    pub fn save(&self, package_dir: &Path) -> Result<()> {
        let path = package_dir.join(RECORD_FILE);
        let contents = serde_json::to_string_pretty(self).expect("record serializes to JSON");
        std::fs::write(&path, contents).map_err(|e| InstallError::io(&path, &e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nupack_core::{PackageName, PackageVersion};

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let record = InstalledPackageRecord {
            identity: PackageIdentity::new(
                PackageName::parse("pkg").unwrap(),
                PackageVersion::new(1, 2, 3),
            ),
            source: "nuget.org".into(),
            install_path: dir.path().to_path_buf(),
            file_count: 7,
            content_hash: "ab".repeat(32),
            installed_at: Utc::now(),
        };

        record.save(dir.path()).unwrap();
        let loaded = InstalledPackageRecord::load(dir.path()).unwrap().unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn missing_record_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(InstalledPackageRecord::load(dir.path()).unwrap().is_none());
    }
}
