//! Idempotent package materialization.
//!
//! Given a resolved set of identities, the installer determines which
//! are already present, downloads and extracts the rest, and reports a
//! per-identity outcome. Installation is append-only: a completed
//! extraction leaves an [`InstalledPackageRecord`] that later runs treat
//! as "already present", and records are only ever created, never
//! updated in place.

pub mod error;
mod extract;
mod fetch;
mod layout;
mod record;
mod installer;

pub use error::{InstallError, Result};
pub use extract::{extract_package, validate_archive, ExtractionSummary};
pub use fetch::ArtifactFetcher;
pub use installer::{
    BatchResult, InstallItem, InstallState, Installer, InstallerConfig, PackageOutcome,
};
pub use layout::{DestinationMode, StoreLayout};
pub use record::{InstalledPackageRecord, RECORD_FILE};
