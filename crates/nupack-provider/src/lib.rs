//! The host-facing surface of nupack.
//!
//! A [`Provider`] wraps one settings snapshot and exposes the operations
//! a host command surface calls: [`Provider::install_or_save`],
//! [`Provider::search`], [`Provider::find_package`] and the source
//! registry CRUD. Components are wired per operation: catalog set from
//! the enabled sources, graph builder and resolver over it, installer
//! below, all sharing one cancellation token.

mod adapters;
mod operations;
mod outcome;
mod request;

pub use operations::{FoundPackage, Provider, SearchResults};
pub use outcome::{InstallOutcome, InstallReport, OutcomeKind};
pub use request::{InstallOptions, InstallRequest, SourceOptions};

// Re-exports so hosts need only this crate for the common path.
pub use nupack_config::{PackageSource, ProtocolVersion, Settings, SourceRegistry};
pub use nupack_core::{
    Error, PackageIdentity, PackageName, PackageVersion, Result, TargetFramework, VersionRange,
};
pub use nupack_install::{DestinationMode, InstalledPackageRecord};
pub use nupack_resolver::ResolutionPolicy;
