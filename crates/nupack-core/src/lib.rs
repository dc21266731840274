//! Core types for the nupack package provider.
//!
//! This crate provides the vocabulary shared by every other nupack crate:
//! - Package names (case-insensitive) and identities
//! - Versions with a total order and NuGet-style range predicates
//! - Target framework monikers
//! - The shared error type

pub mod error;
mod framework;
mod identity;
mod range;
mod version;

pub use error::{Error, Result};
pub use framework::TargetFramework;
pub use identity::{PackageIdentity, PackageName, PackageNameError};
pub use range::{Bound, RangeParseError, VersionRange};
pub use version::{PackageVersion, VersionParseError};

// Re-export commonly used collection types
pub use ahash::{AHashMap, AHashSet};
