//! Package names and identities.
//!
//! Names are case-insensitive: comparison, hashing and on-disk layout use
//! the lowercase form, while the casing a feed reported is retained for
//! display.

use crate::version::PackageVersion;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

/// A validated, case-insensitive package name.
#[derive(Clone)]
pub struct PackageName {
    /// The name as given (display form).
    raw: Arc<str>,
    /// Lowercase form used for equality, ordering and hashing.
    normalized: Arc<str>,
}

impl PackageName {
    /// Parse a package name.
    ///
    /// Names are non-empty and limited to ASCII alphanumerics plus
    /// `.`, `_` and `-`. Returns `None` otherwise.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() || s.len() > 100 {
            return None;
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return None;
        }

        let normalized = s.to_ascii_lowercase();
        Some(Self {
            raw: Arc::from(s),
            normalized: Arc::from(normalized),
        })
    }

    /// The name as originally written.
    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The lowercase form used for comparisons and store paths.
    #[must_use]
    #[inline]
    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

impl fmt::Debug for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PackageName").field(&self.raw).finish()
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl PartialEq for PackageName {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for PackageName {}

impl Hash for PackageName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized.hash(state);
    }
}

impl PartialOrd for PackageName {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PackageName {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.normalized.cmp(&other.normalized)
    }
}

impl FromStr for PackageName {
    type Err = PackageNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| PackageNameError(s.to_string()))
    }
}

impl Serialize for PackageName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for PackageName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid package name: {s}")))
    }
}

/// Error when parsing an invalid package name.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid package name: {0}")]
pub struct PackageNameError(pub String);

/// A (name, version) pair naming one concrete package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageIdentity {
    /// Package name.
    pub name: PackageName,
    /// Package version.
    pub version: PackageVersion,
}

impl PackageIdentity {
    /// Create an identity from a name and version.
    #[must_use]
    pub const fn new(name: PackageName, version: PackageVersion) -> Self {
        Self { name, version }
    }

    /// The `name/version` key used for visited-set deduplication.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}/{}", self.name.normalized(), self.version)
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn names_compare_case_insensitively() {
        let a = PackageName::parse("Newtonsoft.Json").unwrap();
        let b = PackageName::parse("newtonsoft.json").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.normalized(), "newtonsoft.json");
        assert_eq!(a.as_str(), "Newtonsoft.Json");
    }

    #[test]
    fn rejects_invalid_names() {
        assert!(PackageName::parse("").is_none());
        assert!(PackageName::parse("has space").is_none());
        assert!(PackageName::parse("slash/name").is_none());
        assert!(PackageName::parse(&"x".repeat(101)).is_none());
    }

    #[test]
    fn identity_equality_uses_normalized_name() {
        let v = PackageVersion::new(1, 0, 0);
        let a = PackageIdentity::new(PackageName::parse("Foo").unwrap(), v.clone());
        let b = PackageIdentity::new(PackageName::parse("foo").unwrap(), v);
        assert_eq!(a, b);
        assert_eq!(a.key(), "foo/1.0.0");
    }
}
