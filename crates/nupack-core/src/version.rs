//! Package version type with a total order.
//!
//! NuGet versions are semver with two extensions: an optional fourth
//! `revision` component (`1.0.0.5`) and case-insensitive pre-release
//! labels. Build metadata is parsed and then ignored for ordering,
//! per the semver rules.

use semver::Prerelease;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A structured, totally-ordered package version.
#[derive(Debug, Clone)]
pub struct PackageVersion {
    /// Major component.
    pub major: u64,
    /// Minor component.
    pub minor: u64,
    /// Patch component.
    pub patch: u64,
    /// Optional fourth component; zero when absent.
    pub revision: u64,
    /// Pre-release label, empty for release versions.
    pre: Prerelease,
}

impl PackageVersion {
    /// Create a release version from its numeric components.
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            revision: 0,
            pre: Prerelease::EMPTY,
        }
    }

    /// Parse a version string.
    ///
    /// Accepts `1`, `1.0`, `1.0.0`, `1.0.0.5`, each optionally followed
    /// by `-label` and/or `+metadata`. Returns `None` on malformed input.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        // Build metadata does not participate in ordering.
        let input = input.split_once('+').map_or(input, |(v, _)| v);

        let (numbers, pre) = match input.split_once('-') {
            Some((n, label)) => {
                let pre = Prerelease::new(&label.to_ascii_lowercase()).ok()?;
                if pre.is_empty() {
                    return None;
                }
                (n, pre)
            }
            None => (input, Prerelease::EMPTY),
        };

        let mut parts = numbers.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parse_part(parts.next())?;
        let patch = parse_part(parts.next())?;
        let revision = parse_part(parts.next())?;
        if parts.next().is_some() {
            return None;
        }

        Some(Self {
            major,
            minor,
            patch,
            revision,
            pre,
        })
    }

    /// Whether this version carries a pre-release label.
    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }

    /// The pre-release label, empty for release versions.
    #[must_use]
    pub fn pre(&self) -> &str {
        self.pre.as_str()
    }
}

fn parse_part(part: Option<&str>) -> Option<u64> {
    match part {
        Some(p) => p.parse().ok(),
        None => Some(0),
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.revision != 0 {
            write!(f, ".{}", self.revision)?;
        }
        if !self.pre.is_empty() {
            write!(f, "-{}", self.pre)?;
        }
        Ok(())
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PackageVersion {}

impl std::hash::Hash for PackageVersion {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.major.hash(state);
        self.minor.hash(state);
        self.patch.hash(state);
        self.revision.hash(state);
        self.pre.as_str().hash(state);
    }
}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let numeric = (self.major, self.minor, self.patch, self.revision).cmp(&(
            other.major,
            other.minor,
            other.patch,
            other.revision,
        ));
        if numeric != Ordering::Equal {
            return numeric;
        }
        // A release outranks any of its pre-releases.
        match (self.pre.is_empty(), other.pre.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.pre.cmp(&other.pre),
        }
    }
}

impl FromStr for PackageVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| VersionParseError(s.to_string()))
    }
}

impl Serialize for PackageVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PackageVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid version: {s}")))
    }
}

/// Error when parsing an invalid version string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid version: {0}")]
pub struct VersionParseError(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn v(s: &str) -> PackageVersion {
        PackageVersion::parse(s).unwrap()
    }

    #[test]
    fn parses_short_forms() {
        assert_eq!(v("1"), PackageVersion::new(1, 0, 0));
        assert_eq!(v("1.2"), v("1.2.0"));
        assert_eq!(v("1.2.3").to_string(), "1.2.3");
    }

    #[test]
    fn parses_four_part_versions() {
        let four = v("1.2.3.4");
        assert_eq!(four.revision, 4);
        assert_eq!(four.to_string(), "1.2.3.4");
        // A zero revision normalizes away
        assert_eq!(v("1.2.3.0").to_string(), "1.2.3");
        assert_eq!(v("1.2.3.0"), v("1.2.3"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(PackageVersion::parse("").is_none());
        assert!(PackageVersion::parse("1.2.3.4.5").is_none());
        assert!(PackageVersion::parse("one.two").is_none());
        assert!(PackageVersion::parse("1.2.3-").is_none());
    }

    #[test]
    fn release_outranks_prerelease() {
        assert!(v("1.0.0") > v("1.0.0-rc.1"));
        assert!(v("1.0.0-alpha") < v("1.0.0-beta"));
        assert!(v("1.0.0-rc.2") > v("1.0.0-rc.1"));
        assert!(v("2.0.0-alpha") > v("1.9.9"));
    }

    #[test]
    fn build_metadata_is_ignored() {
        assert_eq!(v("1.0.0+build.5"), v("1.0.0"));
        assert_eq!(v("1.0.0+build.5").to_string(), "1.0.0");
    }

    #[test]
    fn prerelease_labels_compare_case_insensitively() {
        assert_eq!(v("1.0.0-RC.1"), v("1.0.0-rc.1"));
    }

    #[test]
    fn revision_participates_in_ordering() {
        assert!(v("1.0.0.1") > v("1.0.0"));
        assert!(v("1.0.0.2") < v("1.0.1"));
    }

    #[test]
    fn serde_round_trip() {
        let json = serde_json::to_string(&v("1.2.3-beta.1")).unwrap();
        assert_eq!(json, "\"1.2.3-beta.1\"");
        let back: PackageVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v("1.2.3-beta.1"));
    }
}
