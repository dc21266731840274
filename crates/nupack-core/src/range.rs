//! Version range predicates in NuGet bracket notation.
//!
//! A range has an optional minimum bound (inclusive or exclusive) and an
//! optional maximum bound. The plain form `1.2.3` means "at least 1.2.3",
//! `[1.2.3]` pins an exact version, and the bracket forms `[1.0,2.0)`,
//! `(,2.0]`, `(1.0,)` express half-open intervals.

use crate::version::PackageVersion;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One end of a version range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bound {
    /// The boundary version.
    pub version: PackageVersion,
    /// Whether the boundary version itself satisfies the range.
    pub inclusive: bool,
}

impl Bound {
    /// An inclusive bound at `version`.
    #[must_use]
    pub const fn inclusive(version: PackageVersion) -> Self {
        Self {
            version,
            inclusive: true,
        }
    }

    /// An exclusive bound at `version`.
    #[must_use]
    pub const fn exclusive(version: PackageVersion) -> Self {
        Self {
            version,
            inclusive: false,
        }
    }
}

/// A predicate over versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VersionRange {
    /// Lower bound, `None` for unbounded below.
    pub min: Option<Bound>,
    /// Upper bound, `None` for unbounded above.
    pub max: Option<Bound>,
}

impl VersionRange {
    /// The range matching every version.
    #[must_use]
    pub const fn any() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    /// A range matching exactly one version.
    #[must_use]
    pub fn exact(version: PackageVersion) -> Self {
        Self {
            min: Some(Bound::inclusive(version.clone())),
            max: Some(Bound::inclusive(version)),
        }
    }

    /// A range matching `version` and anything newer.
    #[must_use]
    pub const fn at_least(version: PackageVersion) -> Self {
        Self {
            min: Some(Bound {
                version,
                inclusive: true,
            }),
            max: None,
        }
    }

    /// Parse NuGet range notation.
    ///
    /// `""` and `"*"` match everything; a bare version is an inclusive
    /// minimum; `[v]` is exact; `[a,b]`, `(a,b)`, and the half-open
    /// mixes follow interval notation with either side omissible.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() || input == "*" {
            return Some(Self::any());
        }

        let open = input.starts_with('[') || input.starts_with('(');
        let close = input.ends_with(']') || input.ends_with(')');
        if !open && !close {
            // Bare version: inclusive minimum, unbounded above.
            return PackageVersion::parse(input).map(Self::at_least);
        }
        if !(open && close) || input.len() < 2 {
            return None;
        }

        let min_inclusive = input.starts_with('[');
        let max_inclusive = input.ends_with(']');
        let inner = &input[1..input.len() - 1];

        if !inner.contains(',') {
            // [1.2.3] pins the exact version; (1.2.3) matches nothing valid.
            if !(min_inclusive && max_inclusive) {
                return None;
            }
            return PackageVersion::parse(inner).map(Self::exact);
        }

        let (lo, hi) = inner.split_once(',')?;
        let lo = lo.trim();
        let hi = hi.trim();
        let min = if lo.is_empty() {
            None
        } else {
            Some(Bound {
                version: PackageVersion::parse(lo)?,
                inclusive: min_inclusive,
            })
        };
        let max = if hi.is_empty() {
            None
        } else {
            Some(Bound {
                version: PackageVersion::parse(hi)?,
                inclusive: max_inclusive,
            })
        };

        // An empty interval like [2.0,1.0] is a parse-time error.
        if let (Some(min), Some(max)) = (&min, &max) {
            if min.version > max.version {
                return None;
            }
        }

        Some(Self { min, max })
    }

    /// Containment test.
    #[must_use]
    pub fn contains(&self, version: &PackageVersion) -> bool {
        if let Some(min) = &self.min {
            match version.cmp(&min.version) {
                std::cmp::Ordering::Less => return false,
                std::cmp::Ordering::Equal if !min.inclusive => return false,
                _ => {}
            }
        }
        if let Some(max) = &self.max {
            match version.cmp(&max.version) {
                std::cmp::Ordering::Greater => return false,
                std::cmp::Ordering::Equal if !max.inclusive => return false,
                _ => {}
            }
        }
        true
    }

    /// The representative minimum-satisfying version.
    ///
    /// This is the minimum bound's version even when that bound is
    /// exclusive: graph traversal recurses into the boundary version as a
    /// conservative approximation rather than enumerating the range.
    #[must_use]
    pub fn minimum(&self) -> Option<&PackageVersion> {
        self.min.as_ref().map(|b| &b.version)
    }

    /// Whether this range pins exactly one version.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        match (&self.min, &self.max) {
            (Some(min), Some(max)) => {
                min.inclusive && max.inclusive && min.version == max.version
            }
            _ => false,
        }
    }

    /// Whether this range matches every version.
    #[must_use]
    pub const fn is_any(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.min, &self.max) {
            (None, None) => write!(f, "*"),
            (Some(min), None) if min.inclusive => write!(f, "{}", min.version),
            (min, max) => {
                write!(
                    f,
                    "{}",
                    if min.as_ref().is_some_and(|b| b.inclusive) {
                        '['
                    } else {
                        '('
                    }
                )?;
                if let Some(min) = min {
                    write!(f, "{}", min.version)?;
                }
                write!(f, ",")?;
                if let Some(max) = max {
                    write!(f, "{}", max.version)?;
                }
                write!(
                    f,
                    "{}",
                    if max.as_ref().is_some_and(|b| b.inclusive) {
                        ']'
                    } else {
                        ')'
                    }
                )
            }
        }
    }
}

impl FromStr for VersionRange {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| RangeParseError(s.to_string()))
    }
}

/// Error when parsing an invalid range string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid version range: {0}")]
pub struct RangeParseError(pub String);

impl Serialize for VersionRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid range: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn v(s: &str) -> PackageVersion {
        PackageVersion::parse(s).unwrap()
    }

    fn r(s: &str) -> VersionRange {
        VersionRange::parse(s).unwrap()
    }

    #[test]
    fn bare_version_is_inclusive_minimum() {
        let range = r("1.2.3");
        assert!(range.contains(&v("1.2.3")));
        assert!(range.contains(&v("9.0.0")));
        assert!(!range.contains(&v("1.2.2")));
    }

    #[test]
    fn exact_pin() {
        let range = r("[1.2.3]");
        assert!(range.is_exact());
        assert!(range.contains(&v("1.2.3")));
        assert!(!range.contains(&v("1.2.4")));
    }

    #[test]
    fn half_open_interval() {
        let range = r("[1.0,2.0)");
        assert!(range.contains(&v("1.0.0")));
        assert!(range.contains(&v("1.9.9")));
        assert!(!range.contains(&v("2.0.0")));
        assert!(!range.contains(&v("0.9.0")));
    }

    #[test]
    fn exclusive_minimum() {
        let range = r("(1.0,)");
        assert!(!range.contains(&v("1.0.0")));
        assert!(range.contains(&v("1.0.1")));
        // The representative minimum is still the excluded boundary.
        assert_eq!(range.minimum(), Some(&v("1.0.0")));
    }

    #[test]
    fn unbounded_below() {
        let range = r("(,2.0]");
        assert!(range.contains(&v("0.1.0")));
        assert!(range.contains(&v("2.0.0")));
        assert!(!range.contains(&v("2.0.1")));
        assert_eq!(range.minimum(), None);
    }

    #[test]
    fn wildcard_matches_everything() {
        assert!(r("*").contains(&v("0.0.1")));
        assert!(VersionRange::parse("").unwrap().is_any());
    }

    #[test]
    fn rejects_malformed() {
        assert!(VersionRange::parse("[1.0").is_none());
        assert!(VersionRange::parse("(1.0)").is_none());
        assert!(VersionRange::parse("[2.0,1.0]").is_none());
        assert!(VersionRange::parse("[a,b]").is_none());
    }

    #[test]
    fn display_round_trips() {
        for s in ["*", "1.2.3", "[1.2.3,1.2.3]", "[1.0.0,2.0.0)", "(1.0.0,)", "(,2.0.0]"] {
            let range = r(s);
            assert_eq!(VersionRange::parse(&range.to_string()).unwrap(), range);
        }
    }
}
