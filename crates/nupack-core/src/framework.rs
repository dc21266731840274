//! Target framework monikers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A target framework moniker such as `net8.0` or `netstandard2.0`.
///
/// Monikers are opaque to the resolver: dependency groups in package
/// metadata are keyed by moniker and matched by normalized equality, with
/// the `any` framework acting as the fallback group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetFramework(Arc<str>);

impl TargetFramework {
    /// The framework-agnostic moniker.
    pub const ANY: &'static str = "any";

    /// Create a moniker, normalizing to lowercase.
    #[must_use]
    pub fn new(moniker: impl AsRef<str>) -> Self {
        let moniker = moniker.as_ref().trim().to_ascii_lowercase();
        if moniker.is_empty() {
            return Self::any();
        }
        Self(Arc::from(moniker))
    }

    /// The framework-agnostic framework.
    #[must_use]
    pub fn any() -> Self {
        Self(Arc::from(Self::ANY))
    }

    /// The normalized moniker.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the framework-agnostic moniker.
    #[must_use]
    pub fn is_any(&self) -> bool {
        &*self.0 == Self::ANY
    }
}

impl Default for TargetFramework {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Display for TargetFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TargetFramework {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(TargetFramework::new(" Net8.0 ").as_str(), "net8.0");
    }

    #[test]
    fn empty_becomes_any() {
        assert!(TargetFramework::new("").is_any());
        assert!(TargetFramework::default().is_any());
    }
}
