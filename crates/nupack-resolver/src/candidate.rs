//! Candidates discovered during graph building.

use crate::source::SourceFault;
use nupack_core::{AHashMap, PackageIdentity, PackageName, VersionRange};
use std::fmt;

/// A dependency declaration between two packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    /// The package declaring the dependency.
    pub from: PackageIdentity,
    /// The required package name.
    pub name: PackageName,
    /// The required version range.
    pub range: VersionRange,
}

impl fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} requires {} {}", self.from, self.name, self.range)
    }
}

/// A discovered (package, version) with everything needed to install it.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The candidate identity.
    pub identity: PackageIdentity,
    /// Name of the source that provided the metadata; downloads go back
    /// to the same source.
    pub source: String,
    /// Whether the version is listed for discovery.
    pub listed: bool,
    /// Package description.
    pub description: Option<String>,
    /// Outgoing dependency edges.
    pub edges: Vec<DependencyEdge>,
}

/// The set of all candidates reachable from the root.
///
/// Invariant: every entry was returned by a real source query — there
/// are no speculative entries. Identities that were requested but that
/// no source could provide are tracked separately in `missing`.
#[derive(Debug, Default)]
pub struct CandidateSet {
    by_identity: AHashMap<String, Candidate>,
    by_name: AHashMap<String, Vec<String>>,
    missing: Vec<PackageIdentity>,
    faults: Vec<SourceFault>,
}

impl CandidateSet {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a candidate. The first insertion for an identity wins;
    /// re-insertion is a no-op, keeping the merge idempotent.
    pub fn insert(&mut self, candidate: Candidate) {
        let key = candidate.identity.key();
        if self.by_identity.contains_key(&key) {
            return;
        }
        self.by_name
            .entry(candidate.identity.name.normalized().to_string())
            .or_default()
            .push(key.clone());
        self.by_identity.insert(key, candidate);
    }

    /// Record an identity no enabled source could provide.
    pub fn record_missing(&mut self, identity: PackageIdentity) {
        self.missing.push(identity);
    }

    /// Record a per-source failure.
    pub fn record_fault(&mut self, fault: SourceFault) {
        self.faults.push(fault);
    }

    /// Look up a candidate by identity.
    #[must_use]
    pub fn get(&self, identity: &PackageIdentity) -> Option<&Candidate> {
        self.by_identity.get(&identity.key())
    }

    /// All candidate versions of a name, unordered.
    #[must_use]
    pub fn candidates_for(&self, name: &PackageName) -> Vec<&Candidate> {
        self.by_name
            .get(name.normalized())
            .map(|keys| {
                keys.iter()
                    .filter_map(|k| self.by_identity.get(k))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_identity.len()
    }

    /// Whether the set holds no candidates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_identity.is_empty()
    }

    /// Number of distinct package names.
    #[must_use]
    pub fn name_count(&self) -> usize {
        self.by_name.len()
    }

    /// Identities requested during traversal that no source provided.
    #[must_use]
    pub fn missing(&self) -> &[PackageIdentity] {
        &self.missing
    }

    /// Per-source failures accumulated during traversal.
    #[must_use]
    pub fn faults(&self) -> &[SourceFault] {
        &self.faults
    }

    /// Iterate over all candidates.
    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.by_identity.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nupack_core::{PackageName, PackageVersion};

    fn candidate(name: &str, version: &str) -> Candidate {
        Candidate {
            identity: PackageIdentity::new(
                PackageName::parse(name).unwrap(),
                PackageVersion::parse(version).unwrap(),
            ),
            source: "test".into(),
            listed: true,
            description: None,
            edges: Vec::new(),
        }
    }

    #[test]
    fn first_insertion_wins() {
        let mut set = CandidateSet::new();
        let mut first = candidate("pkg", "1.0.0");
        first.source = "primary".into();
        let mut second = candidate("pkg", "1.0.0");
        second.source = "mirror".into();

        set.insert(first);
        set.insert(second);

        assert_eq!(set.len(), 1);
        let name = PackageName::parse("pkg").unwrap();
        assert_eq!(set.candidates_for(&name)[0].source, "primary");
    }

    #[test]
    fn candidates_grouped_by_normalized_name() {
        let mut set = CandidateSet::new();
        set.insert(candidate("Pkg", "1.0.0"));
        set.insert(candidate("pkg", "2.0.0"));

        let name = PackageName::parse("PKG").unwrap();
        assert_eq!(set.candidates_for(&name).len(), 2);
        assert_eq!(set.name_count(), 1);
    }
}
