//! Version selection over a candidate set.
//!
//! For every package name reachable from the root, pick exactly one
//! candidate version such that every dependency edge out of a selected
//! candidate is satisfied. Selection is a bounded fixpoint: constraints
//! are re-aggregated from the current selection until it stops changing.
//! There is no backtracking — an unsatisfiable aggregate fails the run,
//! naming the edges in conflict.

use crate::candidate::{Candidate, CandidateSet, DependencyEdge};
use crate::error::{ResolveError, Result};
use nupack_core::{PackageIdentity, PackageName};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::{debug, trace};

/// Which satisfying version to prefer for every package in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionPolicy {
    /// Prefer the smallest satisfying version (minimizes churn). The
    /// default dependency behavior.
    #[default]
    Lowest,
    /// Prefer the newest satisfying version.
    Highest,
}

/// The committed selection: one identity per package name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSet {
    /// Normalized name -> chosen identity, in name order.
    selected: BTreeMap<String, PackageIdentity>,
    /// Normalized root name.
    root: String,
}

impl ResolvedSet {
    /// The chosen identity for a name, if the name was resolved.
    #[must_use]
    pub fn get(&self, name: &PackageName) -> Option<&PackageIdentity> {
        self.selected.get(name.normalized())
    }

    /// The root identity.
    #[must_use]
    pub fn root(&self) -> &PackageIdentity {
        &self.selected[&self.root]
    }

    /// Whether `identity` is the originally requested package rather
    /// than a pulled-in dependency.
    #[must_use]
    pub fn is_root(&self, identity: &PackageIdentity) -> bool {
        self.root() == identity
    }

    /// Number of resolved packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Whether nothing was resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Iterate over the chosen identities in name order.
    pub fn iter(&self) -> impl Iterator<Item = &PackageIdentity> {
        self.selected.values()
    }
}

/// Resolve one version per reachable name.
///
/// The root identity is pinned: the caller asked for exactly that
/// package, so an edge contradicting the pin is a conflict, not a reason
/// to move the root.
pub fn resolve(
    candidates: &CandidateSet,
    root: &PackageIdentity,
    policy: ResolutionPolicy,
) -> Result<ResolvedSet> {
    if candidates.get(root).is_none() {
        return Err(ResolveError::RootNotFound {
            name: root.name.to_string(),
        });
    }

    let root_key = root.name.normalized().to_string();
    let mut selected: BTreeMap<String, PackageIdentity> = BTreeMap::new();
    selected.insert(root_key.clone(), root.clone());

    // One extra iteration gives a fresh selection the chance to prove it
    // is already a fixpoint.
    let bound = candidates.name_count() + 2;
    let mut last_changed = root_key.clone();

    for iteration in 0..bound {
        let reachable = reachable_names(candidates, &selected, &root_key);
        let constraints = gather_constraints(candidates, &selected, &reachable);

        let mut next: BTreeMap<String, PackageIdentity> = BTreeMap::new();
        next.insert(root_key.clone(), root.clone());

        for name in &reachable {
            if *name == root_key {
                // The pin still has to satisfy its incoming edges.
                if let Some(edges) = constraints.get(name) {
                    if let Some(conflict) =
                        edges.iter().find(|e| !e.range.contains(&root.version))
                    {
                        trace!(edge = %conflict, "edge conflicts with pinned root");
                        return Err(unsatisfiable(name, &constraints));
                    }
                }
                continue;
            }

            let chosen = select_version(candidates, name, constraints.get(name), policy)
                .ok_or_else(|| unsatisfiable(name, &constraints))?;
            next.insert(name.clone(), chosen);
        }

        if next == selected {
            debug!(
                packages = selected.len(),
                iterations = iteration + 1,
                "resolution converged"
            );
            return Ok(ResolvedSet {
                selected,
                root: root_key,
            });
        }

        if let Some(name) = first_difference(&selected, &next) {
            last_changed = name;
        }
        selected = next;
    }

    Err(ResolveError::NoFixpoint { name: last_changed })
}

/// Names reachable from the root through the edges of currently-selected
/// candidates. Names with a selection pending still count as reachable —
/// they get one on the next pass.
fn reachable_names(
    candidates: &CandidateSet,
    selected: &BTreeMap<String, PackageIdentity>,
    root_key: &str,
) -> BTreeSet<String> {
    let mut reachable: BTreeSet<String> = BTreeSet::new();
    let mut queue: VecDeque<String> = VecDeque::new();
    reachable.insert(root_key.to_string());
    queue.push_back(root_key.to_string());

    while let Some(name) = queue.pop_front() {
        let Some(identity) = selected.get(&name) else {
            continue;
        };
        let Some(candidate) = candidates.get(identity) else {
            continue;
        };
        for edge in &candidate.edges {
            let dep = edge.name.normalized().to_string();
            if reachable.insert(dep.clone()) {
                queue.push_back(dep);
            }
        }
    }
    reachable
}

/// Incoming edges per name, from selected-and-reachable candidates only.
fn gather_constraints<'a>(
    candidates: &'a CandidateSet,
    selected: &BTreeMap<String, PackageIdentity>,
    reachable: &BTreeSet<String>,
) -> BTreeMap<String, Vec<&'a DependencyEdge>> {
    let mut constraints: BTreeMap<String, Vec<&'a DependencyEdge>> = BTreeMap::new();
    for name in reachable {
        let Some(identity) = selected.get(name) else {
            continue;
        };
        let Some(candidate) = candidates.get(identity) else {
            continue;
        };
        for edge in &candidate.edges {
            constraints
                .entry(edge.name.normalized().to_string())
                .or_default()
                .push(edge);
        }
    }
    constraints
}

/// Pick the policy-preferred candidate version satisfying every edge.
fn select_version(
    candidates: &CandidateSet,
    name: &str,
    edges: Option<&Vec<&DependencyEdge>>,
    policy: ResolutionPolicy,
) -> Option<PackageIdentity> {
    let name = PackageName::parse(name)?;
    let mut satisfying: Vec<&Candidate> = candidates
        .candidates_for(&name)
        .into_iter()
        .filter(|c| {
            edges
                .map(|edges| edges.iter().all(|e| e.range.contains(&c.identity.version)))
                .unwrap_or(true)
        })
        .collect();

    satisfying.sort_by(|a, b| a.identity.version.cmp(&b.identity.version));
    let chosen = match policy {
        ResolutionPolicy::Lowest => satisfying.first(),
        ResolutionPolicy::Highest => satisfying.last(),
    };
    chosen.map(|c| c.identity.clone())
}

fn unsatisfiable(
    name: &str,
    constraints: &BTreeMap<String, Vec<&DependencyEdge>>,
) -> ResolveError {
    ResolveError::Unsatisfiable {
        name: name.to_string(),
        edges: constraints
            .get(name)
            .map(|edges| edges.iter().map(|e| (*e).clone()).collect())
            .unwrap_or_default(),
    }
}

fn first_difference(
    old: &BTreeMap<String, PackageIdentity>,
    new: &BTreeMap<String, PackageIdentity>,
) -> Option<String> {
    new.iter()
        .find(|(name, identity)| old.get(*name) != Some(identity))
        .map(|(name, _)| name.clone())
}
