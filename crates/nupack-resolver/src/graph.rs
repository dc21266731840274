//! Dependency graph discovery.
//!
//! A worklist traversal with a memoized visited set: identities fan out
//! concurrently through `FuturesUnordered`, each one asking the enabled
//! sources in registry order and keeping the first non-empty answer.
//! Cycles terminate because an identity is only ever visited once.

use crate::candidate::{Candidate, CandidateSet, DependencyEdge};
use crate::error::{ResolveError, Result};
use crate::source::{MetadataSource, PackageInfo, SourceFault};
use dashmap::DashSet;
use futures::stream::{FuturesUnordered, StreamExt};
use nupack_core::{PackageIdentity, PackageName, TargetFramework, VersionRange};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Graph builder configuration.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Target framework used to narrow dependency groups.
    pub framework: TargetFramework,
    /// Concurrent in-flight metadata queries.
    pub max_concurrent: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            framework: TargetFramework::any(),
            max_concurrent: 16,
        }
    }
}

/// Builds the candidate set reachable from a root identity.
pub struct GraphBuilder {
    sources: Vec<Arc<dyn MetadataSource>>,
    config: GraphConfig,
}

impl std::fmt::Debug for GraphBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphBuilder")
            .field("sources", &self.sources.len())
            .field("config", &self.config)
            .finish()
    }
}

/// One unit of traversal work.
enum WorkItem {
    /// Fetch metadata for an exact identity.
    Visit(PackageIdentity),
    /// Find a concrete version for a range with no minimum bound, then
    /// visit it.
    Pin {
        name: PackageName,
        range: VersionRange,
    },
}

/// Completed traversal work.
enum Fetched {
    Visited {
        identity: PackageIdentity,
        info: Option<PackageInfo>,
        faults: Vec<SourceFault>,
    },
    Pinned {
        name: PackageName,
        identity: Option<PackageIdentity>,
        faults: Vec<SourceFault>,
    },
}

impl GraphBuilder {
    /// Create a builder over the enabled sources, in registry order.
    #[must_use]
    pub fn new(sources: Vec<Arc<dyn MetadataSource>>, config: GraphConfig) -> Self {
        Self { sources, config }
    }

    /// Traverse the dependency graph starting from `root`.
    ///
    /// Always returns a candidate set on success — possibly one that does
    /// not contain the root, which [`crate::resolve`] reports as
    /// `RootNotFound`. The only error out of the traversal itself is
    /// cancellation.
    pub async fn build(
        &self,
        root: PackageIdentity,
        cancel: &CancellationToken,
    ) -> Result<CandidateSet> {
        let visited: DashSet<String> = DashSet::new();
        let pinned: DashSet<String> = DashSet::new();
        let mut candidates = CandidateSet::new();

        visited.insert(root.key());
        let mut pending: Vec<WorkItem> = vec![WorkItem::Visit(root.clone())];
        let mut in_flight = FuturesUnordered::new();
        let mut fetched_count = 0usize;

        loop {
            while in_flight.len() < self.config.max_concurrent && !pending.is_empty() {
                let item = pending.pop().expect("pending is non-empty");
                let sources = self.sources.clone();
                let framework = self.config.framework.clone();
                let cancel = cancel.clone();

                in_flight.push(async move {
                    tokio::select! {
                        () = cancel.cancelled() => None,
                        fetched = fetch_item(sources, item, framework) => Some(fetched),
                    }
                });
            }

            // Done when nothing is in flight and nothing is pending.
            if in_flight.is_empty() {
                break;
            }

            let Some(completed) = in_flight.next().await else {
                break;
            };
            let Some(fetched) = completed else {
                return Err(ResolveError::Cancelled);
            };

            fetched_count += 1;
            match fetched {
                Fetched::Visited {
                    identity,
                    info,
                    faults,
                } => {
                    for fault in faults {
                        candidates.record_fault(fault);
                    }
                    match info {
                        Some(info) => {
                            self.enqueue_dependencies(
                                &info, &visited, &pinned, &mut pending,
                            );
                            candidates.insert(candidate_from(info));
                        }
                        None => {
                            debug!(%identity, "no source carries this identity");
                            candidates.record_missing(identity);
                        }
                    }
                }
                Fetched::Pinned {
                    name,
                    identity,
                    faults,
                } => {
                    for fault in faults {
                        candidates.record_fault(fault);
                    }
                    match identity {
                        Some(identity) => {
                            if visited.insert(identity.key()) {
                                pending.push(WorkItem::Visit(identity));
                            }
                        }
                        None => {
                            warn!(%name, "no pinnable version for unbounded range");
                        }
                    }
                }
            }

            if fetched_count % 50 == 0 {
                info!(
                    fetched = fetched_count,
                    in_flight = in_flight.len(),
                    pending = pending.len(),
                    "graph build progress"
                );
            }
        }

        info!(
            candidates = candidates.len(),
            names = candidates.name_count(),
            missing = candidates.missing().len(),
            faults = candidates.faults().len(),
            "graph build complete"
        );
        Ok(candidates)
    }

    /// Queue each dependency edge's representative version.
    ///
    /// The representative is the range's minimum bound even when that
    /// bound is exclusive; ranges with no minimum go through a pin step
    /// that asks the sources for the lowest satisfying version.
    fn enqueue_dependencies(
        &self,
        info: &PackageInfo,
        visited: &DashSet<String>,
        pinned: &DashSet<String>,
        pending: &mut Vec<WorkItem>,
    ) {
        for dep in &info.dependencies {
            match dep.range.minimum() {
                Some(min) => {
                    let next = PackageIdentity::new(dep.name.clone(), min.clone());
                    if visited.insert(next.key()) {
                        pending.push(WorkItem::Visit(next));
                    }
                }
                None => {
                    let key = format!("{}/{}", dep.name.normalized(), dep.range);
                    if pinned.insert(key) {
                        pending.push(WorkItem::Pin {
                            name: dep.name.clone(),
                            range: dep.range.clone(),
                        });
                    }
                }
            }
        }
    }
}

fn candidate_from(info: PackageInfo) -> Candidate {
    let edges = info
        .dependencies
        .iter()
        .map(|dep| DependencyEdge {
            from: info.identity.clone(),
            name: dep.name.clone(),
            range: dep.range.clone(),
        })
        .collect();
    Candidate {
        identity: info.identity,
        source: info.source,
        listed: info.listed,
        description: info.description,
        edges,
    }
}

/// Ask the sources, in order, to complete one work item.
async fn fetch_item(
    sources: Vec<Arc<dyn MetadataSource>>,
    item: WorkItem,
    framework: TargetFramework,
) -> Fetched {
    match item {
        WorkItem::Visit(identity) => {
            let mut faults = Vec::new();
            for source in &sources {
                match source.dependency_info(&identity, &framework).await {
                    Ok(Some(info)) => {
                        return Fetched::Visited {
                            identity,
                            info: Some(info),
                            faults,
                        }
                    }
                    Ok(None) => {}
                    Err(fault) => faults.push(fault),
                }
            }
            Fetched::Visited {
                identity,
                info: None,
                faults,
            }
        }
        WorkItem::Pin { name, range } => {
            let mut faults = Vec::new();
            for source in &sources {
                match source.versions(&name).await {
                    Ok(Some(versions)) if !versions.is_empty() => {
                        // Versions arrive ascending; the first satisfying
                        // one is the lowest.
                        let identity = versions
                            .iter()
                            .find(|v| range.contains(v))
                            .map(|v| PackageIdentity::new(name.clone(), v.clone()));
                        return Fetched::Pinned {
                            name,
                            identity,
                            faults,
                        };
                    }
                    Ok(_) => {}
                    Err(fault) => faults.push(fault),
                }
            }
            Fetched::Pinned {
                name,
                identity: None,
                faults,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::DependencyRequest;
    use async_trait::async_trait;
    use nupack_core::{AHashMap, PackageVersion};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory metadata source for traversal tests.
    struct StubSource {
        name: String,
        packages: AHashMap<String, PackageInfo>,
        versions: AHashMap<String, Vec<PackageVersion>>,
        queries: AtomicUsize,
        fail: bool,
    }

    impl StubSource {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                packages: AHashMap::new(),
                versions: AHashMap::new(),
                queries: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing(name: &str) -> Self {
            let mut stub = Self::new(name);
            stub.fail = true;
            stub
        }

        fn with_package(mut self, name: &str, version: &str, deps: &[(&str, &str)]) -> Self {
            let identity = identity(name, version);
            let dependencies = deps
                .iter()
                .map(|(dep_name, range)| DependencyRequest {
                    name: PackageName::parse(dep_name).unwrap(),
                    range: VersionRange::parse(range).unwrap(),
                })
                .collect();
            let info = PackageInfo {
                identity: identity.clone(),
                source: self.name.clone(),
                listed: true,
                description: None,
                dependencies,
            };
            self.packages.insert(identity.key(), info);
            self.versions
                .entry(identity.name.normalized().to_string())
                .or_default()
                .push(identity.version);
            self
        }
    }

    #[async_trait]
    impl MetadataSource for StubSource {
        fn name(&self) -> &str {
            &self.name
        }

        async fn dependency_info(
            &self,
            identity: &PackageIdentity,
            _framework: &TargetFramework,
        ) -> std::result::Result<Option<PackageInfo>, SourceFault> {
            self.queries.fetch_add(1, Ordering::Relaxed);
            if self.fail {
                return Err(SourceFault::new(&self.name, "connection refused"));
            }
            let mut info = self.packages.get(&identity.key()).cloned();
            if let Some(info) = &mut info {
                info.source = self.name.clone();
            }
            Ok(info)
        }

        async fn versions(
            &self,
            name: &PackageName,
        ) -> std::result::Result<Option<Vec<PackageVersion>>, SourceFault> {
            if self.fail {
                return Err(SourceFault::new(&self.name, "connection refused"));
            }
            let mut versions = self.versions.get(name.normalized()).cloned();
            if let Some(versions) = &mut versions {
                versions.sort();
            }
            Ok(versions)
        }
    }

    fn identity(name: &str, version: &str) -> PackageIdentity {
        PackageIdentity::new(
            PackageName::parse(name).unwrap(),
            PackageVersion::parse(version).unwrap(),
        )
    }

    async fn build(sources: Vec<Arc<dyn MetadataSource>>, root: PackageIdentity) -> CandidateSet {
        GraphBuilder::new(sources, GraphConfig::default())
            .build(root, &CancellationToken::new())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn cyclic_graph_terminates() {
        let source = StubSource::new("feed")
            .with_package("a", "1.0.0", &[("b", "1.0.0")])
            .with_package("b", "1.0.0", &[("a", "1.0.0")]);

        let set = build(vec![Arc::new(source)], identity("a", "1.0.0")).await;
        assert_eq!(set.len(), 2);
        assert!(set.get(&identity("a", "1.0.0")).is_some());
        assert!(set.get(&identity("b", "1.0.0")).is_some());
    }

    #[tokio::test]
    async fn diamond_visits_shared_dependency_once() {
        let source = StubSource::new("feed")
            .with_package("root", "1.0.0", &[("left", "1.0.0"), ("right", "1.0.0")])
            .with_package("left", "1.0.0", &[("shared", "2.0.0")])
            .with_package("right", "1.0.0", &[("shared", "2.0.0")])
            .with_package("shared", "2.0.0", &[]);
        let source = Arc::new(source);

        let set = build(vec![source.clone()], identity("root", "1.0.0")).await;
        assert_eq!(set.len(), 4);
        // 4 identities, each queried exactly once.
        assert_eq!(source.queries.load(Ordering::Relaxed), 4);
    }

    #[tokio::test]
    async fn first_non_empty_response_wins() {
        let primary = StubSource::new("primary").with_package("a", "1.0.0", &[]);
        let mirror = StubSource::new("mirror").with_package("a", "1.0.0", &[]);

        let set = build(
            vec![Arc::new(primary), Arc::new(mirror)],
            identity("a", "1.0.0"),
        )
        .await;
        assert_eq!(set.get(&identity("a", "1.0.0")).unwrap().source, "primary");
    }

    #[tokio::test]
    async fn failing_source_does_not_abort_others() {
        let broken: Arc<dyn MetadataSource> = Arc::new(StubSource::failing("broken"));
        let good: Arc<dyn MetadataSource> =
            Arc::new(StubSource::new("good").with_package("a", "1.0.0", &[]));

        let set = build(vec![broken, good], identity("a", "1.0.0")).await;
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(&identity("a", "1.0.0")).unwrap().source, "good");
        assert_eq!(set.faults().len(), 1);
        assert_eq!(set.faults()[0].name, "broken");
    }

    #[tokio::test]
    async fn exclusive_minimum_still_seeds_traversal() {
        // a depends on b with an exclusive minimum; the boundary version
        // is still the one visited.
        let source = StubSource::new("feed")
            .with_package("a", "1.0.0", &[("b", "(1.0.0,)")])
            .with_package("b", "1.0.0", &[]);

        let set = build(vec![Arc::new(source)], identity("a", "1.0.0")).await;
        assert!(set.get(&identity("b", "1.0.0")).is_some());
    }

    #[tokio::test]
    async fn unbounded_range_pins_lowest_satisfying_version() {
        let source = StubSource::new("feed")
            .with_package("a", "1.0.0", &[("b", "(,2.0.0]")])
            .with_package("b", "1.5.0", &[])
            .with_package("b", "3.0.0", &[]);

        let set = build(vec![Arc::new(source)], identity("a", "1.0.0")).await;
        assert!(set.get(&identity("b", "1.5.0")).is_some());
        assert!(set.get(&identity("b", "3.0.0")).is_none());
    }

    #[tokio::test]
    async fn missing_identity_is_recorded_not_fatal() {
        let source = StubSource::new("feed").with_package("a", "1.0.0", &[("ghost", "1.0.0")]);

        let set = build(vec![Arc::new(source)], identity("a", "1.0.0")).await;
        assert_eq!(set.len(), 1);
        assert_eq!(set.missing(), &[identity("ghost", "1.0.0")]);
    }

    #[tokio::test]
    async fn cancellation_aborts_traversal() {
        let source = StubSource::new("feed").with_package("a", "1.0.0", &[]);
        let token = CancellationToken::new();
        token.cancel();

        let result = GraphBuilder::new(vec![Arc::new(source)], GraphConfig::default())
            .build(identity("a", "1.0.0"), &token)
            .await;
        assert!(matches!(result, Err(ResolveError::Cancelled)));
    }
}
