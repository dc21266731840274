//! Dependency graph discovery and version resolution.
//!
//! Two phases, mirroring the two hard problems:
//!
//! 1. [`GraphBuilder`] walks the transitive dependency graph across all
//!    enabled sources with a memoized worklist, producing a
//!    [`CandidateSet`]. Cycles terminate; per-source failures accumulate
//!    instead of aborting.
//! 2. [`resolve`] commits to exactly one version per package name under a
//!    [`ResolutionPolicy`], deterministically, or fails naming the
//!    conflicting edges. There is no backtracking: this is a bounded
//!    fixpoint, not a SAT solver.

mod candidate;
pub mod error;
mod graph;
mod resolve;
mod source;

pub use candidate::{Candidate, CandidateSet, DependencyEdge};
pub use error::{ResolveError, Result};
pub use graph::{GraphBuilder, GraphConfig};
pub use resolve::{resolve, ResolutionPolicy, ResolvedSet};
pub use source::{DependencyRequest, MetadataSource, PackageInfo, SourceFault};
