//! Catalog client for nupack package feeds.
//!
//! Each configured source gets a [`FeedClient`] speaking a JSON protocol
//! with four endpoints: paginated search, flat version lists, per-version
//! registration (dependency) documents, and artifact download. The
//! [`CatalogSet`] groups the clients for the enabled sources of one
//! operation.

pub mod error;
mod feed;
mod http;
mod set;
pub mod types;

pub use error::{CatalogError, Result};
pub use feed::FeedClient;
pub use http::{HttpClient, HttpConfig};
pub use set::CatalogSet;
pub use types::{
    DependencyGroup, PackageDependency, PackageMetadata, SearchHit,
};
