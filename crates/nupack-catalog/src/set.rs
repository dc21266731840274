//! The set of feed clients for one operation.

use crate::error::{CatalogError, Result};
use crate::feed::FeedClient;
use crate::http::{HttpClient, HttpConfig};
use crate::types::SearchHit;
use nupack_core::AHashSet;
use nupack_config::Settings;
use std::sync::Arc;
use tracing::{debug, warn};

/// Ordered collection of feed clients built from the enabled sources of
/// a settings snapshot. Order follows the registry: the first source to
/// answer wins ties.
#[derive(Debug, Clone)]
pub struct CatalogSet {
    clients: Vec<Arc<FeedClient>>,
}

impl CatalogSet {
    /// Build clients for every enabled source, optionally restricted to
    /// a caller-supplied name filter.
    pub fn from_settings(settings: &Settings, filter: Option<&[String]>) -> Result<Self> {
        let http = Arc::new(HttpClient::with_config(HttpConfig {
            timeout: settings.request_timeout,
            ..HttpConfig::default()
        })?);

        let clients: Vec<Arc<FeedClient>> = settings
            .sources
            .enabled(filter)
            .into_iter()
            .map(|source| Arc::new(FeedClient::new(source, Arc::clone(&http))))
            .collect();

        debug!(sources = clients.len(), "catalog set ready");
        Ok(Self { clients })
    }

    /// Build a set over explicit clients (tests, embedding).
    #[must_use]
    pub fn from_clients(clients: Vec<Arc<FeedClient>>) -> Self {
        Self { clients }
    }

    /// The clients, in source-registry order.
    #[must_use]
    pub fn clients(&self) -> &[Arc<FeedClient>] {
        &self.clients
    }

    /// Whether no enabled source survived filtering.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Find the client for a named source.
    #[must_use]
    pub fn find(&self, source_name: &str) -> Option<&Arc<FeedClient>> {
        self.clients
            .iter()
            .find(|c| c.source_name().eq_ignore_ascii_case(source_name))
    }

    /// Search every source and merge the results.
    ///
    /// Identity collisions keep the hit from the earlier source. Failing
    /// sources are collected, not fatal — unless every source failed and
    /// nothing was found, in which case the first error is returned.
    pub async fn search(
        &self,
        query: &str,
        include_prerelease: bool,
    ) -> Result<(Vec<SearchHit>, Vec<CatalogError>)> {
        let mut hits: Vec<SearchHit> = Vec::new();
        let mut seen: AHashSet<String> = AHashSet::new();
        let mut failures: Vec<CatalogError> = Vec::new();

        for client in &self.clients {
            match client.search(query, include_prerelease).await {
                Ok(source_hits) => {
                    for hit in source_hits {
                        if seen.insert(hit.identity.key()) {
                            hits.push(hit);
                        }
                    }
                }
                Err(err) => {
                    warn!(source = client.source_name(), %err, "search failed");
                    failures.push(err);
                }
            }
        }

        if hits.is_empty() && !failures.is_empty() && failures.len() == self.clients.len() {
            return Err(failures.remove(0));
        }
        Ok((hits, failures))
    }
}
