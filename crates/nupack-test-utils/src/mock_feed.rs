//! A wiremock server speaking the nupack feed protocol.

use crate::fixtures::package_zip;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Mock package feed for resolution and install tests.
///
/// Endpoints mirror a real feed: `registration/{id}/{version}.json`,
/// `package/{id}/index.json`, `package/{id}/{v}/{id}.{v}.nupkg` and a
/// paginating `query` endpoint.
#[derive(Debug)]
pub struct MockFeed {
    server: MockServer,
}

impl MockFeed {
    /// Start a new mock feed.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL of the feed.
    #[must_use]
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Register one package version with its dependencies and a
    /// downloadable artifact. Dependencies land in the any-framework
    /// group; `None` as a range means "any version".
    pub async fn register_package(
        &self,
        name: &str,
        version: &str,
        deps: &[(&str, Option<&str>)],
        description: Option<&str>,
    ) {
        let name_lower = name.to_ascii_lowercase();
        let dependencies: Vec<Value> = deps
            .iter()
            .map(|(id, range)| match range {
                Some(range) => json!({ "id": id, "range": range }),
                None => json!({ "id": id }),
            })
            .collect();

        let leaf = json!({
            "id": name,
            "version": version,
            "listed": true,
            "description": description,
            "dependencyGroups": [
                { "dependencies": dependencies }
            ]
        });

        Mock::given(method("GET"))
            .and(path(format!("/registration/{name_lower}/{version}.json")))
            .respond_with(ResponseTemplate::new(200).set_body_json(&leaf))
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!(
                "/package/{name_lower}/{version}/{name_lower}.{version}.nupkg"
            )))
            .respond_with(
                ResponseTemplate::new(200).set_body_bytes(package_zip(&name_lower, version)),
            )
            .mount(&self.server)
            .await;
    }

    /// Register a package version whose artifact download returns bytes
    /// that are not a valid archive.
    pub async fn register_package_with_corrupt_artifact(
        &self,
        name: &str,
        version: &str,
    ) {
        let name_lower = name.to_ascii_lowercase();
        let leaf = json!({
            "id": name,
            "version": version,
            "listed": true,
            "dependencyGroups": [],
        });
        Mock::given(method("GET"))
            .and(path(format!("/registration/{name_lower}/{version}.json")))
            .respond_with(ResponseTemplate::new(200).set_body_json(&leaf))
            .mount(&self.server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!(
                "/package/{name_lower}/{version}/{name_lower}.{version}.nupkg"
            )))
            .respond_with(
                ResponseTemplate::new(200).set_body_bytes(b"<html>502 Bad Gateway</html>".to_vec()),
            )
            .mount(&self.server)
            .await;
    }

    /// Register the flat version list for a package id.
    pub async fn register_versions(&self, name: &str, versions: &[&str]) {
        let name_lower = name.to_ascii_lowercase();
        Mock::given(method("GET"))
            .and(path(format!("/package/{name_lower}/index.json")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "versions": versions,
            })))
            .mount(&self.server)
            .await;
    }

    /// Register the search endpoint over a fixed hit list. Requests are
    /// served page by page from `skip`/`take` query parameters, so
    /// pagination behavior is exercised for real.
    pub async fn register_search(&self, hits: Vec<(String, String, Option<String>)>) {
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(PagingResponder { hits })
            .mount(&self.server)
            .await;
    }

    /// Register a registration endpoint that always answers 500, for
    /// source-failure tests.
    pub async fn register_broken_registration(&self, name: &str, version: &str) {
        let name_lower = name.to_ascii_lowercase();
        Mock::given(method("GET"))
            .and(path(format!("/registration/{name_lower}/{version}.json")))
            .respond_with(ResponseTemplate::new(500))
            .mount(&self.server)
            .await;
    }

    /// Number of requests the feed has served.
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map_or(0, |requests| requests.len())
    }
}

/// Serves slices of a hit list according to `skip`/`take`.
struct PagingResponder {
    hits: Vec<(String, String, Option<String>)>,
}

impl Respond for PagingResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let query: std::collections::HashMap<String, String> = request
            .url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let skip: usize = query.get("skip").and_then(|s| s.parse().ok()).unwrap_or(0);
        let take: usize = query.get("take").and_then(|s| s.parse().ok()).unwrap_or(20);

        let page: Vec<Value> = self
            .hits
            .iter()
            .skip(skip)
            .take(take)
            .map(|(id, version, description)| {
                json!({ "id": id, "version": version, "description": description })
            })
            .collect();

        ResponseTemplate::new(200).set_body_json(json!({
            "totalHits": self.hits.len(),
            "data": page,
        }))
    }
}
