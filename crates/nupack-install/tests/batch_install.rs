//! Batch installer tests with an in-memory artifact fetcher.

use async_trait::async_trait;
use nupack_core::{PackageIdentity, PackageName, PackageVersion};
use nupack_install::{
    ArtifactFetcher, DestinationMode, InstallError, InstallItem, InstallState, Installer,
    InstallerConfig, StoreLayout,
};
use nupack_test_utils::package_zip;
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Serves canned artifact bytes and counts downloads.
struct StubFetcher {
    artifacts: HashMap<String, Vec<u8>>,
    downloads: AtomicUsize,
}

impl StubFetcher {
    fn new() -> Self {
        Self {
            artifacts: HashMap::new(),
            downloads: AtomicUsize::new(0),
        }
    }

    fn with_package(mut self, name: &str, version: &str) -> Self {
        self.artifacts
            .insert(format!("{name}/{version}"), package_zip(name, version));
        self
    }

    fn with_corrupt(mut self, name: &str, version: &str) -> Self {
        self.artifacts
            .insert(format!("{name}/{version}"), b"not a zip".to_vec());
        self
    }
}

#[async_trait]
impl ArtifactFetcher for StubFetcher {
    async fn download(
        &self,
        _source: &str,
        identity: &PackageIdentity,
        dest: &Path,
    ) -> Result<u64, InstallError> {
        self.downloads.fetch_add(1, Ordering::Relaxed);
        let key = format!("{}/{}", identity.name.normalized(), identity.version);
        let bytes = self.artifacts.get(&key).ok_or_else(|| InstallError::Download {
            package: identity.to_string(),
            message: "no such artifact".into(),
        })?;
        tokio::fs::write(dest, bytes)
            .await
            .map_err(|e| InstallError::io(dest, &e))?;
        Ok(bytes.len() as u64)
    }
}

fn item(name: &str, version: &str) -> InstallItem {
    InstallItem {
        identity: PackageIdentity::new(
            PackageName::parse(name).unwrap(),
            PackageVersion::parse(version).unwrap(),
        ),
        source: "stub".into(),
        description: None,
    }
}

fn installer(fetcher: StubFetcher, store: &Path) -> Installer<StubFetcher> {
    Installer::new(
        Arc::new(fetcher),
        StoreLayout::new(store),
        InstallerConfig::default(),
    )
}

#[tokio::test]
async fn install_extracts_and_records() {
    let store = tempfile::tempdir().unwrap();
    let installer = installer(StubFetcher::new().with_package("pkg", "1.0.0"), store.path());

    let batch = installer
        .install_all(
            vec![item("pkg", "1.0.0")],
            &DestinationMode::GlobalStore,
            &CancellationToken::new(),
        )
        .await;

    assert!(batch.is_success());
    let outcome = &batch.outcomes[0];
    let InstallState::Installed(record) = &outcome.state else {
        panic!("expected Installed, got {:?}", outcome.state);
    };
    assert_eq!(record.file_count, 2);
    assert_eq!(record.content_hash.len(), 64);

    let package_dir = store.path().join("pkg/1.0.0");
    assert!(package_dir.join("pkg.nuspec").is_file());
    assert!(package_dir.join(".nupack-record.json").is_file());
}

#[tokio::test]
async fn reinstall_skips_download_entirely() {
    let store = tempfile::tempdir().unwrap();
    let fetcher = StubFetcher::new().with_package("pkg", "1.0.0");
    let installer = installer(fetcher, store.path());
    let mode = DestinationMode::GlobalStore;
    let token = CancellationToken::new();

    let first = installer
        .install_all(vec![item("pkg", "1.0.0")], &mode, &token)
        .await;
    assert!(first.is_success());

    let second = installer
        .install_all(vec![item("pkg", "1.0.0")], &mode, &token)
        .await;
    assert!(second.is_success());
    assert!(matches!(
        second.outcomes[0].state,
        InstallState::AlreadyInstalled
    ));
}

#[tokio::test]
async fn corrupt_artifact_fails_without_stopping_siblings() {
    let store = tempfile::tempdir().unwrap();
    let fetcher = StubFetcher::new()
        .with_package("good", "1.0.0")
        .with_corrupt("bad", "1.0.0");
    let installer = installer(fetcher, store.path());

    let batch = installer
        .install_all(
            vec![item("good", "1.0.0"), item("bad", "1.0.0")],
            &DestinationMode::GlobalStore,
            &CancellationToken::new(),
        )
        .await;

    assert!(!batch.is_success());
    assert!(matches!(batch.outcomes[0].state, InstallState::Installed(_)));
    assert!(matches!(
        batch.outcomes[1].state,
        InstallState::Failed(InstallError::MalformedArtifact { .. })
    ));

    // The failed package left nothing behind.
    assert!(store.path().join("good/1.0.0").is_dir());
    assert!(!store.path().join("bad/1.0.0").exists());
}

#[tokio::test]
async fn failed_install_leaves_no_record_and_can_retry() {
    let store = tempfile::tempdir().unwrap();
    let mode = DestinationMode::GlobalStore;
    let token = CancellationToken::new();

    let broken = installer(StubFetcher::new().with_corrupt("pkg", "1.0.0"), store.path());
    let batch = broken
        .install_all(vec![item("pkg", "1.0.0")], &mode, &token)
        .await;
    assert!(!batch.is_success());

    // Retry with a healthy artifact: not "already present".
    let healthy = installer(StubFetcher::new().with_package("pkg", "1.0.0"), store.path());
    let batch = healthy
        .install_all(vec![item("pkg", "1.0.0")], &mode, &token)
        .await;
    assert!(batch.is_success());
    assert!(matches!(batch.outcomes[0].state, InstallState::Installed(_)));
}

#[tokio::test]
async fn outcomes_keep_input_order_under_concurrency() {
    let store = tempfile::tempdir().unwrap();
    let mut fetcher = StubFetcher::new();
    for i in 0..8 {
        fetcher = fetcher.with_package(&format!("pkg{i}"), "1.0.0");
    }
    let installer = installer(fetcher, store.path());

    let items: Vec<InstallItem> = (0..8).map(|i| item(&format!("pkg{i}"), "1.0.0")).collect();
    let batch = installer
        .install_all(items, &DestinationMode::GlobalStore, &CancellationToken::new())
        .await;

    let names: Vec<String> = batch
        .outcomes
        .iter()
        .map(|o| o.identity.name.as_str().to_string())
        .collect();
    let expected: Vec<String> = (0..8).map(|i| format!("pkg{i}")).collect();
    assert_eq!(names, expected);
}
