//! End-to-end provider tests against mock feeds.

use nupack_provider::{
    DestinationMode, Error, InstallRequest, OutcomeKind, PackageName, Provider, ResolutionPolicy,
    Settings, VersionRange,
};
use nupack_test_utils::MockFeed;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use url::Url;

struct Harness {
    provider: Provider,
    _dirs: TempDir,
}

/// Settings over temp dirs with the mock feeds as the only sources.
fn harness(feeds: &[(&str, &MockFeed)]) -> Harness {
    let dirs = TempDir::new().unwrap();
    let mut settings =
        Settings::from_dirs(dirs.path().join("config"), dirs.path().join("store")).unwrap();

    settings.sources.unregister("nuget.org").unwrap();
    for (name, feed) in feeds {
        let source = nupack_provider::PackageSource::new(*name, Url::parse(&feed.uri()).unwrap());
        settings.sources.register(source).unwrap();
    }

    Harness {
        provider: Provider::new(settings),
        _dirs: dirs,
    }
}

fn name(s: &str) -> PackageName {
    PackageName::parse(s).unwrap()
}

fn exact(request: InstallRequest, version: &str) -> InstallRequest {
    request.with_version(VersionRange::parse(&format!("[{version}]")).unwrap())
}

#[tokio::test]
async fn install_pulls_transitive_dependencies() {
    let feed = MockFeed::start().await;
    feed.register_package("App", "1.0.0", &[("Lib", Some("[1.2.0,2.0.0)"))], Some("the app"))
        .await;
    feed.register_package("Lib", "1.2.0", &[], Some("the lib")).await;

    let h = harness(&[("feed", &feed)]);
    let request = exact(InstallRequest::new(name("App")), "1.0.0");
    let report = h
        .provider
        .install_or_save(&request, &CancellationToken::new())
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.outcomes.len(), 2);

    let app = report.requested().unwrap();
    assert_eq!(app.identity.to_string(), "App@1.0.0");
    assert_eq!(app.kind, OutcomeKind::Installed);

    let lib = report.outcomes.iter().find(|o| !o.requested).unwrap();
    assert_eq!(lib.identity.to_string(), "Lib@1.2.0");
    assert_eq!(lib.kind, OutcomeKind::Installed);
}

#[tokio::test]
async fn second_install_is_idempotent() {
    let feed = MockFeed::start().await;
    feed.register_package("App", "1.0.0", &[("Lib", Some("1.0.0"))], None)
        .await;
    feed.register_package("Lib", "1.0.0", &[], None).await;

    let h = harness(&[("feed", &feed)]);
    let request = exact(InstallRequest::new(name("App")), "1.0.0");
    let token = CancellationToken::new();

    let first = h.provider.install_or_save(&request, &token).await.unwrap();
    assert!(first.is_success());
    assert!(first
        .outcomes
        .iter()
        .all(|o| o.kind == OutcomeKind::Installed));

    let second = h.provider.install_or_save(&request, &token).await.unwrap();
    assert!(second.is_success());
    assert!(second
        .outcomes
        .iter()
        .all(|o| o.kind == OutcomeKind::AlreadyInstalled));

    // Same identities both runs, in the same order.
    let first_ids: Vec<String> = first.outcomes.iter().map(|o| o.identity.to_string()).collect();
    let second_ids: Vec<String> = second.outcomes.iter().map(|o| o.identity.to_string()).collect();
    assert_eq!(first_ids, second_ids);
}

#[tokio::test]
async fn partial_failure_reports_siblings_and_fails_overall() {
    let feed = MockFeed::start().await;
    feed.register_package("App", "1.0.0", &[("Broken", Some("[1.0.0]"))], None)
        .await;
    feed.register_package_with_corrupt_artifact("Broken", "1.0.0")
        .await;

    let h = harness(&[("feed", &feed)]);
    let request = exact(InstallRequest::new(name("App")), "1.0.0");
    let report = h
        .provider
        .install_or_save(&request, &CancellationToken::new())
        .await
        .unwrap();

    assert!(!report.is_success());

    let app = report.requested().unwrap();
    assert_eq!(app.kind, OutcomeKind::Installed);

    let broken = report.outcomes.iter().find(|o| !o.requested).unwrap();
    assert_eq!(broken.kind, OutcomeKind::Failed);
    assert!(broken.error.as_deref().unwrap().contains("not a valid package archive"));
}

#[tokio::test]
async fn unknown_root_is_not_found() {
    let feed = MockFeed::start().await;
    feed.register_versions("Ghost", &[]).await;

    let h = harness(&[("feed", &feed)]);
    let request = InstallRequest::new(name("Ghost"));
    let err = h
        .provider
        .install_or_save(&request, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotFound { name } if name == "Ghost"));
}

#[tokio::test]
async fn conflicting_edges_surface_unsatisfiable() {
    let feed = MockFeed::start().await;
    feed.register_package(
        "App",
        "1.0.0",
        &[("A", Some("[1.0.0]")), ("B", Some("[1.0.0]"))],
        None,
    )
    .await;
    feed.register_package("A", "1.0.0", &[("X", Some("2.0.0"))], None)
        .await;
    feed.register_package("B", "1.0.0", &[("X", Some("(,2.0.0)"))], None)
        .await;
    feed.register_package("X", "2.0.0", &[], None).await;
    feed.register_versions("X", &["1.0.0", "2.0.0"]).await;
    feed.register_package("X", "1.0.0", &[], None).await;

    let h = harness(&[("feed", &feed)]);
    let request = exact(InstallRequest::new(name("App")), "1.0.0");
    let err = h
        .provider
        .install_or_save(&request, &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        Error::Unsatisfiable { name, detail } => {
            assert_eq!(name, "x");
            assert!(detail.contains("requires"));
        }
        other => panic!("expected Unsatisfiable, got {other}"),
    }
}

#[tokio::test]
async fn latest_version_wins_without_a_constraint() {
    let feed = MockFeed::start().await;
    feed.register_versions("Pkg", &["1.0.0", "2.0.0", "3.0.0-beta.1"])
        .await;
    feed.register_package("Pkg", "2.0.0", &[], None).await;

    let h = harness(&[("feed", &feed)]);
    let report = h
        .provider
        .install_or_save(&InstallRequest::new(name("Pkg")), &CancellationToken::new())
        .await
        .unwrap();

    // 3.0.0-beta.1 is skipped without the prerelease flag.
    assert_eq!(
        report.requested().unwrap().identity.to_string(),
        "Pkg@2.0.0"
    );
}

#[tokio::test]
async fn prerelease_flag_admits_prerelease_root() {
    let feed = MockFeed::start().await;
    feed.register_versions("Pkg", &["1.0.0", "2.0.0-rc.1"]).await;
    feed.register_package("Pkg", "2.0.0-rc.1", &[], None).await;

    let h = harness(&[("feed", &feed)]);
    let request = InstallRequest::new(name("Pkg")).with_prerelease(true);
    let report = h
        .provider
        .install_or_save(&request, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        report.requested().unwrap().identity.to_string(),
        "Pkg@2.0.0-rc.1"
    );
}

#[tokio::test]
async fn dependency_policy_applies_below_the_root() {
    let feed = MockFeed::start().await;
    feed.register_package("App", "1.0.0", &[("Dep", Some("[1.0.0,2.0.0)"))], None)
        .await;
    feed.register_package("Dep", "1.0.0", &[], None).await;
    feed.register_package("Dep", "1.5.0", &[], None).await;

    let h = harness(&[("feed", &feed)]);
    let lowest = exact(InstallRequest::new(name("App")), "1.0.0")
        .with_policy(ResolutionPolicy::Lowest);
    let report = h
        .provider
        .install_or_save(&lowest, &CancellationToken::new())
        .await
        .unwrap();

    let dep = report.outcomes.iter().find(|o| !o.requested).unwrap();
    assert_eq!(dep.identity.to_string(), "Dep@1.0.0");
}

#[tokio::test]
async fn directory_destination_installs_flat() {
    let feed = MockFeed::start().await;
    feed.register_package("Tool", "2.1.0", &[], None).await;

    let h = harness(&[("feed", &feed)]);
    let target = TempDir::new().unwrap();
    let request = exact(InstallRequest::new(name("Tool")), "2.1.0")
        .with_destination(DestinationMode::Directory(target.path().to_path_buf()));

    let report = h
        .provider
        .install_or_save(&request, &CancellationToken::new())
        .await
        .unwrap();
    assert!(report.is_success());
    assert!(target.path().join("tool.2.1.0").join("tool.nuspec").is_file());

    let installed = h
        .provider
        .enumerate_installed(&DestinationMode::Directory(target.path().to_path_buf()))
        .unwrap();
    assert_eq!(installed.len(), 1);
    assert_eq!(installed[0].identity.to_string(), "Tool@2.1.0");
}

#[tokio::test]
async fn search_merges_and_paginates() {
    let feed = MockFeed::start().await;
    // 120 hits forces three 50-sized pages (50, 50, 20).
    let hits: Vec<(String, String, Option<String>)> = (0..120)
        .map(|i| (format!("Pkg{i:03}"), "1.0.0".to_string(), None))
        .collect();
    feed.register_search(hits).await;

    let h = harness(&[("feed", &feed)]);
    let results = h.provider.search("Pkg", false, None).await.unwrap();

    assert_eq!(results.hits.len(), 120);
    assert!(results.source_errors.is_empty());

    // No duplicates and no gaps.
    let mut ids: Vec<String> = results
        .hits
        .iter()
        .map(|hit| hit.identity.name.as_str().to_string())
        .collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 120);
}

#[tokio::test]
async fn failing_source_does_not_hide_the_other() {
    let good = MockFeed::start().await;
    good.register_package("App", "1.0.0", &[], None).await;

    let broken = MockFeed::start().await;
    broken.register_broken_registration("App", "1.0.0").await;

    let h = harness(&[("broken", &broken), ("good", &good)]);
    let request = exact(InstallRequest::new(name("App")), "1.0.0");
    let report = h
        .provider
        .install_or_save(&request, &CancellationToken::new())
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.requested().unwrap().source, "good");
}

#[tokio::test]
async fn find_package_lists_versions_newest_first() {
    let feed = MockFeed::start().await;
    feed.register_versions("Pkg", &["1.0.0", "1.5.0", "2.0.0-beta.1"])
        .await;

    let h = harness(&[("feed", &feed)]);
    let found = h
        .provider
        .find_package(&name("Pkg"), None, false, None)
        .await
        .unwrap();

    let versions: Vec<String> = found
        .iter()
        .map(|f| f.identity.version.to_string())
        .collect();
    assert_eq!(versions, vec!["1.5.0", "1.0.0"]);
}
