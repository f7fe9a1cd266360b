use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tempfile::TempDir;
use url::Url;
use watchdog_updates::{
    CancellationToken, InstanceInfo, LocalProviderConfig, LocalUpdateProvider, Platform,
    StaticSettings, UpdateError, UpdateProvider,
};

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn with_binaries() -> Self {
        let fixture = Self::new();
        std::fs::create_dir_all(fixture.binaries()).unwrap();
        fixture
    }

    fn binaries(&self) -> PathBuf {
        self.dir.path().join("binaries")
    }

    fn stage(&self, file_name: &str, content: &[u8]) {
        std::fs::write(self.binaries().join(file_name), content).unwrap();
    }

    fn provider(&self, base_url: &str, version: &str) -> LocalUpdateProvider {
        LocalUpdateProvider::new(
            Arc::new(InstanceInfo::new("srv1", self.dir.path())),
            Arc::new(StaticSettings::new(Url::parse(base_url).unwrap())),
            LocalProviderConfig::new(version),
        )
        .unwrap()
    }
}

fn sha256_hex(content: &[u8]) -> String {
    format!("{:x}", Sha256::digest(content))
}

fn bin_path() -> &'static Path {
    Path::new("/srv/current/bin")
}

#[tokio::test]
async fn check_for_update_is_version_inequality() {
    let fixture = Fixture::new();
    let cancel = CancellationToken::new();

    for (configured, current) in [("v3", "v2"), ("1.0.0", "1.0"), ("abc", "ABC"), ("x", "")] {
        let provider = fixture.provider("https://host/", configured);
        assert!(
            provider.check_for_update(Some(current), &cancel).await.unwrap(),
            "{current} vs {configured}"
        );
        assert!(!provider.check_for_update(Some(configured), &cancel).await.unwrap());
    }
}

#[tokio::test]
async fn absent_current_version_needs_update() {
    let fixture = Fixture::new();
    let provider = fixture.provider("https://host/", "v3");
    assert!(
        provider
            .check_for_update(None, &CancellationToken::new())
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn run_update_is_noop_when_current() {
    // No binaries directory at all: the no-op must win over the missing directory.
    let fixture = Fixture::new();
    let provider = fixture.provider("https://host/", "v3");

    let result = provider
        .run_update(Some("v3"), bin_path(), &CancellationToken::new())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn run_update_noop_ignores_staged_files() {
    let fixture = Fixture::with_binaries();
    fixture.stage("windows_build.zip", b"windows");
    let provider = fixture.provider("https://host/", "v3");

    let result = provider
        .run_update(Some("v3"), bin_path(), &CancellationToken::new())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn windows_only_scenario() {
    let fixture = Fixture::with_binaries();
    let content = b"windows server build";
    fixture.stage("windows_build.zip", content);
    let provider = fixture.provider("https://host/", "v3");

    let revision = provider
        .run_update(Some("v2"), Path::new("anything"), &CancellationToken::new())
        .await
        .unwrap()
        .expect("update expected");

    assert_eq!(revision.version, "v3");
    let windows = revision.windows.expect("windows artifact");
    assert_eq!(
        windows.download_url,
        "https://host/instances/srv1/binaries/windows_build.zip"
    );
    assert_eq!(windows.sha256, sha256_hex(content));
    assert!(revision.linux.is_none());
    assert!(revision.macos.is_none());
}

#[tokio::test]
async fn linux_only_leaves_other_platforms_absent() {
    let fixture = Fixture::with_binaries();
    fixture.stage("linux_build.zip", b"linux");
    let provider = fixture.provider("https://host/", "v3");

    let revision = provider
        .run_update(Some("v1"), bin_path(), &CancellationToken::new())
        .await
        .unwrap()
        .unwrap();

    assert!(revision.windows.is_none());
    assert!(revision.linux.is_some());
    assert!(revision.macos.is_none());
    let platforms: Vec<Platform> = revision.artifacts().map(|(p, _)| p).collect();
    assert_eq!(platforms, vec![Platform::Linux]);
}

#[tokio::test]
async fn all_platforms_staged() {
    let fixture = Fixture::with_binaries();
    fixture.stage("windows_build.zip", b"w");
    fixture.stage("linux_build.zip", b"l");
    fixture.stage("macos_build.zip", b"m");
    let provider = fixture.provider("https://host/", "v3");

    let revision = provider
        .run_update(None, bin_path(), &CancellationToken::new())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(revision.windows.unwrap().sha256, sha256_hex(b"w"));
    assert_eq!(revision.linux.unwrap().sha256, sha256_hex(b"l"));
    let macos = revision.macos.unwrap();
    assert_eq!(macos.sha256, sha256_hex(b"m"));
    assert_eq!(
        macos.download_url,
        "https://host/instances/srv1/binaries/macos_build.zip"
    );
}

#[tokio::test]
async fn empty_binaries_directory_yields_descriptor_without_artifacts() {
    let fixture = Fixture::with_binaries();
    let provider = fixture.provider("https://host/", "v3");

    let revision = provider
        .run_update(Some("v2"), bin_path(), &CancellationToken::new())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(revision.version, "v3");
    assert!(!revision.has_artifacts());
}

#[tokio::test]
async fn missing_binaries_directory_is_config_fault() {
    let fixture = Fixture::new();
    let provider = fixture.provider("https://host/", "v3");

    let err = provider
        .run_update(Some("v2"), bin_path(), &CancellationToken::new())
        .await
        .unwrap_err();

    match &err {
        UpdateError::MissingBinaries { path } => assert_eq!(path, &fixture.binaries()),
        other => panic!("expected MissingBinaries, got {other:?}"),
    }
    assert!(err.to_string().contains("binaries"));
}

#[tokio::test]
async fn hash_tracks_file_content() {
    let fixture = Fixture::with_binaries();
    fixture.stage("linux_build.zip", b"build-0001");
    let provider = fixture.provider("https://host/", "v3");
    let cancel = CancellationToken::new();

    let first = provider
        .run_update(Some("v2"), bin_path(), &cancel)
        .await
        .unwrap()
        .unwrap();
    let again = provider
        .run_update(Some("v2"), bin_path(), &cancel)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first, again);

    fixture.stage("linux_build.zip", b"build-0002");
    let changed = provider
        .run_update(Some("v2"), bin_path(), &cancel)
        .await
        .unwrap()
        .unwrap();

    let before = first.linux.unwrap().sha256;
    let after = changed.linux.unwrap().sha256;
    assert_ne!(before, after);
    assert_eq!(after, sha256_hex(b"build-0002"));
}

#[tokio::test]
async fn urls_ignore_base_trailing_slash() {
    let fixture = Fixture::with_binaries();
    fixture.stage("linux_build.zip", b"l");
    let cancel = CancellationToken::new();

    let mut urls = Vec::new();
    for base in ["https://host/watchdog", "https://host/watchdog/"] {
        let revision = fixture
            .provider(base, "v3")
            .run_update(Some("v2"), bin_path(), &cancel)
            .await
            .unwrap()
            .unwrap();
        urls.push(revision.linux.unwrap().download_url);
    }

    assert_eq!(urls[0], urls[1]);
    assert_eq!(
        urls[0],
        "https://host/watchdog/instances/srv1/binaries/linux_build.zip"
    );
    assert!(Url::parse(&urls[0]).is_ok());
}

#[tokio::test]
async fn custom_filename_template() {
    let fixture = Fixture::with_binaries();
    fixture.stage("Server_linux.tar.gz", b"l");
    fixture.stage("linux_build.zip", b"ignored");
    let mut config = LocalProviderConfig::new("v3");
    config.filename_template = "Server_{platform}.tar.gz".into();
    let provider = LocalUpdateProvider::new(
        Arc::new(InstanceInfo::new("srv1", fixture.dir.path())),
        Arc::new(StaticSettings::new(Url::parse("https://host/").unwrap())),
        config,
    )
    .unwrap();

    let revision = provider
        .run_update(Some("v2"), bin_path(), &CancellationToken::new())
        .await
        .unwrap()
        .unwrap();

    let linux = revision.linux.unwrap();
    assert_eq!(linux.sha256, sha256_hex(b"l"));
    assert!(linux.download_url.ends_with("/binaries/Server_linux.tar.gz"));
}

#[tokio::test]
async fn cancelled_run_returns_no_descriptor() {
    let fixture = Fixture::with_binaries();
    fixture.stage("windows_build.zip", b"w");
    let provider = fixture.provider("https://host/", "v3");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = provider.run_update(Some("v2"), bin_path(), &cancel).await;
    assert!(matches!(result, Err(UpdateError::Cancelled)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelling_while_hashing_aborts_run() {
    let fixture = Fixture::with_binaries();
    let large = std::fs::File::create(fixture.binaries().join("windows_build.zip")).unwrap();
    large.set_len(512 * 1024 * 1024).unwrap();
    drop(large);

    let provider = Arc::new(fixture.provider("https://host/", "v3"));
    let cancel = CancellationToken::new();

    let task = {
        let provider = Arc::clone(&provider);
        let cancel = cancel.clone();
        tokio::spawn(async move { provider.run_update(Some("v2"), bin_path(), &cancel).await })
    };

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    cancel.cancel();

    let result = tokio::time::timeout(std::time::Duration::from_secs(10), task)
        .await
        .expect("run_update did not stop after cancellation")
        .unwrap();
    assert!(matches!(result, Err(UpdateError::Cancelled)));
}

#[tokio::test]
async fn concurrent_calls_agree() {
    let fixture = Fixture::with_binaries();
    fixture.stage("windows_build.zip", b"w");
    fixture.stage("macos_build.zip", b"m");
    let provider = Arc::new(fixture.provider("https://host/", "v3"));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let provider = Arc::clone(&provider);
        handles.push(tokio::spawn(async move {
            let cancel = CancellationToken::new();
            let due = provider.check_for_update(Some("v2"), &cancel).await.unwrap();
            let revision = provider
                .run_update(Some("v2"), Path::new("bin"), &cancel)
                .await
                .unwrap();
            (due, revision)
        }));
    }

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    let (_, expected) = &results[0];
    for (due, revision) in &results {
        assert!(*due);
        assert_eq!(revision, expected);
    }
}
