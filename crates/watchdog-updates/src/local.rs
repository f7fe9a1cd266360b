use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::artifact::{self, DEFAULT_FILENAME_TEMPLATE};
use crate::hash::sha256_file;
use crate::instance::{ServerInstance, WatchdogSettings};
use crate::provider::{UpdateError, UpdateProvider};
use crate::revision::{DownloadInfoPair, Platform, RevisionDescriptor};

/// Name of the directory inside the instance folder holding staged builds.
pub const BINARIES_DIR: &str = "binaries";

/// Settings for a [`LocalUpdateProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LocalProviderConfig {
    /// Version label the staged binaries are published under.
    pub current_version: String,
    /// Artifact filename, with `{platform}` replaced by the platform name.
    #[serde(default = "default_filename_template")]
    pub filename_template: String,
}

impl LocalProviderConfig {
    pub fn new(current_version: impl Into<String>) -> Self {
        Self {
            current_version: current_version.into(),
            filename_template: default_filename_template(),
        }
    }
}

fn default_filename_template() -> String {
    DEFAULT_FILENAME_TEMPLATE.into()
}

/// Publishes whatever builds are staged in `<instance>/binaries/` under the
/// configured version. Nothing is fetched over the network; "updating" means
/// describing the files already on disk, hashed fresh on every call.
pub struct LocalUpdateProvider {
    instance: Arc<dyn ServerInstance>,
    settings: Arc<dyn WatchdogSettings>,
    config: LocalProviderConfig,
}

impl LocalUpdateProvider {
    pub fn new(
        instance: Arc<dyn ServerInstance>,
        settings: Arc<dyn WatchdogSettings>,
        config: LocalProviderConfig,
    ) -> Result<Self, UpdateError> {
        if config.current_version.is_empty() {
            return Err(UpdateError::Config(
                "local provider current_version must not be empty".into(),
            ));
        }
        artifact::validate_template(&config.filename_template)?;

        Ok(Self {
            instance,
            settings,
            config,
        })
    }

    fn is_current(&self, current_version: Option<&str>) -> bool {
        current_version == Some(self.config.current_version.as_str())
    }

    fn binaries_path(&self) -> PathBuf {
        self.instance.instance_dir().join(BINARIES_DIR)
    }

    async fn ensure_binaries_dir(&self, path: &Path) -> Result<(), UpdateError> {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(UpdateError::MissingBinaries {
                path: path.to_path_buf(),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(UpdateError::MissingBinaries {
                path: path.to_path_buf(),
            }),
            Err(e) => Err(UpdateError::io(path, e)),
        }
    }

    /// Resolve the artifact for one platform, or `None` if it is not staged.
    async fn info_pair(
        &self,
        platform: Platform,
        binaries_path: &Path,
        binaries_root: &Url,
        cancel: &CancellationToken,
    ) -> Result<Option<DownloadInfoPair>, UpdateError> {
        if cancel.is_cancelled() {
            return Err(UpdateError::Cancelled);
        }

        let file_name = artifact::artifact_filename(&self.config.filename_template, platform);
        let disk_path = binaries_path.join(&file_name);

        match tokio::fs::metadata(&disk_path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(UpdateError::io(disk_path, e)),
        }

        let download = artifact::artifact_url(binaries_root, &file_name)?;
        let hash = sha256_file(&disk_path, cancel).await?;

        tracing::trace!(%platform, file = %file_name, %hash, "SHA256 hash computed");

        Ok(Some(DownloadInfoPair::new(download.to_string(), hash)))
    }
}

#[async_trait::async_trait]
impl UpdateProvider for LocalUpdateProvider {
    fn label(&self) -> &str {
        "local"
    }

    async fn check_for_update(
        &self,
        current_version: Option<&str>,
        _cancel: &CancellationToken,
    ) -> Result<bool, UpdateError> {
        Ok(!self.is_current(current_version))
    }

    async fn run_update(
        &self,
        current_version: Option<&str>,
        _bin_path: &Path,
        cancel: &CancellationToken,
    ) -> Result<Option<RevisionDescriptor>, UpdateError> {
        if self.is_current(current_version) {
            tracing::debug!(
                instance = self.instance.key(),
                version = %self.config.current_version,
                "instance already up to date"
            );
            return Ok(None);
        }
        if cancel.is_cancelled() {
            return Err(UpdateError::Cancelled);
        }

        let binaries_path = self.binaries_path();
        self.ensure_binaries_dir(&binaries_path).await?;

        let binaries_root =
            artifact::binaries_root(&self.settings.base_url(), self.instance.key())?;

        let mut revision = RevisionDescriptor::new(self.config.current_version.clone());
        for platform in Platform::ALL {
            let pair = self
                .info_pair(platform, &binaries_path, &binaries_root, cancel)
                .await?;
            revision = revision.with_artifact(platform, pair);
        }

        if !revision.has_artifacts() {
            tracing::warn!(
                instance = self.instance.key(),
                path = %binaries_path.display(),
                "no platform builds staged for revision"
            );
        }

        Ok(Some(revision))
    }
}
