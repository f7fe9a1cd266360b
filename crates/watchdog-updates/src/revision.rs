use std::fmt;

use serde::{Deserialize, Serialize};

/// Operating system a server build is published for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
}

impl Platform {
    /// Every supported platform, in the order artifacts are resolved.
    pub const ALL: [Platform; 3] = [Self::Windows, Self::Linux, Self::MacOs];

    /// Stable lower-case name used in artifact filenames.
    pub fn name(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::MacOs => "macos",
        }
    }

}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where to download one artifact from, and the SHA-256 it must hash to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadInfoPair {
    pub download_url: String,
    /// Lower-case hex digest, 64 characters.
    pub sha256: String,
}

impl DownloadInfoPair {
    pub fn new(download_url: impl Into<String>, sha256: impl Into<String>) -> Self {
        Self {
            download_url: download_url.into(),
            sha256: sha256.into(),
        }
    }
}

/// One update target: a version and the artifacts published for it.
///
/// A platform without an artifact is `None`. It is valid for every platform
/// to be `None`, which means the revision ships no binaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionDescriptor {
    pub version: String,
    pub windows: Option<DownloadInfoPair>,
    pub linux: Option<DownloadInfoPair>,
    pub macos: Option<DownloadInfoPair>,
}

impl RevisionDescriptor {
    /// A descriptor for `version` with no artifacts.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            windows: None,
            linux: None,
            macos: None,
        }
    }

    /// Set the artifact for `platform`, consuming and returning the descriptor.
    pub fn with_artifact(mut self, platform: Platform, pair: Option<DownloadInfoPair>) -> Self {
        *self.slot_mut(platform) = pair;
        self
    }

    pub fn artifact(&self, platform: Platform) -> Option<&DownloadInfoPair> {
        match platform {
            Platform::Windows => self.windows.as_ref(),
            Platform::Linux => self.linux.as_ref(),
            Platform::MacOs => self.macos.as_ref(),
        }
    }

    /// Iterate over the platforms that have an artifact.
    pub fn artifacts(&self) -> impl Iterator<Item = (Platform, &DownloadInfoPair)> {
        Platform::ALL
            .into_iter()
            .filter_map(|platform| self.artifact(platform).map(|pair| (platform, pair)))
    }

    pub fn has_artifacts(&self) -> bool {
        self.artifacts().next().is_some()
    }

    fn slot_mut(&mut self, platform: Platform) -> &mut Option<DownloadInfoPair> {
        match platform {
            Platform::Windows => &mut self.windows,
            Platform::Linux => &mut self.linux,
            Platform::MacOs => &mut self.macos,
        }
    }
}
