use std::path::{Path, PathBuf};

use url::Url;

/// Read access to the managed server instance a provider works for.
pub trait ServerInstance: Send + Sync {
    /// Unique key, used in public URLs.
    fn key(&self) -> &str;

    /// Root directory holding the instance's data, including `binaries/`.
    fn instance_dir(&self) -> &Path;
}

/// Plain [`ServerInstance`] backed by owned values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceInfo {
    pub key: String,
    pub directory: PathBuf,
}

impl InstanceInfo {
    pub fn new(key: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            key: key.into(),
            directory: directory.into(),
        }
    }
}

impl ServerInstance for InstanceInfo {
    fn key(&self) -> &str {
        &self.key
    }

    fn instance_dir(&self) -> &Path {
        &self.directory
    }
}

/// Watchdog-wide settings providers consult on every call.
pub trait WatchdogSettings: Send + Sync {
    /// Root URL under which instance binaries are served.
    fn base_url(&self) -> Url;
}

/// [`WatchdogSettings`] fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticSettings {
    pub base_url: Url,
}

impl StaticSettings {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }
}

impl WatchdogSettings for StaticSettings {
    fn base_url(&self) -> Url {
        self.base_url.clone()
    }
}
