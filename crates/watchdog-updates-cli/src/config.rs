use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use url::Url;
use watchdog_updates::{InstanceInfo, ProviderConfig, StaticSettings, UpdateProvider};

/// Top-level watchdog configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Root URL under which instance binaries are served.
    pub base_url: Url,
    #[serde(default)]
    pub instances: Vec<InstanceEntry>,
}

/// A single managed server instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InstanceEntry {
    pub key: String,
    pub directory: PathBuf,
    pub update: ProviderConfig,
}

impl AppConfig {
    pub fn settings(&self) -> StaticSettings {
        StaticSettings::new(self.base_url.clone())
    }

    pub fn instance(&self, key: &str) -> Option<&InstanceEntry> {
        self.instances.iter().find(|entry| entry.key == key)
    }

    /// Reject configurations the providers cannot work with.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.instances {
            if entry.key.is_empty() {
                bail!("instance with directory {} has an empty key", entry.directory.display());
            }
            if matches!(entry.key.as_str(), "." | "..") {
                bail!("instance key {:?} is not a valid URL path segment", entry.key);
            }
            if !seen.insert(entry.key.as_str()) {
                bail!("duplicate instance key: {}", entry.key);
            }
        }
        Ok(())
    }
}

impl InstanceEntry {
    pub fn info(&self) -> InstanceInfo {
        InstanceInfo::new(&self.key, &self.directory)
    }

    /// Build the provider this instance is configured with.
    pub fn build_provider(&self, settings: &StaticSettings) -> Result<Arc<dyn UpdateProvider>> {
        self.update
            .build(Arc::new(self.info()), Arc::new(settings.clone()))
            .with_context(|| format!("failed to set up update provider for [{}]", self.key))
    }
}

/// Default config file path: `~/.config/server-watchdog/watchdog.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("server-watchdog").join("watchdog.toml"))
}

/// Load and validate the config file at `path`.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    let config = parse_config(&contents)
        .with_context(|| format!("failed to parse config at {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        instances = config.instances.len(),
        "loaded watchdog configuration"
    );
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}
