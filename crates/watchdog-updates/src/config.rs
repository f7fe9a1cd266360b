use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::instance::{ServerInstance, WatchdogSettings};
use crate::local::{LocalProviderConfig, LocalUpdateProvider};
use crate::provider::{UpdateError, UpdateProvider};

/// Which update provider an instance uses, with its provider-specific settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ProviderConfig {
    /// Builds staged in the instance's `binaries/` directory.
    Local(LocalProviderConfig),
}

impl ProviderConfig {
    /// Provider kind as written in configuration.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
        }
    }

    /// Construct the configured provider for `instance`.
    pub fn build(
        &self,
        instance: Arc<dyn ServerInstance>,
        settings: Arc<dyn WatchdogSettings>,
    ) -> Result<Arc<dyn UpdateProvider>, UpdateError> {
        match self {
            Self::Local(config) => Ok(Arc::new(LocalUpdateProvider::new(
                instance,
                settings,
                config.clone(),
            )?)),
        }
    }
}
