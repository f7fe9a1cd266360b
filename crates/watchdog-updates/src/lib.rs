pub mod artifact;
pub mod config;
pub mod hash;
pub mod instance;
pub mod local;
pub mod provider;
pub mod revision;

pub use config::ProviderConfig;
pub use instance::{InstanceInfo, ServerInstance, StaticSettings, WatchdogSettings};
pub use local::{LocalProviderConfig, LocalUpdateProvider};
pub use provider::{UpdateError, UpdateProvider};
pub use revision::{DownloadInfoPair, Platform, RevisionDescriptor};
pub use tokio_util::sync::CancellationToken;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
