use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::revision::RevisionDescriptor;

/// Errors that can occur while checking for or preparing an update.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error(
        "expected binaries directory containing the platform binaries in the instance folder: {}",
        path.display()
    )]
    MissingBinaries { path: PathBuf },

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("operation cancelled")]
    Cancelled,
}

impl UpdateError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True if the operation was aborted through its cancellation token.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// A strategy for detecting and describing updates for one server instance.
///
/// Providers hold no mutable state, so both operations may run concurrently
/// and every call recomputes its answer from current configuration and disk.
#[async_trait::async_trait]
pub trait UpdateProvider: Send + Sync {
    /// Short label identifying the provider kind (e.g. `local`).
    fn label(&self) -> &str;

    /// Returns true if an update is available relative to `current_version`.
    /// A missing current version always counts as out of date.
    async fn check_for_update(
        &self,
        current_version: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<bool, UpdateError>;

    /// Describe the revision the instance should move to.
    ///
    /// `Ok(None)` means there is intentionally nothing to do. Anything that
    /// prevents computing an answer is an `Err`. `bin_path` is where the
    /// instance's current binaries live; providers may ignore it.
    async fn run_update(
        &self,
        current_version: Option<&str>,
        bin_path: &Path,
        cancel: &CancellationToken,
    ) -> Result<Option<RevisionDescriptor>, UpdateError>;
}

#[async_trait::async_trait]
impl<T: UpdateProvider + ?Sized> UpdateProvider for Arc<T> {
    fn label(&self) -> &str {
        (**self).label()
    }

    async fn check_for_update(
        &self,
        current_version: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<bool, UpdateError> {
        (**self).check_for_update(current_version, cancel).await
    }

    async fn run_update(
        &self,
        current_version: Option<&str>,
        bin_path: &Path,
        cancel: &CancellationToken,
    ) -> Result<Option<RevisionDescriptor>, UpdateError> {
        (**self).run_update(current_version, bin_path, cancel).await
    }
}
