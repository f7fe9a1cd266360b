use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::{RevisionDescriptor, UpdateError, UpdateProvider};

/// Provider for testing. Always offers the same revision and never touches disk.
pub struct StaticUpdateProvider {
    label: String,
    revision: RevisionDescriptor,
}

impl StaticUpdateProvider {
    pub fn new(label: impl Into<String>, revision: RevisionDescriptor) -> Self {
        Self {
            label: label.into(),
            revision,
        }
    }
}

#[async_trait::async_trait]
impl UpdateProvider for StaticUpdateProvider {
    fn label(&self) -> &str {
        &self.label
    }

    async fn check_for_update(
        &self,
        current_version: Option<&str>,
        _cancel: &CancellationToken,
    ) -> Result<bool, UpdateError> {
        Ok(current_version != Some(self.revision.version.as_str()))
    }

    async fn run_update(
        &self,
        current_version: Option<&str>,
        _bin_path: &Path,
        cancel: &CancellationToken,
    ) -> Result<Option<RevisionDescriptor>, UpdateError> {
        if current_version == Some(self.revision.version.as_str()) {
            return Ok(None);
        }
        if cancel.is_cancelled() {
            return Err(UpdateError::Cancelled);
        }
        Ok(Some(self.revision.clone()))
    }
}
