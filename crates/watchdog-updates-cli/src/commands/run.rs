use std::path::Path;

use anyhow::Result;
use watchdog_updates::{CancellationToken, RevisionDescriptor, UpdateProvider};

use super::format;

/// Run the provider's update step and print the resulting revision, if any.
pub async fn run(
    provider: &dyn UpdateProvider,
    key: &str,
    current_version: Option<&str>,
    bin_path: &Path,
    json: bool,
    cancel: &CancellationToken,
) -> Result<Option<RevisionDescriptor>> {
    let revision = provider
        .run_update(current_version, bin_path, cancel)
        .await?;

    match &revision {
        None => {
            if json {
                println!("null");
            } else {
                println!("[{key}] already up to date, nothing to publish");
            }
        }
        Some(revision) => {
            if json {
                println!("{}", serde_json::to_string_pretty(revision)?);
            } else {
                print!("{}", format::render_revision(revision));
            }
        }
    }

    Ok(revision)
}
