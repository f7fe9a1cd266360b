use anyhow::Result;
use watchdog_updates::{CancellationToken, UpdateProvider};

/// Ask the provider whether `key` is out of date and report the answer.
pub async fn run(
    provider: &dyn UpdateProvider,
    key: &str,
    current_version: Option<&str>,
    cancel: &CancellationToken,
) -> Result<bool> {
    let available = provider.check_for_update(current_version, cancel).await?;
    let shown = current_version.unwrap_or("<none>");

    if available {
        println!(
            "[{key}] update available (current version {shown}, {} provider)",
            provider.label()
        );
    } else {
        println!("[{key}] up to date (version {shown})");
    }

    Ok(available)
}
