use watchdog_updates::{Platform, RevisionDescriptor};

use crate::config::InstanceEntry;

const MAX_KEY_WIDTH: usize = 24;
const LINE_BUDGET: usize = 90;

pub fn print_instance_table(instances: &[InstanceEntry]) {
    if instances.is_empty() {
        println!("No instances configured.");
        return;
    }

    let key_width = instances
        .iter()
        .map(|i| i.key.chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_KEY_WIDTH);
    let dir_budget = LINE_BUDGET.saturating_sub(2 + key_width + 2 + 8 + 2);

    for instance in instances {
        let key = truncate(&instance.key, key_width);
        let dir = instance.directory.display().to_string();
        println!(
            "  {:<width$}  {:<8}  {}",
            key,
            instance.update.kind(),
            truncate(&dir, dir_budget),
            width = key_width
        );
    }

    println!("\n{} instances", instances.len());
}

/// Human-readable rendering of a revision, one artifact per line.
pub fn render_revision(revision: &RevisionDescriptor) -> String {
    let mut out = format!("Version:  {}\n", revision.version);

    for platform in Platform::ALL {
        match revision.artifact(platform) {
            Some(pair) => {
                out.push_str(&format!("{:<9} {}\n", format!("{platform}:"), pair.download_url));
                out.push_str(&format!("{:<9} sha256 {}\n", "", pair.sha256));
            }
            None => out.push_str(&format!("{:<9} (not staged)\n", format!("{platform}:"))),
        }
    }

    out
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_owned()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{truncated}…")
    }
}
