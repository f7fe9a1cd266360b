use url::Url;

use crate::provider::UpdateError;
use crate::revision::Platform;

/// Placeholder substituted with [`Platform::name`] in filename templates.
pub const PLATFORM_PLACEHOLDER: &str = "{platform}";

/// Default artifact naming: `windows_build.zip`, `linux_build.zip`, `macos_build.zip`.
pub const DEFAULT_FILENAME_TEMPLATE: &str = "{platform}_build.zip";

/// Check that a template maps every platform to a distinct, plain filename.
pub fn validate_template(template: &str) -> Result<(), UpdateError> {
    if !template.contains(PLATFORM_PLACEHOLDER) {
        return Err(UpdateError::Config(format!(
            "filename template {template:?} must contain {PLATFORM_PLACEHOLDER}"
        )));
    }
    if template.contains('/') || template.contains('\\') {
        return Err(UpdateError::Config(format!(
            "filename template {template:?} must not contain path separators"
        )));
    }
    Ok(())
}

/// Expected on-disk (and served) filename of the artifact for `platform`.
pub fn artifact_filename(template: &str, platform: Platform) -> String {
    template.replace(PLATFORM_PLACEHOLDER, platform.name())
}

/// Public URL prefix for an instance's binaries: `<base>/instances/<key>/binaries/`.
///
/// Built segment by segment, so a trailing slash on `base` makes no difference
/// and `key` is always a single percent-encoded segment.
pub fn binaries_root(base: &Url, instance_key: &str) -> Result<Url, UpdateError> {
    if instance_key.is_empty() {
        return Err(UpdateError::Config("instance key must not be empty".into()));
    }
    // `.` and `..` would be swallowed by path normalisation, dropping the key.
    if matches!(instance_key, "." | "..") {
        return Err(UpdateError::Config(format!(
            "instance key {instance_key:?} is not a valid URL path segment"
        )));
    }

    let mut root = base.clone();
    root.set_query(None);
    root.set_fragment(None);
    root.path_segments_mut()
        .map_err(|()| UpdateError::InvalidBaseUrl(base.to_string()))?
        .pop_if_empty()
        .extend(["instances", instance_key, "binaries", ""]);
    Ok(root)
}

/// URL of a single artifact under a [`binaries_root`] prefix.
pub fn artifact_url(binaries_root: &Url, filename: &str) -> Result<Url, UpdateError> {
    let mut url = binaries_root.clone();
    url.path_segments_mut()
        .map_err(|()| UpdateError::InvalidBaseUrl(binaries_root.to_string()))?
        .pop_if_empty()
        .push(filename);
    Ok(url)
}
