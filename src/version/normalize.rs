//! Raw value to version token normalization

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// `name:rest` as found in container image references
static IMAGE_TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^:]+):(.+)$").expect("valid image tag regex"));

/// Semver-shaped substring, optionally `v` prefixed
static SEMVER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v?(\d+\.\d+\.\d+.*)").expect("valid semver regex"));

/// Abbreviated or full commit hash
static COMMIT_HASH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-f0-9]{7,40}$").expect("valid commit hash regex"));

/// Extract a bare version token from a raw scalar value.
///
/// Tried in order: image reference (`nginx:1.21.0` -> `1.21.0`), semver-shaped
/// substring (`v1.2.3` -> `1.2.3`), commit hash (returned unchanged), and
/// finally the trimmed input.
pub fn extract_version(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    if let Some(caps) = IMAGE_TAG_PATTERN.captures(value) {
        let version = &caps[2];
        debug!(value, version, "extracted version from image tag");
        return version.to_string();
    }

    if let Some(caps) = SEMVER_PATTERN.captures(value) {
        let version = &caps[1];
        debug!(value, version, "extracted semver");
        return version.to_string();
    }

    if is_commit_hash(value) {
        debug!(value, "detected commit hash");
        return value.to_string();
    }

    value.trim().to_string()
}

/// Returns true if the value is 7-40 lowercase hex characters
pub fn is_commit_hash(value: &str) -> bool {
    COMMIT_HASH_PATTERN.is_match(value)
}

/// Drop a leading `v` only when it is immediately followed by a digit
pub fn trim_version_prefix(version: &str) -> &str {
    let bytes = version.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'v' && bytes[1].is_ascii_digit() {
        &version[1..]
    } else {
        version
    }
}
