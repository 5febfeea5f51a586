//! Version ranking and offset selection
//!
//! Tags coming from upstream sources are rarely strict semver: they carry
//! `v` prefixes, omit patch components, or mix in prereleases. Parsing here
//! is therefore lax (`1.21` is read as `1.21.0`) while ordering follows
//! semver precedence.

use super::normalize::trim_version_prefix;
use regex::Regex;
use semver::{BuildMetadata, Prerelease, Version};
use std::sync::LazyLock;

/// Substrings that mark a prerelease, matched case-insensitively
const PRERELEASE_KEYWORDS: &[&str] = &[
    "-rc",
    "-alpha",
    "-beta",
    "-dev",
    "-snapshot",
    "-pre",
    ".rc",
    ".alpha",
    ".beta",
];

static LAX_SEMVER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^v?([0-9]+)(?:\.([0-9]+))?(?:\.([0-9]+))?(?:-([0-9A-Za-z\-]+(?:\.[0-9A-Za-z\-]+)*))?(?:\+([0-9A-Za-z\-]+(?:\.[0-9A-Za-z\-]+)*))?$",
    )
    .expect("valid lax semver regex")
});

/// Parse a version leniently, filling in missing minor/patch with zero
pub fn parse_lax(version: &str) -> Option<Version> {
    let caps = LAX_SEMVER_PATTERN.captures(version)?;
    let number = |idx: usize| -> Option<u64> {
        match caps.get(idx) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    let mut parsed = Version::new(number(1)?, number(2)?, number(3)?);
    if let Some(pre) = caps.get(4) {
        parsed.pre = Prerelease::new(pre.as_str()).ok()?;
    }
    if let Some(build) = caps.get(5) {
        parsed.build = BuildMetadata::new(build.as_str()).ok()?;
    }
    Some(parsed)
}

/// Returns true if the version carries a known prerelease marker
pub fn is_prerelease(version: &str) -> bool {
    let lower = version.to_lowercase();
    PRERELEASE_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Select the version `offset` positions below the newest.
///
/// Entries that do not parse (after `v` trimming) are dropped, as are
/// prereleases unless `accept_prerelease` is set. An offset past the end
/// clamps to the oldest candidate. Returns the original, untrimmed string,
/// or `None` when nothing survives filtering.
pub fn select_version<S: AsRef<str>>(
    versions: &[S],
    offset: usize,
    accept_prerelease: bool,
) -> Option<String> {
    let mut candidates: Vec<(Version, &str)> = versions
        .iter()
        .map(AsRef::as_ref)
        .filter(|raw| accept_prerelease || !is_prerelease(raw))
        .filter_map(|raw| parse_lax(trim_version_prefix(raw)).map(|v| (v, raw)))
        .collect();

    if candidates.is_empty() {
        return None;
    }

    candidates.sort_by(|a, b| b.0.cmp_precedence(&a.0));

    let index = offset.min(candidates.len() - 1);
    Some(candidates[index].1.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixed_tags() -> Vec<&'static str> {
        vec![
            "v1.2.0",
            "1.10.0",
            "v2.0.0-rc.1",
            "1.9.3",
            "2.0.0-beta",
            "nightly",
            "v1.10.1",
            "0.9.0",
        ]
    }

    #[test]
    fn test_parse_lax_fills_missing_components() {
        assert_eq!(parse_lax("1.21"), Some(Version::new(1, 21, 0)));
        assert_eq!(parse_lax("7"), Some(Version::new(7, 0, 0)));
        assert_eq!(parse_lax("v3.4.5"), Some(Version::new(3, 4, 5)));
    }

    #[test]
    fn test_parse_lax_keeps_prerelease_and_build() {
        let v = parse_lax("1.2.3-rc.1+build.5").unwrap();
        assert_eq!(v.pre.as_str(), "rc.1");
        assert_eq!(v.build.as_str(), "build.5");
    }

    #[test]
    fn test_parse_lax_rejects_garbage() {
        assert!(parse_lax("latest").is_none());
        assert!(parse_lax("1.2.3.4").is_none());
        assert!(parse_lax("").is_none());
    }

    #[test]
    fn test_is_prerelease() {
        assert!(is_prerelease("v2.0.0-RC1"));
        assert!(is_prerelease("1.0.0-alpha"));
        assert!(is_prerelease("1.0.0.beta2"));
        assert!(is_prerelease("3.1.0-SNAPSHOT"));
        assert!(!is_prerelease("1.0.0"));
        assert!(!is_prerelease("1.0.0-debian-12"));
    }

    #[test]
    fn test_select_newest_stable() {
        assert_eq!(
            select_version(&mixed_tags(), 0, false),
            Some("v1.10.1".to_string())
        );
    }

    #[test]
    fn test_select_with_offset() {
        assert_eq!(
            select_version(&mixed_tags(), 1, false),
            Some("1.10.0".to_string())
        );
        assert_eq!(
            select_version(&mixed_tags(), 2, false),
            Some("1.9.3".to_string())
        );
    }

    #[test]
    fn test_select_offset_clamps_to_oldest() {
        assert_eq!(
            select_version(&mixed_tags(), 99, false),
            Some("0.9.0".to_string())
        );
    }

    #[test]
    fn test_select_accepts_prerelease_when_asked() {
        assert_eq!(
            select_version(&mixed_tags(), 0, true),
            Some("v2.0.0-rc.1".to_string())
        );
        assert_eq!(
            select_version(&mixed_tags(), 1, true),
            Some("2.0.0-beta".to_string())
        );
    }

    #[test]
    fn test_select_release_precedes_prerelease() {
        let tags = ["1.0.0-rc.1", "1.0.0"];
        assert_eq!(select_version(&tags, 0, true), Some("1.0.0".to_string()));
    }

    #[test]
    fn test_select_empty_when_nothing_survives() {
        let tags = ["latest", "main", "1.0.0-rc.1"];
        assert_eq!(select_version(&tags, 0, false), None);
        let none: [&str; 0] = [];
        assert_eq!(select_version(&none, 0, false), None);
    }

    #[test]
    fn test_select_accepts_owned_strings() {
        let tags = vec!["v0.1.0".to_string(), "v0.2.0".to_string()];
        assert_eq!(select_version(&tags, 0, false), Some("v0.2.0".to_string()));
    }
}
