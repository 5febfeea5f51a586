//! Release-cycle containment and downgrade detection

use super::normalize::trim_version_prefix;
use super::select::parse_lax;

/// Check whether `version` belongs to the release line `cycle`.
///
/// Matches on equality or substring first. Otherwise both sides must parse,
/// share a major version, and the cycle's minor (or failing that, patch)
/// must be greater than or equal to the version's. Note the direction: a
/// cycle of `1.21` "contains" `1.3.0` but not `1.22.0`.
pub fn cycle_contains_version(cycle: &str, version: &str) -> bool {
    if cycle.is_empty() || version.is_empty() {
        return false;
    }
    if cycle == version || cycle.contains(version) {
        return true;
    }

    let (Some(cycle_version), Some(target)) = (parse_lax(cycle), parse_lax(version)) else {
        return false;
    };

    if cycle_version.major != target.major {
        return false;
    }
    if cycle_version.minor >= target.minor {
        return true;
    }
    cycle_version.patch >= target.patch
}

/// Returns true when `current` is strictly newer than `latest`
pub fn is_downgrade(current: &str, latest: &str) -> bool {
    if current.is_empty() || latest.is_empty() {
        return false;
    }

    let (Some(current), Some(latest)) = (
        parse_lax(trim_version_prefix(current)),
        parse_lax(trim_version_prefix(latest)),
    ) else {
        return false;
    };

    current.cmp_precedence(&latest).is_gt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_exact_and_substring() {
        assert!(cycle_contains_version("1.21", "1.21"));
        assert!(cycle_contains_version("1.21.6", "1.21"));
        assert!(!cycle_contains_version("", "1.21"));
        assert!(!cycle_contains_version("1.21", ""));
    }

    #[test]
    fn test_cycle_different_major() {
        assert!(!cycle_contains_version("2.0", "1.5.0"));
    }

    #[test]
    fn test_cycle_minor_comparison_direction() {
        // Cycle minor >= version minor.
        assert!(cycle_contains_version("1.21", "1.3.0"));
        assert!(cycle_contains_version("1.21", "1.21.4"));
        // Cycle minor < version minor, falls through to patch: 0 >= 1 is false.
        assert!(!cycle_contains_version("1.21", "1.22.1"));
        // Patch fallback: cycle 1.2.5 vs 1.3.4 -> minor fails, patch 5 >= 4.
        assert!(cycle_contains_version("1.2.5", "1.3.4"));
    }

    #[test]
    fn test_cycle_unparseable() {
        assert!(!cycle_contains_version("bookworm", "1.2.3"));
        assert!(!cycle_contains_version("1.2", "latest"));
    }

    #[test]
    fn test_is_downgrade() {
        assert!(is_downgrade("v2.1.0", "2.0.9"));
        assert!(!is_downgrade("2.0.0", "2.0.1"));
        assert!(!is_downgrade("2.0.0", "v2.0.0"));
        assert!(!is_downgrade("", "1.0.0"));
        assert!(!is_downgrade("abcdef0", "1.0.0"));
    }
}
