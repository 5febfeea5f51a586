//! Severity classification of a resolved dependency

use crate::domain::Severity;
use crate::version::cycle_contains_version;
use chrono::NaiveDate;

/// Default warning window in days
pub const DEFAULT_WARNING_DAYS: i64 = 60;

/// Default danger window in days
pub const DEFAULT_DANGER_DAYS: i64 = 30;

/// End-of-life windows, passed explicitly into every classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub warning_days: i64,
    pub danger_days: i64,
}

impl Thresholds {
    /// Creates thresholds from the two windows
    pub fn new(warning_days: i64, danger_days: i64) -> Self {
        Self {
            warning_days,
            danger_days,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::new(DEFAULT_WARNING_DAYS, DEFAULT_DANGER_DAYS)
    }
}

/// Classify a dependency given its current and latest versions.
///
/// Priority:
/// 1. identical versions are `current`
/// 2. an EOL date grades by days remaining relative to `today`
/// 3. otherwise a lax release-line comparison decides between
///    `current`/`good` and `update-available`
pub fn classify(
    current: &str,
    latest: &str,
    eol_date: Option<NaiveDate>,
    thresholds: Thresholds,
    today: NaiveDate,
) -> Severity {
    if current == latest {
        return Severity::Current;
    }

    if let Some(eol) = eol_date {
        let days_left = (eol - today).num_days();
        return if days_left <= 0 {
            Severity::Critical
        } else if days_left <= thresholds.danger_days {
            Severity::Danger
        } else if days_left <= thresholds.warning_days {
            Severity::Warning
        } else {
            Severity::Good
        };
    }

    if cycle_contains_version(latest, current) {
        if latest.contains(current) {
            Severity::Current
        } else {
            Severity::Good
        }
    } else {
        Severity::UpdateAvailable
    }
}
