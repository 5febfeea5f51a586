//! Resolved status types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Staleness / end-of-life severity, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    /// Running the resolved latest version
    Current,
    /// Behind, but the release line is supported or still covers latest
    Good,
    /// A newer release line is available
    UpdateAvailable,
    /// End of life within the warning window
    Warning,
    /// End of life within the danger window
    Danger,
    /// End of life has passed
    Critical,
}

impl Severity {
    /// Numeric code used by monitoring exports
    pub fn code(&self) -> u8 {
        match self {
            Severity::Current => 0,
            Severity::Good => 1,
            Severity::UpdateAvailable => 2,
            Severity::Warning => 3,
            Severity::Danger => 4,
            Severity::Critical => 5,
        }
    }

    /// Returns the serialized name
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Current => "current",
            Severity::Good => "good",
            Severity::UpdateAvailable => "update-available",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
            Severity::Critical => "critical",
        }
    }

    /// Returns all grades in ascending order
    pub fn all() -> &'static [Severity] {
        &[
            Severity::Current,
            Severity::Good,
            Severity::UpdateAvailable,
            Severity::Warning,
            Severity::Danger,
            Severity::Critical,
        ]
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of checking one dependency against its upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    /// Resolved latest (or offset-selected) version
    pub latest_version: String,
    /// End-of-life date of the current version's release line
    #[serde(
        rename = "currentVersionEOLDate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub eol_date: Option<NaiveDate>,
    /// Link to the upstream source
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub link: String,
    /// Severity grade
    #[serde(rename = "status")]
    pub severity: Severity,
}

impl Status {
    /// EOL date as `YYYY-MM-DD`, or `unknown`
    pub fn eol_display(&self) -> String {
        self.eol_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}
