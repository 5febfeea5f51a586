//! Output formatting for check results
//!
//! This module provides:
//! - Text table for human-readable display
//! - CSV with the same columns
//! - JSON/YAML rendering of the checked stack document
//! - Prometheus textfile gauge for monitoring

mod csv;
mod document;
mod prometheus;
mod text;

pub use self::csv::CsvFormatter;
pub use document::{DocumentFormatter, DocumentKind};
pub use prometheus::PrometheusFormatter;
pub use text::TextFormatter;

use crate::domain::{Dependency, Stack};
use crate::updater::UpdatePlan;
use clap::ValueEnum;
use std::io::Write;

/// Column headers shared by the tabular formats
pub const COLUMNS: [&str; 6] = ["Name", "Version", "Latest", "EOL Date", "Status", "Link"];

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Aligned, coloured table
    #[default]
    Text,
    /// Checked stack document as JSON
    Json,
    /// Checked stack document as YAML
    Yaml,
    /// Comma-separated values
    Csv,
    /// Prometheus textfile collector format
    Prometheus,
}

/// Configuration for output formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Whether to use colors (text only)
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: true,
        }
    }
}

impl OutputConfig {
    /// Create a new output configuration
    pub fn new(format: OutputFormat, color: bool) -> Self {
        Self { format, color }
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format and write a checked stack
    fn format(&self, stack: &Stack, writer: &mut dyn Write) -> std::io::Result<()>;

    /// Format and write the outcome of an update pass.
    ///
    /// Machine-readable formats keep their output stable and write nothing.
    fn format_updates(&self, _plans: &[UpdatePlan], _writer: &mut dyn Write) -> std::io::Result<()> {
        Ok(())
    }
}

/// Create an output formatter based on configuration
pub fn create_formatter(config: OutputConfig) -> Box<dyn OutputFormatter> {
    match config.format {
        OutputFormat::Text => Box::new(TextFormatter::new(config.color)),
        OutputFormat::Json => Box::new(DocumentFormatter::new(DocumentKind::Json)),
        OutputFormat::Yaml => Box::new(DocumentFormatter::new(DocumentKind::Yaml)),
        OutputFormat::Csv => Box::new(CsvFormatter),
        OutputFormat::Prometheus => Box::new(PrometheusFormatter),
    }
}

/// One table row per dependency, in declaration order
pub(crate) fn row(dependency: &Dependency) -> [String; 6] {
    let version = match dependency.current_version() {
        "" => "unknown".to_string(),
        v => v.to_string(),
    };
    match &dependency.status {
        Some(status) => [
            dependency.name.clone(),
            version,
            status.latest_version.clone(),
            status.eol_display(),
            status.severity.to_string(),
            status.link.clone(),
        ],
        None => [
            dependency.name.clone(),
            version,
            "-".to_string(),
            "unknown".to_string(),
            "-".to_string(),
            String::new(),
        ],
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TrackerSpec;

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }

    #[test]
    fn test_output_format_value_names() {
        assert_eq!(
            OutputFormat::from_str("prometheus", true).unwrap(),
            OutputFormat::Prometheus
        );
        assert_eq!(OutputFormat::from_str("CSV", true).unwrap(), OutputFormat::Csv);
        assert!(OutputFormat::from_str("xml", true).is_err());
    }

    #[test]
    fn test_output_config_default() {
        let config = OutputConfig::default();
        assert_eq!(config.format, OutputFormat::Text);
        assert!(config.color);
    }

    #[test]
    fn test_row_for_checked_dependency() {
        let stack = fixtures::checked_stack();
        let r = row(&stack.dependencies()[1]);
        assert_eq!(r[0], "postgresql");
        assert_eq!(r[3], "2024-11-14");
        assert_eq!(r[4], "danger");
    }

    #[test]
    fn test_row_for_unchecked_dependency() {
        let dep = Dependency::new("x", TrackerSpec::default());
        let r = row(&dep);
        assert_eq!(r[1], "unknown");
        assert_eq!(r[2], "-");
    }

    #[test]
    fn test_create_formatter_for_each_format() {
        let stack = fixtures::checked_stack();
        for format in OutputFormat::value_variants() {
            let formatter = create_formatter(OutputConfig::new(*format, false));
            let mut out = Vec::new();
            formatter.format(&stack, &mut out).unwrap();
            assert!(!out.is_empty());
        }
    }
}
