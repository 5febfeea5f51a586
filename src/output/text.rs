//! Text output formatter for human-readable display

use crate::domain::{Severity, Stack};
use crate::output::{row, OutputFormatter, COLUMNS};
use crate::updater::UpdatePlan;
use colored::Colorize;
use std::io::Write;

/// Space between columns
const COLUMN_GAP: usize = 3;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint_severity(&self, severity: &str, padded: String) -> String {
        if !self.color {
            return padded;
        }
        match severity {
            s if s == Severity::Current.as_str() => padded.green().to_string(),
            s if s == Severity::Good.as_str() => padded.green().to_string(),
            s if s == Severity::UpdateAvailable.as_str() => padded.cyan().to_string(),
            s if s == Severity::Warning.as_str() => padded.yellow().to_string(),
            s if s == Severity::Danger.as_str() => padded.red().to_string(),
            s if s == Severity::Critical.as_str() => padded.red().bold().to_string(),
            _ => padded,
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, stack: &Stack, writer: &mut dyn Write) -> std::io::Result<()> {
        let rows: Vec<[String; 6]> = stack.dependencies().iter().map(row).collect();

        let mut widths = COLUMNS.map(str::len);
        for r in &rows {
            for (width, cell) in widths.iter_mut().zip(r.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let header: Vec<String> = COLUMNS
            .iter()
            .zip(widths.iter())
            .map(|(name, width)| format!("{:<width$}", name, width = width))
            .collect();
        let header = header.join(&" ".repeat(COLUMN_GAP));
        if self.color {
            writeln!(writer, "{}", header.trim_end().bold())?;
        } else {
            writeln!(writer, "{}", header.trim_end())?;
        }

        for r in &rows {
            let cells: Vec<String> = r
                .iter()
                .zip(widths.iter())
                .enumerate()
                .map(|(i, (cell, width))| {
                    let padded = format!("{:<width$}", cell, width = width);
                    if i == 4 {
                        self.paint_severity(cell, padded)
                    } else {
                        padded
                    }
                })
                .collect();
            writeln!(writer, "{}", cells.join(&" ".repeat(COLUMN_GAP)).trim_end())?;
        }
        Ok(())
    }

    fn format_updates(&self, plans: &[UpdatePlan], writer: &mut dyn Write) -> std::io::Result<()> {
        if plans.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "No updates available")?;
            return Ok(());
        }

        writeln!(writer)?;
        for plan in plans {
            let prefix = if plan.applied { "Updated" } else { "(dry-run) Would update" };
            let prefix = if self.color {
                if plan.applied {
                    prefix.green().to_string()
                } else {
                    prefix.cyan().to_string()
                }
            } else {
                prefix.to_string()
            };
            writeln!(
                writer,
                "{} {} in {}: {} -> {}",
                prefix,
                plan.dependency,
                plan.file.display(),
                plan.from,
                plan.to
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures::checked_stack;
    use std::path::PathBuf;

    fn render(stack: &Stack) -> String {
        let mut out = Vec::new();
        TextFormatter::new(false).format(stack, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_header_and_rows() {
        let text = render(&checked_stack());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Name"));
        assert!(lines[0].contains("EOL Date"));
        assert!(lines[1].starts_with("nginx"));
        assert!(lines[1].contains("update-available"));
        assert!(lines[2].contains("2024-11-14"));
        assert!(lines[1].contains("unknown"));
    }

    #[test]
    fn test_columns_are_aligned() {
        let text = render(&checked_stack());
        let lines: Vec<&str> = text.lines().collect();
        let latest_col = lines[0].find("Latest").unwrap();
        assert_eq!(&lines[1][latest_col..latest_col + 6], "1.27.0");
        assert_eq!(&lines[2][latest_col..latest_col + 4], "16.3");
    }

    #[test]
    fn test_format_updates() {
        let plans = vec![UpdatePlan {
            dependency: "nginx".to_string(),
            file: PathBuf::from("deploy.yaml"),
            selector: "$.image".to_string(),
            from: "nginx:1.25.3".to_string(),
            to: "nginx:1.27.0".to_string(),
            applied: false,
        }];
        let mut out = Vec::new();
        TextFormatter::new(false).format_updates(&plans, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("(dry-run) Would update nginx in deploy.yaml: nginx:1.25.3 -> nginx:1.27.0"));
    }

    #[test]
    fn test_format_updates_empty() {
        let mut out = Vec::new();
        TextFormatter::new(false).format_updates(&[], &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("No updates available"));
    }
}
