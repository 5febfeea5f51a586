//! CLI argument parsing module for stackver

use crate::check::{Thresholds, DEFAULT_DANGER_DAYS, DEFAULT_WARNING_DAYS, DEFAULT_WORKERS};
use crate::output::OutputFormat;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Dependency freshness and end-of-life tracker
#[derive(Parser, Debug, Clone)]
#[command(
    name = "stackver",
    about = "Dependency freshness and end-of-life tracker",
    disable_version_flag = true
)]
pub struct CliArgs {
    /// Stack documents to check (can be specified multiple times)
    #[arg(short, long = "file", value_name = "PATH", action = ArgAction::Append, required_unless_present = "print_version")]
    pub files: Vec<PathBuf>,

    // Thresholds
    /// Days before end-of-life at which a dependency becomes a warning
    #[arg(short, long, value_name = "DAYS", default_value_t = DEFAULT_WARNING_DAYS)]
    pub warning_days: i64,

    /// Days before end-of-life at which a dependency becomes dangerous
    #[arg(short, long, value_name = "DAYS", default_value_t = DEFAULT_DANGER_DAYS)]
    pub danger_days: i64,

    // Output options
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Write the report to a file instead of stdout ("-" for stdout)
    #[arg(long, value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    // Update options
    /// Rewrite source files to the resolved versions
    #[arg(long)]
    pub update: bool,

    /// Show what would be updated without making changes
    #[arg(long)]
    pub dry_run: bool,

    // General options
    /// Disable the progress spinner
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long)]
    pub verbose: bool,

    /// GitHub token for API requests
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Number of concurrent tracker lookups
    #[arg(long, value_name = "N", default_value_t = DEFAULT_WORKERS)]
    pub concurrency: usize,

    /// Print version
    #[arg(short = 'v', long = "version")]
    pub print_version: bool,
}

impl CliArgs {
    /// EOL thresholds from the day options
    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.warning_days, self.danger_days)
    }

    /// Whether the update driver runs at all
    pub fn wants_update(&self) -> bool {
        self.update || self.dry_run
    }

    /// Output file, unless it is absent or "-"
    pub fn output_path(&self) -> Option<&PathBuf> {
        self.output_file
            .as_ref()
            .filter(|p| p.as_os_str() != "-")
    }
}
