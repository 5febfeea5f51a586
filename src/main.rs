//! stackver - dependency freshness and end-of-life tracker CLI
//!
//! Reads stack documents, resolves every declared dependency against its
//! upstream tracker, grades it, renders a report and optionally rewrites
//! the source files to the resolved versions.

use anyhow::Context;
use clap::Parser;
use stackver::check::{check_stack, Checker, TrackerResolver};
use stackver::cli::CliArgs;
use stackver::domain::Stack;
use stackver::output::{create_formatter, OutputConfig};
use stackver::progress::Progress;
use stackver::tracker::{HttpClient, TrackerContext};
use stackver::updater::Updater;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "LOG_LEVEL";

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Handle version flag
    if args.print_version {
        println!("stackver {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    init_logging(args.verbose);

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Install the stderr log subscriber
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let client = HttpClient::new()?;
    let ctx = TrackerContext::new(client).with_github_token(args.github_token.clone());
    let checker =
        Checker::new(Arc::new(TrackerResolver::new(ctx))).with_workers(args.concurrency);

    let (mut out, color): (Box<dyn Write>, bool) = match args.output_path() {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            (Box::new(BufWriter::new(file)), false)
        }
        None => (Box::new(io::stdout().lock()), true),
    };
    let formatter = create_formatter(OutputConfig::new(args.output, color));

    for path in &args.files {
        let mut stack = Stack::load(path)?;
        debug!(
            file = %path.display(),
            dependencies = stack.dependencies().len(),
            "loaded stack"
        );

        let mut progress = Progress::new(!args.quiet);
        progress.start(
            stack.dependencies().len() as u64,
            &format!("Checking {}", path.display()),
        );
        let result = check_stack(&mut stack, &checker, args.thresholds(), &progress).await;
        progress.finish_and_clear();
        result.with_context(|| format!("check failed for {}", path.display()))?;

        formatter.format(&stack, &mut out)?;

        if args.wants_update() {
            let plans = Updater::new(args.dry_run)
                .apply(&stack)
                .with_context(|| format!("update failed for {}", path.display()))?;
            formatter.format_updates(&plans, &mut out)?;
        }
    }

    out.flush()?;
    Ok(ExitCode::SUCCESS)
}
