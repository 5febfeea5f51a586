//! Concurrent check pass
//!
//! This module provides:
//! - A fixed pool of workers draining a pre-filled job queue
//! - Fail-fast on the first error, with cancellation of outstanding work
//! - Results restored to declaration order
//! - Severity classification with explicitly passed thresholds

mod classify;

pub use classify::{classify, Thresholds, DEFAULT_DANGER_DAYS, DEFAULT_WARNING_DAYS};

use crate::domain::{Dependency, Stack, StackConfig, Status};
use crate::error::{CheckError, TrackerError};
use crate::progress::Progress;
use crate::tracker::{Resolution, ResolveOptions, Tracker, TrackerContext};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Default number of concurrent workers
pub const DEFAULT_WORKERS: usize = 10;

/// Settings shared read-only by every worker of one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckContext {
    pub stack: StackConfig,
    pub thresholds: Thresholds,
    /// Reference date for EOL arithmetic, fixed for the whole pass
    pub today: NaiveDate,
}

impl CheckContext {
    /// Create a context dated today
    pub fn new(stack: StackConfig, thresholds: Thresholds) -> Self {
        Self {
            stack,
            thresholds,
            today: chrono::Local::now().date_naive(),
        }
    }

    /// Override the reference date (builder pattern)
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Resolution settings for one dependency
    pub fn resolve_options(&self, dependency: &Dependency) -> ResolveOptions {
        ResolveOptions::new(self.today)
            .with_offset(dependency.effective_offset(self.stack.offset))
            .with_accept_prerelease(self.stack.accept_prerelease)
    }
}

/// Resolves a dependency against its upstream
#[async_trait]
pub trait StatusResolver: Send + Sync {
    async fn resolve(
        &self,
        dependency: &Dependency,
        options: &ResolveOptions,
    ) -> Result<Resolution, TrackerError>;
}

/// Resolver backed by the tracker declared on each dependency
pub struct TrackerResolver {
    ctx: TrackerContext,
}

impl TrackerResolver {
    pub fn new(ctx: TrackerContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl StatusResolver for TrackerResolver {
    async fn resolve(
        &self,
        dependency: &Dependency,
        options: &ResolveOptions,
    ) -> Result<Resolution, TrackerError> {
        let tracker = Tracker::for_dependency(dependency, &self.ctx);
        tracker.resolve(dependency.current_version(), options).await
    }
}

type Job = (usize, Dependency);
type JobResult = (usize, Result<Status, CheckError>);

/// Concurrent checker with a fixed worker pool
pub struct Checker {
    resolver: Arc<dyn StatusResolver>,
    workers: usize,
}

impl Checker {
    /// Create a checker with the default worker count
    pub fn new(resolver: Arc<dyn StatusResolver>) -> Self {
        Self {
            resolver,
            workers: DEFAULT_WORKERS,
        }
    }

    /// Set the worker count (builder pattern)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Check every dependency, returning statuses in declaration order
    pub async fn check_all(
        &self,
        dependencies: &[Dependency],
        ctx: &CheckContext,
    ) -> Result<Vec<Status>, CheckError> {
        self.check_all_with_progress(dependencies, ctx, &Progress::disabled())
            .await
    }

    /// Same as [`Checker::check_all`], ticking `progress` per finished job
    pub async fn check_all_with_progress(
        &self,
        dependencies: &[Dependency],
        ctx: &CheckContext,
        progress: &Progress,
    ) -> Result<Vec<Status>, CheckError> {
        let total = dependencies.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let (job_tx, job_rx) = mpsc::channel::<Job>(total);
        let (result_tx, mut result_rx) = mpsc::channel::<JobResult>(total);
        let job_rx = Arc::new(Mutex::new(job_rx));
        let cancelled = Arc::new(AtomicBool::new(false));

        let mut workers = JoinSet::new();
        for worker_id in 0..self.workers.min(total) {
            workers.spawn(run_worker(
                worker_id,
                self.resolver.clone(),
                *ctx,
                job_rx.clone(),
                result_tx.clone(),
                cancelled.clone(),
            ));
        }
        drop(result_tx);

        for job in dependencies.iter().cloned().enumerate() {
            job_tx
                .send(job)
                .await
                .map_err(|_| CheckError::Worker {
                    message: "job queue closed early".to_string(),
                })?;
        }
        drop(job_tx);

        let mut statuses: Vec<Option<Status>> = vec![None; total];
        let mut failure = None;
        for _ in 0..total {
            let Some((index, result)) = result_rx.recv().await else {
                failure = Some(CheckError::Worker {
                    message: "workers exited before reporting every dependency".to_string(),
                });
                break;
            };
            progress.inc();
            match result {
                Ok(status) => statuses[index] = Some(status),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        if failure.is_some() {
            cancelled.store(true, Ordering::SeqCst);
            workers.abort_all();
        }
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                if !e.is_cancelled() && failure.is_none() {
                    failure = Some(CheckError::Worker {
                        message: e.to_string(),
                    });
                }
            }
        }

        if let Some(e) = failure {
            return Err(e);
        }

        statuses
            .into_iter()
            .enumerate()
            .map(|(index, status)| {
                status.ok_or_else(|| CheckError::Worker {
                    message: format!("no result for '{}'", dependencies[index].name),
                })
            })
            .collect()
    }
}

async fn run_worker(
    worker_id: usize,
    resolver: Arc<dyn StatusResolver>,
    ctx: CheckContext,
    jobs: Arc<Mutex<mpsc::Receiver<Job>>>,
    results: mpsc::Sender<JobResult>,
    cancelled: Arc<AtomicBool>,
) {
    loop {
        if cancelled.load(Ordering::SeqCst) {
            break;
        }
        let job = jobs.lock().await.recv().await;
        let Some((index, dependency)) = job else {
            break;
        };

        debug!(worker = worker_id, dependency = %dependency, "checking");
        let options = ctx.resolve_options(&dependency);
        let result = resolver
            .resolve(&dependency, &options)
            .await
            .map(|resolution| status_for(&dependency, resolution, &ctx))
            .map_err(|e| CheckError::Tracker {
                dependency: dependency.name.clone(),
                source: e,
            });

        if results.send((index, result)).await.is_err() {
            break;
        }
    }
}

/// Classify a resolution into a status
fn status_for(dependency: &Dependency, resolution: Resolution, ctx: &CheckContext) -> Status {
    let severity = classify(
        dependency.current_version(),
        &resolution.latest_version,
        resolution.eol_date,
        ctx.thresholds,
        ctx.today,
    );
    Status {
        latest_version: resolution.latest_version,
        eol_date: resolution.eol_date,
        link: resolution.link,
        severity,
    }
}

/// Check a loaded stack in place.
///
/// Reads current versions from sources, resolves every dependency, and
/// assigns statuses only when the whole pass succeeds.
pub async fn check_stack(
    stack: &mut Stack,
    checker: &Checker,
    thresholds: Thresholds,
    progress: &Progress,
) -> Result<(), CheckError> {
    stack.resolve_current_versions()?;

    let ctx = CheckContext::new(stack.config(), thresholds);
    let statuses = checker
        .check_all_with_progress(stack.dependencies(), &ctx, progress)
        .await?;

    for (dependency, status) in stack.spec.dependencies.iter_mut().zip(statuses) {
        if dependency.current_version().is_empty() {
            warn!(dependency = %dependency.name, "no current version declared or readable");
        }
        dependency.status = Some(status);
    }
    Ok(())
}
