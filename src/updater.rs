//! Update driver: rewrites source files to the resolved versions
//!
//! For each checked dependency whose latest version differs from its
//! current one, every source value is rewritten in place with the version
//! token swapped. Dry-run computes the same plan without writing.

use crate::domain::{Dependency, Stack};
use crate::error::SelectorError;
use crate::selector;
use crate::version::is_downgrade;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Current value that `ignoreLatest` protects
const LATEST_TAG: &str = "latest";

/// One planned (or applied) source rewrite
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatePlan {
    pub dependency: String,
    pub file: PathBuf,
    pub selector: String,
    pub from: String,
    pub to: String,
    /// False in dry-run mode
    pub applied: bool,
}

/// Applies resolved versions to source files
#[derive(Debug, Clone, Copy, Default)]
pub struct Updater {
    dry_run: bool,
}

impl Updater {
    /// Create a new updater
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Returns true if running in dry-run mode
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Rewrite every outdated dependency's sources.
    ///
    /// Dependencies without a status (unchecked) are skipped. The first
    /// selector failure aborts the pass.
    pub fn apply(&self, stack: &Stack) -> Result<Vec<UpdatePlan>, SelectorError> {
        let config = stack.config();
        let mut plans = Vec::new();

        for dependency in stack.dependencies() {
            let Some(status) = &dependency.status else {
                continue;
            };
            let current = dependency.current_version();
            let latest = status.latest_version.as_str();
            if current == latest {
                continue;
            }

            if config.ignore_latest && current == LATEST_TAG {
                warn!(
                    dependency = %dependency.name,
                    "ignoring update: current version is 'latest' (ignoreLatest=true)"
                );
                continue;
            }
            if current.is_empty() {
                warn!(dependency = %dependency.name, "no current version to replace");
                continue;
            }
            if is_downgrade(current, latest) {
                warn!(
                    dependency = %dependency.name,
                    from = %current,
                    to = %latest,
                    "potential downgrade detected (check tracker mapping)"
                );
            }

            plans.extend(self.update_sources(stack, dependency, current, latest)?);
        }

        if plans.is_empty() {
            info!("no updates available");
        }
        Ok(plans)
    }

    fn update_sources(
        &self,
        stack: &Stack,
        dependency: &Dependency,
        current: &str,
        latest: &str,
    ) -> Result<Vec<UpdatePlan>, SelectorError> {
        let mut plans = Vec::new();

        for source in &dependency.sources {
            let path = stack.source_path(&source.file);
            let content = fs::read_to_string(&path).map_err(|e| SelectorError::read(&path, e))?;
            let full_value = selector::read_value_from_str(&content, &source.selector, &path)?;

            if !full_value.contains(current) {
                warn!(
                    dependency = %dependency.name,
                    file = %path.display(),
                    value = %full_value,
                    version = %current,
                    "source value does not contain the current version, skipped"
                );
                continue;
            }
            let new_value = full_value.replacen(current, latest, 1);

            let applied = if self.dry_run {
                // Validates that the rewrite would be unambiguous.
                selector::plan_update(&content, &source.selector, &new_value, &path)?;
                info!(file = %path.display(), from = %full_value, to = %new_value, "would update");
                false
            } else {
                let changed = selector::update_value(&path, &source.selector, &new_value)?;
                debug!(file = %path.display(), changed, "source processed");
                changed
            };

            plans.push(UpdatePlan {
                dependency: dependency.name.clone(),
                file: path,
                selector: source.selector.clone(),
                from: full_value,
                to: new_value,
                applied,
            });
        }
        Ok(plans)
    }
}
