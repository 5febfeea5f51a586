//! Git remote tracker
//!
//! Lists the tags of a remote without cloning (`git ls-remote --tags`) and
//! ranks them.

use super::{Resolution, ResolveOptions};
use crate::error::TrackerError;
use crate::version::{select_version, trim_version_prefix};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::process::Command;
use tracing::debug;

/// Prefix of tag refs in `ls-remote` output
const TAG_REF_PREFIX: &str = "refs/tags/";

/// Suffix of peeled annotated-tag entries
const PEELED_SUFFIX: &str = "^{}";

/// Capability to list the tags of a remote repository
#[async_trait]
pub trait RemoteTagLister: Send + Sync {
    /// Returns raw `<hash>\trefs/tags/<tag>` lines
    async fn list_tags(&self, uri: &str) -> Result<String, TrackerError>;
}

/// Lists tags by running the `git` executable
#[derive(Debug, Clone, Default)]
pub struct GitCli;

#[async_trait]
impl RemoteTagLister for GitCli {
    async fn list_tags(&self, uri: &str) -> Result<String, TrackerError> {
        let output = Command::new("git")
            .args(["ls-remote", "--tags", uri])
            .output()
            .await
            .map_err(|e| {
                TrackerError::fetch(GitTracker::NAME, uri, format!("failed to run git: {}", e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TrackerError::fetch(
                GitTracker::NAME,
                uri,
                format!("git ls-remote failed: {}", stderr.trim()),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Extract tag names from `ls-remote` output, skipping peeled entries
pub fn parse_ls_remote(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split_once('\t'))
        .filter_map(|(_, reference)| reference.trim().strip_prefix(TAG_REF_PREFIX))
        .filter(|tag| !tag.ends_with(PEELED_SUFFIX))
        .map(str::to_string)
        .collect()
}

/// Git remote tracker
pub struct GitTracker {
    lister: Arc<dyn RemoteTagLister>,
    uri: String,
}

impl GitTracker {
    /// Tracker name used in errors and logs
    pub const NAME: &'static str = "git";

    /// Create a new tracker for a remote URI
    pub fn new(lister: Arc<dyn RemoteTagLister>, uri: impl Into<String>) -> Self {
        Self {
            lister,
            uri: uri.into(),
        }
    }

    /// Resolve the offset-selected tag
    pub async fn resolve(
        &self,
        _current: &str,
        options: &ResolveOptions,
    ) -> Result<Resolution, TrackerError> {
        let output = self.lister.list_tags(&self.uri).await?;
        let tags = parse_ls_remote(&output);
        debug!(uri = %self.uri, count = tags.len(), "listed remote tags");

        if tags.is_empty() {
            return Err(TrackerError::not_found(Self::NAME, &self.uri, "no tags"));
        }

        let selected = select_version(&tags, options.offset, options.accept_prerelease)
            .ok_or_else(|| TrackerError::not_found(Self::NAME, &self.uri, "no selectable tag"))?;

        Ok(Resolution {
            latest_version: trim_version_prefix(&selected).to_string(),
            link: self.uri.clone(),
            eol_date: None,
        })
    }
}
