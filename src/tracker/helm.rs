//! Helm repository tracker
//!
//! URI form: `{repository-url}/{chart}`; versions come from
//! `{repository-url}/index.yaml`.

use super::{HttpClient, RequestOptions, Resolution, ResolveOptions};
use crate::error::TrackerError;
use crate::version::select_version;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct RepositoryIndex {
    #[serde(default)]
    entries: HashMap<String, Vec<ChartEntry>>,
}

#[derive(Debug, Deserialize)]
struct ChartEntry {
    #[serde(default)]
    version: serde_yaml::Value,
}

impl ChartEntry {
    fn version_string(&self) -> Option<String> {
        match &self.version {
            serde_yaml::Value::String(s) => Some(s.clone()),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Helm repository tracker
pub struct HelmTracker {
    client: HttpClient,
    uri: String,
}

impl HelmTracker {
    /// Tracker name used in errors and logs
    pub const NAME: &'static str = "helm";

    /// Create a new tracker for `{repository-url}/{chart}`
    pub fn new(client: HttpClient, uri: impl Into<String>) -> Self {
        Self {
            client,
            uri: uri.into(),
        }
    }

    /// Split the URI into repository URL and chart name
    fn split_uri(&self) -> Result<(String, &str), TrackerError> {
        let trimmed = self.uri.trim().trim_end_matches('/');
        let (repository, chart) = trimmed
            .rsplit_once('/')
            .filter(|(repo, chart)| !repo.is_empty() && !chart.is_empty())
            .ok_or_else(|| {
                TrackerError::parse(Self::NAME, &self.uri, "expected '<repository-url>/<chart>'")
            })?;

        let repository = if repository.starts_with("http://") || repository.starts_with("https://") {
            repository.to_string()
        } else {
            format!("https://{}", repository)
        };
        Ok((repository, chart))
    }

    /// Resolve the offset-selected chart version
    pub async fn resolve(
        &self,
        _current: &str,
        options: &ResolveOptions,
    ) -> Result<Resolution, TrackerError> {
        let (repository, chart) = self.split_uri()?;
        let url = format!("{}/index.yaml", repository);

        let body = self
            .client
            .get_text(&url, &RequestOptions::default(), Self::NAME)
            .await?;
        let index: RepositoryIndex = serde_yaml::from_str(&body)
            .map_err(|e| TrackerError::parse(Self::NAME, &url, format!("invalid index: {}", e)))?;

        let entries = index
            .entries
            .get(chart)
            .filter(|entries| !entries.is_empty())
            .ok_or_else(|| {
                TrackerError::not_found(Self::NAME, &self.uri, format!("chart '{}' not in index", chart))
            })?;

        let versions: Vec<String> = entries.iter().filter_map(ChartEntry::version_string).collect();
        debug!(chart = %chart, count = versions.len(), "read chart versions");

        let latest_version = select_version(&versions, options.offset, options.accept_prerelease)
            .ok_or_else(|| TrackerError::not_found(Self::NAME, &self.uri, "no selectable chart version"))?;

        Ok(Resolution {
            latest_version,
            link: format!("{}/", repository),
            eol_date: None,
        })
    }
}
