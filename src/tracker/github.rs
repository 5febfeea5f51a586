//! GitHub tracker
//!
//! Ranks release tags from the Releases API. Repositories without usable
//! releases fall back to the newest commit's short hash.
//! API endpoints:
//! - https://api.github.com/repos/{owner}/{repo}/releases
//! - https://api.github.com/repos/{owner}/{repo}/commits

use super::{HttpClient, RequestOptions, Resolution, ResolveOptions};
use crate::error::TrackerError;
use crate::version::{select_version, trim_version_prefix};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// Web UI base used for links
const GITHUB_WEB_URL: &str = "https://github.com";

/// Media type recommended by the REST API
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Length of an abbreviated commit hash
const SHORT_SHA_LEN: usize = 7;

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
}

#[derive(Debug, Deserialize)]
struct Commit {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: String,
}

/// GitHub tracker
pub struct GitHubTracker {
    client: HttpClient,
    api_base: String,
    repository: String,
    token: Option<String>,
}

impl GitHubTracker {
    /// Tracker name used in errors and logs
    pub const NAME: &'static str = "github";

    /// Create a new tracker for `owner/repo`
    pub fn new(
        client: HttpClient,
        api_base: impl Into<String>,
        repository: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            repository: repository.into(),
            token: None,
        }
    }

    /// Set the bearer token (builder pattern)
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    fn build_url(&self, resource: &str) -> String {
        format!(
            "{}/repos/{}/{}",
            self.api_base.trim_end_matches('/'),
            self.repository,
            resource
        )
    }

    /// GET an API resource, surfacing the API's error message on failure
    async fn get_api<T: DeserializeOwned>(&self, url: &str) -> Result<T, TrackerError> {
        let options = RequestOptions {
            accept: Some(GITHUB_ACCEPT),
            bearer: self.token.as_deref(),
        };
        let response = self.client.send(url, &options, Self::NAME).await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TrackerError::fetch(Self::NAME, url, e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiMessage>(&body)
                .map(|m| m.message)
                .unwrap_or_else(|_| format!("HTTP {}", status));
            return Err(TrackerError::fetch(Self::NAME, url, message));
        }

        serde_json::from_str(&body)
            .map_err(|e| TrackerError::parse(Self::NAME, url, format!("failed to parse JSON: {}", e)))
    }

    async fn latest_release(&self, options: &ResolveOptions) -> Result<String, TrackerError> {
        let url = self.build_url("releases");
        let releases: Vec<Release> = self.get_api(&url).await?;
        let tags: Vec<String> = releases.into_iter().map(|r| r.tag_name).collect();

        select_version(&tags, options.offset, options.accept_prerelease)
            .map(|tag| trim_version_prefix(&tag).to_string())
            .ok_or_else(|| TrackerError::not_found(Self::NAME, &self.repository, "no selectable release"))
    }

    async fn latest_commit(&self) -> Result<String, TrackerError> {
        let url = self.build_url("commits");
        let commits: Vec<Commit> = self.get_api(&url).await?;
        let commit = commits
            .first()
            .ok_or_else(|| TrackerError::not_found(Self::NAME, &self.repository, "no commits"))?;
        Ok(commit.sha.chars().take(SHORT_SHA_LEN).collect())
    }

    /// Resolve from releases, falling back to the newest commit
    pub async fn resolve(
        &self,
        _current: &str,
        options: &ResolveOptions,
    ) -> Result<Resolution, TrackerError> {
        match self.latest_release(options).await {
            Ok(latest_version) => Ok(Resolution {
                latest_version,
                link: format!("{}/{}/releases", GITHUB_WEB_URL, self.repository),
                eol_date: None,
            }),
            Err(e) => {
                debug!(repository = %self.repository, error = %e, "no usable release, falling back to commits");
                let latest_version = self.latest_commit().await?;
                Ok(Resolution {
                    latest_version,
                    link: format!("{}/{}", GITHUB_WEB_URL, self.repository),
                    eol_date: None,
                })
            }
        }
    }
}
