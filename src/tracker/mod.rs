//! Tracker backends for resolving upstream versions
//!
//! This module provides:
//! - HTTP client shared foundation
//! - endoflife.date tracker (latest release + EOL date of the current cycle)
//! - GitHub tracker (releases, falling back to commits)
//! - Git remote tracker (`ls-remote` tags)
//! - Helm repository tracker (`index.yaml`)
//! - OCI registry tracker (distribution API, Harbor fallback)

mod client;
mod endoflife;
mod git;
mod github;
mod helm;
mod oci;

pub use client::{HttpClient, RequestOptions};
pub use endoflife::EndOfLifeTracker;
pub use git::{parse_ls_remote, GitCli, GitTracker, RemoteTagLister};
pub use github::GitHubTracker;
pub use helm::HelmTracker;
pub use oci::OciTracker;

use crate::domain::{Dependency, TrackerKind};
use crate::error::TrackerError;
use chrono::NaiveDate;
use std::sync::Arc;

/// Production endoflife.date API base
pub const DEFAULT_ENDOFLIFE_API: &str = "https://endoflife.date/api";

/// Production GitHub REST API base
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

/// Outcome of resolving one dependency against its upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub latest_version: String,
    pub link: String,
    pub eol_date: Option<NaiveDate>,
}

/// Per-call resolution settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Distance from the newest version
    pub offset: usize,
    /// Rank prerelease tags too
    pub accept_prerelease: bool,
    /// Date used when an upstream reports "already end of life"
    pub today: NaiveDate,
}

impl ResolveOptions {
    /// Creates options selecting the newest stable version
    pub fn new(today: NaiveDate) -> Self {
        Self {
            offset: 0,
            accept_prerelease: false,
            today,
        }
    }

    /// Sets the offset (builder pattern)
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Sets prerelease acceptance (builder pattern)
    pub fn with_accept_prerelease(mut self, accept: bool) -> Self {
        self.accept_prerelease = accept;
        self
    }
}

/// API base URLs, overridable for testing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub endoflife_api: String,
    pub github_api: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            endoflife_api: DEFAULT_ENDOFLIFE_API.to_string(),
            github_api: DEFAULT_GITHUB_API.to_string(),
        }
    }
}

/// Shared collaborators handed to every tracker
#[derive(Clone)]
pub struct TrackerContext {
    pub client: HttpClient,
    pub endpoints: Endpoints,
    pub github_token: Option<String>,
    pub tag_lister: Arc<dyn RemoteTagLister>,
}

impl TrackerContext {
    /// Create a context with production endpoints and the git CLI
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            endpoints: Endpoints::default(),
            github_token: None,
            tag_lister: Arc::new(GitCli),
        }
    }

    /// Set the API endpoints (builder pattern)
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Set the GitHub token (builder pattern)
    pub fn with_github_token(mut self, token: Option<String>) -> Self {
        self.github_token = token;
        self
    }

    /// Set the remote tag lister (builder pattern)
    pub fn with_tag_lister(mut self, lister: Arc<dyn RemoteTagLister>) -> Self {
        self.tag_lister = lister;
        self
    }
}

/// A tracker backend, constructed from a dependency's declaration
pub enum Tracker {
    EndOfLife(EndOfLifeTracker),
    GitHub(GitHubTracker),
    Git(GitTracker),
    Helm(HelmTracker),
    Oci(OciTracker),
}

impl Tracker {
    /// Build the backend declared by a dependency.
    ///
    /// An empty URI falls back to the dependency name.
    pub fn for_dependency(dependency: &Dependency, ctx: &TrackerContext) -> Self {
        let uri = dependency.tracker_uri();
        match dependency.tracker.kind {
            TrackerKind::EndOfLife => Tracker::EndOfLife(EndOfLifeTracker::new(
                ctx.client.clone(),
                &ctx.endpoints.endoflife_api,
                uri,
            )),
            TrackerKind::GitHub => Tracker::GitHub(
                GitHubTracker::new(ctx.client.clone(), &ctx.endpoints.github_api, uri)
                    .with_token(ctx.github_token.clone()),
            ),
            TrackerKind::Git => Tracker::Git(GitTracker::new(ctx.tag_lister.clone(), uri)),
            TrackerKind::Helm => Tracker::Helm(HelmTracker::new(ctx.client.clone(), uri)),
            TrackerKind::Oci => Tracker::Oci(OciTracker::new(ctx.client.clone(), uri)),
        }
    }

    /// Kind of this backend
    pub fn kind(&self) -> TrackerKind {
        match self {
            Tracker::EndOfLife(_) => TrackerKind::EndOfLife,
            Tracker::GitHub(_) => TrackerKind::GitHub,
            Tracker::Git(_) => TrackerKind::Git,
            Tracker::Helm(_) => TrackerKind::Helm,
            Tracker::Oci(_) => TrackerKind::Oci,
        }
    }

    /// Resolve the latest (offset-selected) version, link and EOL date
    pub async fn resolve(
        &self,
        current: &str,
        options: &ResolveOptions,
    ) -> Result<Resolution, TrackerError> {
        match self {
            Tracker::EndOfLife(t) => t.resolve(current, options).await,
            Tracker::GitHub(t) => t.resolve(current, options).await,
            Tracker::Git(t) => t.resolve(current, options).await,
            Tracker::Helm(t) => t.resolve(current, options).await,
            Tracker::Oci(t) => t.resolve(current, options).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TrackerSpec;

    fn ctx() -> TrackerContext {
        TrackerContext::new(HttpClient::new().unwrap())
    }

    #[test]
    fn test_tracker_for_each_kind() {
        let kinds = [
            TrackerKind::EndOfLife,
            TrackerKind::GitHub,
            TrackerKind::Git,
            TrackerKind::Helm,
            TrackerKind::Oci,
        ];
        for kind in kinds {
            let dep = Dependency::new("x", TrackerSpec::new(kind, "a/b"));
            assert_eq!(Tracker::for_dependency(&dep, &ctx()).kind(), kind);
        }
    }

    #[test]
    fn test_default_kind_is_endoflife() {
        let dep = Dependency::new("postgresql", TrackerSpec::default());
        assert_eq!(Tracker::for_dependency(&dep, &ctx()).kind(), TrackerKind::EndOfLife);
    }

    #[test]
    fn test_default_endpoints() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.endoflife_api, "https://endoflife.date/api");
        assert_eq!(endpoints.github_api, "https://api.github.com");
    }

    #[tokio::test]
    async fn test_empty_uri_uses_dependency_name() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/redis.json")
            .with_status(200)
            .with_body(r#"[{"cycle":"7.2","latest":"7.2.5","eol":false}]"#)
            .create_async()
            .await;

        let context = ctx().with_endpoints(Endpoints {
            endoflife_api: server.url(),
            github_api: server.url(),
        });
        let dep = Dependency::new("redis", TrackerSpec::default());
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let res = Tracker::for_dependency(&dep, &context)
            .resolve("7.2.4", &ResolveOptions::new(today))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(res.latest_version, "7.2.5");
    }
}
