//! OCI registry tracker
//!
//! URI form: `[scheme://]registry/repository`. Tags are read from the
//! distribution API, with a Harbor artifacts endpoint as fallback:
//! - {registry}/v2/{repository}/tags/list
//! - {registry}/api/v2.0/projects/{project}/repositories/{name}/artifacts

use super::{HttpClient, RequestOptions, Resolution, ResolveOptions};
use crate::error::TrackerError;
use crate::version::{select_version, trim_version_prefix};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::debug;

/// Project assumed for single-segment repositories on Harbor
const DEFAULT_PROJECT: &str = "library";

#[derive(Debug, Deserialize)]
struct TagList {
    #[serde(default)]
    tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct HarborArtifact {
    #[serde(default)]
    tags: Option<Vec<HarborTag>>,
}

#[derive(Debug, Deserialize)]
struct HarborTag {
    name: String,
}

/// Parsed `[scheme://]registry/repository`
#[derive(Debug, Clone, PartialEq, Eq)]
struct Reference {
    scheme: String,
    registry: String,
    repository: String,
}

impl Reference {
    fn parse(uri: &str) -> Option<Self> {
        let uri = uri.trim();
        let (scheme, rest) = match uri.split_once("://") {
            Some((scheme, rest)) => (scheme.to_string(), rest),
            None => ("https".to_string(), uri),
        };
        let (registry, repository) = rest.trim_end_matches('/').split_once('/')?;
        if registry.is_empty() || repository.is_empty() {
            return None;
        }
        Some(Self {
            scheme,
            registry: registry.to_string(),
            repository: repository.to_string(),
        })
    }

    fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.registry)
    }

    fn tags_list_url(&self) -> String {
        format!("{}/v2/{}/tags/list", self.base_url(), self.repository)
    }

    fn harbor_artifacts_url(&self) -> String {
        let (project, name) = self
            .repository
            .split_once('/')
            .unwrap_or((DEFAULT_PROJECT, self.repository.as_str()));
        format!(
            "{}/api/v2.0/projects/{}/repositories/{}/artifacts",
            self.base_url(),
            project,
            name.replace('/', "%2F")
        )
    }
}

/// Read tags from either a Harbor artifacts array or a tags-list object
fn parse_tags(body: &str) -> Option<Vec<String>> {
    if let Ok(artifacts) = serde_json::from_str::<Vec<HarborArtifact>>(body) {
        return Some(
            artifacts
                .into_iter()
                .flat_map(|a| a.tags.unwrap_or_default())
                .map(|t| t.name)
                .collect(),
        );
    }
    serde_json::from_str::<TagList>(body)
        .ok()
        .map(|list| list.tags.unwrap_or_default())
}

/// OCI registry tracker
pub struct OciTracker {
    client: HttpClient,
    uri: String,
}

impl OciTracker {
    /// Tracker name used in errors and logs
    pub const NAME: &'static str = "oci";

    /// Create a new tracker for `[scheme://]registry/repository`
    pub fn new(client: HttpClient, uri: impl Into<String>) -> Self {
        Self {
            client,
            uri: uri.into(),
        }
    }

    /// Collect tags from the first endpoint that yields any
    async fn fetch_tags(&self, reference: &Reference) -> Result<Vec<String>, TrackerError> {
        let endpoints = [reference.tags_list_url(), reference.harbor_artifacts_url()];
        let mut last_error = None;

        for url in &endpoints {
            let body = match self
                .client
                .get_text(url, &RequestOptions::default(), Self::NAME)
                .await
            {
                Ok(body) => body,
                Err(e) => {
                    debug!(url = %url, error = %e, "tag endpoint failed");
                    last_error = Some(e);
                    continue;
                }
            };

            match parse_tags(&body) {
                Some(tags) if !tags.is_empty() => {
                    let mut seen = HashSet::new();
                    return Ok(tags.into_iter().filter(|t| seen.insert(t.clone())).collect());
                }
                Some(_) => {
                    last_error = Some(TrackerError::not_found(Self::NAME, &self.uri, "no tags"));
                }
                None => {
                    last_error = Some(TrackerError::parse(
                        Self::NAME,
                        url,
                        "neither an artifacts list nor a tags list",
                    ));
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| TrackerError::not_found(Self::NAME, &self.uri, "no tags")))
    }

    /// Resolve the offset-selected tag
    pub async fn resolve(
        &self,
        _current: &str,
        options: &ResolveOptions,
    ) -> Result<Resolution, TrackerError> {
        let reference = Reference::parse(&self.uri).ok_or_else(|| {
            TrackerError::parse(Self::NAME, &self.uri, "expected '<registry>/<repository>'")
        })?;

        let tags = self.fetch_tags(&reference).await?;
        let selected = select_version(&tags, options.offset, options.accept_prerelease)
            .ok_or_else(|| TrackerError::not_found(Self::NAME, &self.uri, "no selectable tag"))?;

        Ok(Resolution {
            latest_version: trim_version_prefix(&selected).to_string(),
            link: format!("https://{}/{}", reference.registry, reference.repository),
            eol_date: None,
        })
    }
}
