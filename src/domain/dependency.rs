//! Declared dependency structures

use super::Status;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Upstream source kind for a dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum TrackerKind {
    /// endoflife.date release-cycle registry
    #[default]
    EndOfLife,
    /// GitHub releases, falling back to commits
    GitHub,
    /// Tags of a raw git remote
    Git,
    /// Helm repository index
    Helm,
    /// OCI registry tags
    Oci,
}

impl TrackerKind {
    /// Returns the name used in stack documents
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackerKind::EndOfLife => "endoflife",
            TrackerKind::GitHub => "github",
            TrackerKind::Git => "git",
            TrackerKind::Helm => "helm",
            TrackerKind::Oci => "oci",
        }
    }
}

impl From<String> for TrackerKind {
    /// Unknown or empty kinds fall back to the end-of-life tracker
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "github" => TrackerKind::GitHub,
            "git" => TrackerKind::Git,
            "helm" => TrackerKind::Helm,
            "oci" => TrackerKind::Oci,
            _ => TrackerKind::EndOfLife,
        }
    }
}

impl From<Option<String>> for TrackerKind {
    fn from(value: Option<String>) -> Self {
        value.map(TrackerKind::from).unwrap_or_default()
    }
}

impl fmt::Display for TrackerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracker declaration: which upstream to poll and where
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerSpec {
    #[serde(default)]
    pub kind: TrackerKind,
    #[serde(default)]
    pub uri: String,
}

impl TrackerSpec {
    /// Creates a new tracker spec
    pub fn new(kind: TrackerKind, uri: impl Into<String>) -> Self {
        Self {
            kind,
            uri: uri.into(),
        }
    }

    /// The declared URI, or the dependency name when none was given
    pub fn effective_uri<'a>(&'a self, dependency_name: &'a str) -> &'a str {
        if self.uri.trim().is_empty() {
            dependency_name
        } else {
            &self.uri
        }
    }
}

/// A file location holding the dependency's current version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Path to the file, relative to the stack document
    pub file: PathBuf,
    /// Path expression selecting the value (e.g. `$.image.tag`)
    pub selector: String,
}

impl Source {
    /// Creates a new source
    pub fn new(file: impl Into<PathBuf>, selector: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            selector: selector.into(),
        }
    }
}

/// A tracked software dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Unique, non-empty name
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Current version, either declared or read from the first source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub tracker: TrackerSpec,
    /// Per-dependency offset override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    /// Filled in by a successful check pass
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl Dependency {
    /// Creates a new dependency with the given tracker
    pub fn new(name: impl Into<String>, tracker: TrackerSpec) -> Self {
        Self {
            name: name.into(),
            description: None,
            version: None,
            sources: Vec::new(),
            tracker,
            offset: None,
            status: None,
        }
    }

    /// Sets the current version (builder pattern)
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Adds a source (builder pattern)
    pub fn with_source(mut self, source: Source) -> Self {
        self.sources.push(source);
        self
    }

    /// Sets the offset override (builder pattern)
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns the current version, empty when unknown
    pub fn current_version(&self) -> &str {
        self.version.as_deref().unwrap_or("")
    }

    /// Override if present, else the stack-wide offset
    pub fn effective_offset(&self, stack_offset: usize) -> usize {
        self.offset.unwrap_or(stack_offset)
    }

    /// URI handed to the tracker backend
    pub fn tracker_uri(&self) -> &str {
        self.tracker.effective_uri(&self.name)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version = match self.current_version() {
            "" => "?",
            v => v,
        };
        write!(f, "{}@{} [{}]", self.name, version, self.tracker.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_kind_from_string() {
        assert_eq!(TrackerKind::from("github".to_string()), TrackerKind::GitHub);
        assert_eq!(TrackerKind::from("OCI".to_string()), TrackerKind::Oci);
        assert_eq!(TrackerKind::from("helm".to_string()), TrackerKind::Helm);
        assert_eq!(TrackerKind::from("git".to_string()), TrackerKind::Git);
    }

    #[test]
    fn test_tracker_kind_unknown_defaults_to_endoflife() {
        assert_eq!(TrackerKind::from(String::new()), TrackerKind::EndOfLife);
        assert_eq!(TrackerKind::from("gitlab".to_string()), TrackerKind::EndOfLife);
        assert_eq!(TrackerKind::default(), TrackerKind::EndOfLife);
    }

    #[test]
    fn test_tracker_kind_serde() {
        let spec: TrackerSpec = serde_json::from_str(r#"{"kind":"github","uri":"a/b"}"#).unwrap();
        assert_eq!(spec.kind, TrackerKind::GitHub);
        let spec: TrackerSpec = serde_json::from_str(r#"{"uri":"nginx"}"#).unwrap();
        assert_eq!(spec.kind, TrackerKind::EndOfLife);
        let spec: TrackerSpec = serde_json::from_str(r#"{"kind":null,"uri":"nginx"}"#).unwrap();
        assert_eq!(spec.kind, TrackerKind::EndOfLife);
        let json = serde_json::to_string(&TrackerKind::EndOfLife).unwrap();
        assert_eq!(json, r#""endoflife""#);
    }

    #[test]
    fn test_effective_uri_defaults_to_name() {
        let dep = Dependency::new("postgresql", TrackerSpec::default());
        assert_eq!(dep.tracker_uri(), "postgresql");

        let dep = Dependency::new("pg", TrackerSpec::new(TrackerKind::EndOfLife, "postgresql"));
        assert_eq!(dep.tracker_uri(), "postgresql");
    }

    #[test]
    fn test_effective_offset() {
        let dep = Dependency::new("a", TrackerSpec::default());
        assert_eq!(dep.effective_offset(2), 2);
        let dep = dep.with_offset(0);
        assert_eq!(dep.effective_offset(2), 0);
    }

    #[test]
    fn test_current_version() {
        let dep = Dependency::new("a", TrackerSpec::default());
        assert_eq!(dep.current_version(), "");
        assert_eq!(dep.with_version("1.2.3").current_version(), "1.2.3");
    }

    #[test]
    fn test_status_is_not_read_from_input() {
        let dep: Dependency = serde_json::from_str(
            r#"{"name":"a","status":{"latestVersion":"9.9.9","status":"current"}}"#,
        )
        .unwrap();
        assert!(dep.status.is_none());
    }

    #[test]
    fn test_dependency_display() {
        let dep = Dependency::new("redis", TrackerSpec::new(TrackerKind::Oci, "docker.io/redis"))
            .with_version("7.2.4");
        assert_eq!(dep.to_string(), "redis@7.2.4 [oci]");
    }
}
