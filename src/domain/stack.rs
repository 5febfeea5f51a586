//! Stack document: metadata, stack-wide settings and declared dependencies

use super::Dependency;
use crate::error::{CheckError, StackError};
use crate::selector;
use crate::version::extract_version;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Document metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// Stack-wide flags applied to every dependency
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackConfig {
    /// Do not rewrite sources whose current value is literally `latest`
    #[serde(default)]
    pub ignore_latest: bool,
    /// Rank prerelease-tagged versions alongside releases
    #[serde(default)]
    pub accept_prerelease: bool,
    /// Default distance from the newest version (0 = newest)
    #[serde(default)]
    pub offset: usize,
}

/// Body of a stack document: settings and dependencies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackSpec {
    #[serde(flatten)]
    pub config: StackConfig,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

/// A loaded stack document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ObjectMeta>,
    #[serde(default)]
    pub spec: StackSpec,
    /// Directory that relative source paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Stack {
    /// Creates a stack from dependencies (mainly for programmatic use)
    pub fn new(config: StackConfig, dependencies: Vec<Dependency>) -> Self {
        Self {
            metadata: None,
            spec: StackSpec {
                config,
                dependencies,
            },
            base_dir: PathBuf::new(),
        }
    }

    /// Load and validate a stack document from disk
    pub fn load(path: &Path) -> Result<Self, StackError> {
        let content = std::fs::read_to_string(path).map_err(|e| StackError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut stack = Self::parse(&content, path)?;
        stack.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(stack)
    }

    /// Parse a document as YAML, then JSON, and validate it
    pub fn parse(content: &str, path: &Path) -> Result<Self, StackError> {
        let stack: Stack = match serde_yaml::from_str(content) {
            Ok(stack) => stack,
            Err(yaml_err) => {
                debug!(path = %path.display(), error = %yaml_err, "not YAML, trying JSON");
                serde_json::from_str(content).map_err(|json_err| StackError::Parse {
                    path: path.to_path_buf(),
                    message: format!("yaml: {}; json: {}", yaml_err, json_err),
                })?
            }
        };

        stack.validate()?;
        Ok(stack)
    }

    /// Every dependency must have a non-empty, unique name
    pub fn validate(&self) -> Result<(), StackError> {
        let mut seen = HashSet::new();
        for dep in &self.spec.dependencies {
            if dep.name.trim().is_empty() {
                return Err(StackError::validation("dependency name is required"));
            }
            if !seen.insert(dep.name.as_str()) {
                return Err(StackError::validation(format!(
                    "dependency names must be unique: '{}' is declared more than once",
                    dep.name
                )));
            }
        }
        Ok(())
    }

    /// Stack-wide settings
    pub fn config(&self) -> StackConfig {
        self.spec.config
    }

    /// Declared dependencies, in declaration order
    pub fn dependencies(&self) -> &[Dependency] {
        &self.spec.dependencies
    }

    /// Resolve a source path against the stack's directory
    pub fn source_path(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.base_dir.join(file)
        }
    }

    /// Fill in the current version of every dependency that declares
    /// sources but no explicit version.
    ///
    /// The first source is authoritative; later sources that disagree are
    /// reported but do not fail the pass.
    pub fn resolve_current_versions(&mut self) -> Result<(), CheckError> {
        let base_dir = self.base_dir.clone();
        for dep in &mut self.spec.dependencies {
            if dep.version.is_some() || dep.sources.is_empty() {
                continue;
            }

            let mut resolved: Option<String> = None;
            for source in &dep.sources {
                let path = if source.file.is_absolute() {
                    source.file.clone()
                } else {
                    base_dir.join(&source.file)
                };
                let raw = selector::read_value(&path, &source.selector).map_err(|e| {
                    CheckError::Selector {
                        dependency: dep.name.clone(),
                        source: e,
                    }
                })?;
                let version = extract_version(&raw);

                match &resolved {
                    None => {
                        debug!(dependency = %dep.name, version = %version, "resolved current version");
                        resolved = Some(version);
                    }
                    Some(first) if *first != version => {
                        warn!(
                            dependency = %dep.name,
                            file = %path.display(),
                            expected = %first,
                            found = %version,
                            "source disagrees with first source"
                        );
                    }
                    Some(_) => {}
                }
            }
            dep.version = resolved;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TrackerKind;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE_YAML: &str = r#"
metadata:
  name: platform
spec:
  ignoreLatest: true
  offset: 1
  dependencies:
    - name: nginx
      tracker:
        kind: github
        uri: nginx/nginx
      sources:
        - file: values.yaml
          selector: $.image.tag
    - name: postgresql
      version: "15.4"
      offset: 0
"#;

    #[test]
    fn test_parse_yaml() {
        let stack = Stack::parse(SAMPLE_YAML, Path::new("stack.yaml")).unwrap();
        assert_eq!(stack.metadata.as_ref().unwrap().name, "platform");
        assert!(stack.config().ignore_latest);
        assert!(!stack.config().accept_prerelease);
        assert_eq!(stack.config().offset, 1);
        assert_eq!(stack.dependencies().len(), 2);
        assert_eq!(stack.dependencies()[0].tracker.kind, TrackerKind::GitHub);
        assert_eq!(stack.dependencies()[1].tracker.kind, TrackerKind::EndOfLife);
        assert_eq!(stack.dependencies()[1].effective_offset(1), 0);
        assert_eq!(stack.dependencies()[0].effective_offset(1), 1);
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{"spec":{"acceptPrerelease":true,"dependencies":[{"name":"redis"}]}}"#;
        let stack = Stack::parse(json, Path::new("stack.json")).unwrap();
        assert!(stack.config().accept_prerelease);
        assert_eq!(stack.dependencies()[0].name, "redis");
    }

    #[test]
    fn test_parse_invalid_document() {
        let err = Stack::parse("spec: [unclosed", Path::new("bad.yaml")).unwrap_err();
        assert!(matches!(err, StackError::Parse { .. }));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let yaml = "spec:\n  dependencies:\n    - name: x\n    - name: x\n";
        let err = Stack::parse(yaml, Path::new("dup.yaml")).unwrap_err();
        assert!(matches!(err, StackError::Validation { .. }));
        assert!(err.to_string().contains("unique"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let yaml = "spec:\n  dependencies:\n    - tracker:\n        kind: git\n";
        let err = Stack::parse(yaml, Path::new("noname.yaml")).unwrap_err();
        assert!(err.to_string().contains("name is required"));
    }

    #[test]
    fn test_load_sets_base_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stack.yaml");
        fs::write(&path, SAMPLE_YAML).unwrap();

        let stack = Stack::load(&path).unwrap();
        assert_eq!(stack.base_dir, dir.path());
        assert_eq!(
            stack.source_path(Path::new("values.yaml")),
            dir.path().join("values.yaml")
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = Stack::load(Path::new("/nonexistent/stack.yaml")).unwrap_err();
        assert!(matches!(err, StackError::Read { .. }));
    }

    #[test]
    fn test_resolve_current_versions_from_sources() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("values.yaml"),
            "image:\n  repository: nginx\n  tag: v1.25.3\n",
        )
        .unwrap();
        let path = dir.path().join("stack.yaml");
        fs::write(&path, SAMPLE_YAML).unwrap();

        let mut stack = Stack::load(&path).unwrap();
        stack.resolve_current_versions().unwrap();

        assert_eq!(stack.dependencies()[0].current_version(), "1.25.3");
        // Explicit versions are left alone.
        assert_eq!(stack.dependencies()[1].current_version(), "15.4");
    }

    #[test]
    fn test_resolve_current_versions_missing_source_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stack.yaml");
        fs::write(&path, SAMPLE_YAML).unwrap();

        let mut stack = Stack::load(&path).unwrap();
        let err = stack.resolve_current_versions().unwrap_err();
        assert!(matches!(err, CheckError::Selector { ref dependency, .. } if dependency == "nginx"));
    }

    #[test]
    fn test_status_serialized_in_output() {
        let stack = Stack::parse(SAMPLE_YAML, Path::new("stack.yaml")).unwrap();
        let json = serde_json::to_value(&stack).unwrap();
        assert_eq!(json["spec"]["ignoreLatest"], true);
        assert!(json["spec"]["dependencies"][0].get("status").is_none());
    }
}
