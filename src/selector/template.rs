//! Template-aware helpers for files that are not plain YAML/JSON
//!
//! Two dialects are recognised: `{{ ... }}` (Helm/Go templates) and
//! `${...}` (shell-style substitution). Extraction is two-tier: a direct
//! regex keyed on the selector's trailing field, then a structured parse of
//! a placeholder-substituted copy. The second tier is lossy, so callers get
//! a substitution count and can reject placeholder-derived values.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Substituted for `{{ .Values.* }}` expressions
pub const VALUES_PLACEHOLDER: &str = "placeholder-value";

/// Substituted for every other template expression
pub const PLACEHOLDER: &str = "placeholder";

static BRACE_TEMPLATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{[^}]*\}\}").expect("valid brace template regex"));

static DOLLAR_TEMPLATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{[^}]*\}").expect("valid dollar template regex"));

static CONTROL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\{\{-?\s*(?:if|else|end|range|with)\b.*\}\}\s*$")
        .expect("valid control line regex")
});

/// Returns true if the content contains either template dialect
pub fn is_template(content: &str) -> bool {
    BRACE_TEMPLATE.is_match(content) || DOLLAR_TEMPLATE.is_match(content)
}

/// Trailing field name of a selector, without any bracket suffix.
///
/// `$.spec.sources[0].targetRevision` gives `targetRevision`,
/// `$.images['app']` gives `app`.
pub fn field_name(selector: &str) -> Option<String> {
    let last = selector.rsplit('.').next()?.trim();

    if let Some(start) = last.rfind('[') {
        let inner = last[start + 1..].trim_end_matches(']').trim();
        let quoted = inner.len() >= 2
            && (inner.starts_with('\'') || inner.starts_with('"'))
            && inner.ends_with(inner.chars().next().unwrap_or('\''));
        if quoted {
            let name = &inner[1..inner.len() - 1];
            return (!name.is_empty()).then(|| name.to_string());
        }
    }

    let name = last
        .split('[')
        .next()
        .unwrap_or_default()
        .trim_start_matches('$');
    if name.is_empty() || name == "*" || name.chars().all(|c| c.is_ascii_digit()) {
        None
    } else {
        Some(name.to_string())
    }
}

/// Direct extraction: the first `field: value` pair in the raw text
pub fn extract_direct(content: &str, selector: &str) -> Option<String> {
    let field = field_name(selector)?;
    let pattern = format!(
        r#"(?m)(?:^|[\s"'{{,])["']?{}["']?:[ \t]*([^{{\s]+)"#,
        regex::escape(&field)
    );
    let re = Regex::new(&pattern).ok()?;

    let found = re
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| {
            m.as_str()
                .trim_end_matches(',')
                .trim_matches(|c| c == '"' || c == '\'')
                .to_string()
        })
        .find(|value| !value.is_empty());
    found
}

/// Result of placeholder substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preprocessed {
    pub content: String,
    /// Number of template expressions replaced by placeholders
    pub substitutions: usize,
}

/// Drop control-flow lines and substitute placeholders for expressions
pub fn preprocess(content: &str) -> Preprocessed {
    let mut substitutions = 0;
    let mut lines = Vec::new();

    for line in content.split('\n') {
        if CONTROL_LINE.is_match(line) {
            continue;
        }

        let line = BRACE_TEMPLATE.replace_all(line, |caps: &Captures| {
            substitutions += 1;
            if caps[0].contains(".Values.") {
                VALUES_PLACEHOLDER
            } else {
                PLACEHOLDER
            }
        });
        let line = DOLLAR_TEMPLATE.replace_all(&line, |_: &Captures| {
            substitutions += 1;
            PLACEHOLDER
        });
        lines.push(line.into_owned());
    }

    Preprocessed {
        content: lines.join("\n"),
        substitutions,
    }
}

/// Returns true if a value was (at least partly) produced by substitution
pub fn is_placeholder(value: &str) -> bool {
    value.contains(PLACEHOLDER)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELM_VALUES: &str = r#"replicaCount: {{ .Values.replicas }}
{{- if .Values.image.enabled }}
image:
  repository: "ghcr.io/acme/api"
  tag: "v2.3.1"
{{- end }}
cluster: ${CLUSTER_NAME}
"#;

    #[test]
    fn test_is_template() {
        assert!(is_template("a: {{ .Values.x }}"));
        assert!(is_template("a: ${X}"));
        assert!(!is_template("a: b\nc: [1, 2]"));
        assert!(!is_template("a: $X"));
    }

    #[test]
    fn test_field_name() {
        assert_eq!(field_name("$.image.tag"), Some("tag".to_string()));
        assert_eq!(
            field_name("$.spec.sources[0].targetRevision"),
            Some("targetRevision".to_string())
        );
        assert_eq!(field_name("$.spec.sources[0]"), Some("sources".to_string()));
        assert_eq!(field_name("$['version']"), Some("version".to_string()));
        assert_eq!(field_name("$"), None);
        assert_eq!(field_name("$.items[*]"), Some("items".to_string()));
    }

    #[test]
    fn test_extract_direct() {
        assert_eq!(extract_direct(HELM_VALUES, "$.image.tag"), Some("v2.3.1".to_string()));
        assert_eq!(
            extract_direct(HELM_VALUES, "$.image.repository"),
            Some("ghcr.io/acme/api".to_string())
        );
    }

    #[test]
    fn test_extract_direct_skips_template_values() {
        // `{{` is excluded from the value class, so no match is produced.
        assert_eq!(extract_direct(HELM_VALUES, "$.replicaCount"), None);
        assert_eq!(extract_direct(HELM_VALUES, "$.missing"), None);
    }

    #[test]
    fn test_extract_direct_does_not_match_suffix_keys() {
        let content = "imagetag: wrong\ntag: right\n";
        assert_eq!(extract_direct(content, "$.tag"), Some("right".to_string()));
    }

    #[test]
    fn test_extract_direct_json_style() {
        let content = r#"{"chart": {"version": "1.4.0", "name": "x"}}"#;
        assert_eq!(extract_direct(content, "$.chart.version"), Some("1.4.0".to_string()));
    }

    #[test]
    fn test_preprocess() {
        let result = preprocess(HELM_VALUES);
        assert!(!result.content.contains("{{"));
        assert!(!result.content.contains("${"));
        assert!(!result.content.contains("if .Values"));
        assert!(result.content.contains("replicaCount: placeholder-value"));
        assert!(result.content.contains("cluster: placeholder"));
        assert!(result.content.contains("  tag: \"v2.3.1\""));
        assert_eq!(result.substitutions, 2);
    }

    #[test]
    fn test_preprocess_keeps_plain_content() {
        let plain = "a: 1\nb: two\n";
        let result = preprocess(plain);
        assert_eq!(result.content, plain);
        assert_eq!(result.substitutions, 0);
    }

    #[test]
    fn test_is_placeholder() {
        assert!(is_placeholder("placeholder"));
        assert!(is_placeholder("registry/placeholder-value:1"));
        assert!(!is_placeholder("1.2.3"));
    }
}
