//! Reading and surgically rewriting values in YAML/JSON source files
//!
//! This module provides:
//! - Value extraction by path expression, with template handling
//! - In-place replacement of exactly one verbatim occurrence of a value,
//!   leaving every other byte of the file untouched
//! - Permission-preserving writes

mod path;
mod template;

pub use path::{PathExpr, Segment};
pub use template::{extract_direct, field_name, is_placeholder, is_template, preprocess, Preprocessed};

use crate::error::SelectorError;
use serde::Deserialize;
use serde_yaml::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Read the value selected by `selector` from a file
pub fn read_value(path: &Path, selector: &str) -> Result<String, SelectorError> {
    let content = fs::read_to_string(path).map_err(|e| SelectorError::read(path, e))?;
    read_value_from_str(&content, selector, path)
}

/// Read the value selected by `selector` from file content.
///
/// `path` is only used for error reporting.
pub fn read_value_from_str(
    content: &str,
    selector: &str,
    path: &Path,
) -> Result<String, SelectorError> {
    debug!(file = %path.display(), selector = %selector, "reading value");
    let expr = PathExpr::parse(selector)?;

    if !is_template(content) {
        return evaluate_documents(content, &expr, path)?
            .ok_or_else(|| not_found(path, selector));
    }

    debug!(file = %path.display(), "template syntax detected, trying direct extraction");
    if let Some(value) = extract_direct(content, selector) {
        return Ok(value);
    }

    let processed = preprocess(content);
    let value = evaluate_documents(&processed.content, &expr, path)?
        .ok_or_else(|| not_found(path, selector))?;

    if processed.substitutions > 0 && is_placeholder(&value) {
        warn!(
            file = %path.display(),
            selector = %selector,
            value = %value,
            "value comes from template placeholder substitution"
        );
        return Err(SelectorError::Lossy {
            path: path.to_path_buf(),
            selector: selector.to_string(),
            value,
        });
    }
    Ok(value)
}

/// Compute the file content with the selected value replaced by `new_value`.
///
/// Returns `None` when the current value already equals `new_value`.
pub fn plan_update(
    content: &str,
    selector: &str,
    new_value: &str,
    path: &Path,
) -> Result<Option<String>, SelectorError> {
    let current = read_value_from_str(content, selector, path)?;
    if current == new_value {
        return Ok(None);
    }
    if current.is_empty() {
        return Err(SelectorError::ambiguous_update(
            path,
            format!("selector '{}' resolved to an empty value", selector),
        ));
    }

    let occurrences: Vec<usize> = content
        .match_indices(&current)
        .map(|(i, _)| i)
        .filter(|&i| is_bounded(content, i, current.len()))
        .collect();
    let offset = match occurrences.as_slice() {
        [] => {
            return Err(SelectorError::ambiguous_update(
                path,
                format!("current value '{}' not found verbatim as a whole token", current),
            ))
        }
        [only] => *only,
        many => anchor_occurrence(content, many, selector).ok_or_else(|| {
            SelectorError::ambiguous_update(
                path,
                format!(
                    "current value '{}' occurs {} times and none is uniquely keyed by the selector",
                    current,
                    many.len()
                ),
            )
        })?,
    };

    let mut updated = String::with_capacity(content.len() + new_value.len());
    updated.push_str(&content[..offset]);
    updated.push_str(new_value);
    updated.push_str(&content[offset + current.len()..]);
    Ok(Some(updated))
}

/// Replace the selected value in a file, preserving everything else.
///
/// Returns `false` when the file already holds `new_value`.
pub fn update_value(path: &Path, selector: &str, new_value: &str) -> Result<bool, SelectorError> {
    let original = fs::read_to_string(path).map_err(|e| SelectorError::read(path, e))?;
    let Some(updated) = plan_update(&original, selector, new_value, path)? else {
        debug!(file = %path.display(), selector = %selector, "value already up to date");
        return Ok(false);
    };

    let permissions = fs::metadata(path)
        .map_err(|e| SelectorError::read(path, e))?
        .permissions();
    fs::write(path, updated).map_err(|e| SelectorError::write(path, e))?;
    fs::set_permissions(path, permissions).map_err(|e| SelectorError::write(path, e))?;

    info!(file = %path.display(), selector = %selector, value = %new_value, "updated value");
    Ok(true)
}

/// Among several occurrences, pick the single one on a line keyed by the
/// selector's trailing field
fn anchor_occurrence(content: &str, occurrences: &[usize], selector: &str) -> Option<usize> {
    let field = field_name(selector)?;
    let keys = [
        format!("{}:", field),
        format!("\"{}\":", field),
        format!("'{}':", field),
    ];

    let mut keyed = occurrences.iter().copied().filter(|&offset| {
        let line_start = content[..offset].rfind('\n').map_or(0, |i| i + 1);
        let line = content[line_start..offset].trim_start();
        let line = line.strip_prefix("- ").map_or(line, str::trim_start);
        keys.iter().any(|key| line.starts_with(key.as_str()))
    });

    match (keyed.next(), keyed.next()) {
        (Some(offset), None) => Some(offset),
        _ => None,
    }
}

/// Characters that continue a version-like token
fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// The match at `start..start + len` is not part of a longer token
fn is_bounded(content: &str, start: usize, len: usize) -> bool {
    let before = content[..start].chars().next_back();
    let after = content[start + len..].chars().next();
    !before.is_some_and(is_token_char) && !after.is_some_and(is_token_char)
}

/// Evaluate against each YAML document in turn, falling back to JSON
fn evaluate_documents(
    content: &str,
    expr: &PathExpr,
    path: &Path,
) -> Result<Option<String>, SelectorError> {
    let mut yaml_error = None;
    for document in serde_yaml::Deserializer::from_str(content) {
        match Value::deserialize(document) {
            Ok(value) => {
                if let Some(found) = expr.evaluate_first(&value) {
                    return Ok(Some(stringify(found)));
                }
            }
            Err(e) => {
                yaml_error = Some(e);
                break;
            }
        }
    }

    let Some(yaml_error) = yaml_error else {
        return Ok(None);
    };

    match serde_json::from_str::<Value>(content) {
        Ok(value) => Ok(expr.evaluate_first(&value).map(stringify)),
        Err(json_error) => Err(SelectorError::Parse {
            path: path.to_path_buf(),
            message: format!("yaml: {}; json: {}", yaml_error, json_error),
        }),
    }
}

/// Scalars as written, null as empty, collections as JSON
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Tagged(tagged) => stringify(&tagged.value),
        other => serde_json::to_string(other).unwrap_or_else(|_| format!("{:?}", other)),
    }
}

fn not_found(path: &Path, selector: &str) -> SelectorError {
    SelectorError::NotFound {
        path: path.to_path_buf(),
        selector: selector.to_string(),
    }
}
