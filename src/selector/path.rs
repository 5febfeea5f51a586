//! JSONPath-style selector expressions
//!
//! Supported syntax:
//! - `$` root (optional)
//! - `.name` child field, `..name` recursive descent
//! - `['name']` / `["name"]` quoted child field
//! - `[N]` sequence index, `[*]` / `.*` wildcard

use crate::error::SelectorError;
use serde_yaml::Value;
use std::fmt;

/// One step of a path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Field(String),
    Index(usize),
    Wildcard,
    Recursive(String),
}

/// A parsed path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    raw: String,
    segments: Vec<Segment>,
}

impl PathExpr {
    /// Parse a selector string
    pub fn parse(selector: &str) -> Result<Self, SelectorError> {
        let raw = selector.trim();
        let invalid = |message: &str| SelectorError::invalid_path(raw, message);

        if raw.is_empty() {
            return Err(invalid("empty selector"));
        }

        let chars: Vec<char> = raw.chars().collect();
        let mut pos = 0;
        let mut segments = Vec::new();

        if chars[0] == '$' {
            pos = 1;
        } else if is_ident_char(chars[0]) {
            // Bare `a.b` is read as `$.a.b`.
            let name = read_ident(&chars, &mut pos);
            segments.push(Segment::Field(name));
        }

        while pos < chars.len() {
            match chars[pos] {
                '.' if chars.get(pos + 1) == Some(&'.') => {
                    pos += 2;
                    let name = read_ident(&chars, &mut pos);
                    if name.is_empty() {
                        return Err(invalid("expected a field name after '..'"));
                    }
                    segments.push(Segment::Recursive(name));
                }
                '.' => {
                    pos += 1;
                    if chars.get(pos) == Some(&'*') {
                        pos += 1;
                        segments.push(Segment::Wildcard);
                        continue;
                    }
                    let name = read_ident(&chars, &mut pos);
                    if name.is_empty() {
                        return Err(invalid("expected a field name after '.'"));
                    }
                    segments.push(Segment::Field(name));
                }
                '[' => {
                    pos += 1;
                    let close = chars[pos..]
                        .iter()
                        .position(|&c| c == ']')
                        .map(|offset| pos + offset)
                        .ok_or_else(|| invalid("unclosed '['"))?;
                    let inner: String = chars[pos..close].iter().collect();
                    let inner = inner.trim();
                    pos = close + 1;

                    if inner == "*" {
                        segments.push(Segment::Wildcard);
                    } else if let Some(name) = unquote(inner) {
                        segments.push(Segment::Field(name.to_string()));
                    } else {
                        let index = inner
                            .parse::<usize>()
                            .map_err(|_| invalid(&format!("invalid index '{}'", inner)))?;
                        segments.push(Segment::Index(index));
                    }
                }
                c => return Err(invalid(&format!("unexpected character '{}'", c))),
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Parsed segments
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// All matches in document order
    pub fn evaluate<'a>(&self, root: &'a Value) -> Vec<&'a Value> {
        let mut current = vec![root];
        for segment in &self.segments {
            let mut next = Vec::new();
            for value in current {
                match segment {
                    Segment::Field(name) => next.extend(value.get(name.as_str())),
                    Segment::Index(index) => {
                        if let Value::Sequence(items) = value {
                            next.extend(items.get(*index));
                        }
                    }
                    Segment::Wildcard => next.extend(children(value)),
                    Segment::Recursive(name) => collect_recursive(value, name, &mut next),
                }
            }
            current = next;
        }
        current
    }

    /// First match, if any
    pub fn evaluate_first<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.evaluate(root).into_iter().next()
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '/'
}

fn read_ident(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < chars.len() && is_ident_char(chars[*pos]) {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}

fn unquote(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 && (bytes[0] == b'\'' || bytes[0] == b'"') && bytes[bytes.len() - 1] == bytes[0] {
        Some(&s[1..s.len() - 1])
    } else {
        None
    }
}

fn children(value: &Value) -> Vec<&Value> {
    match value {
        Value::Mapping(map) => map.values().collect(),
        Value::Sequence(items) => items.iter().collect(),
        Value::Tagged(tagged) => children(&tagged.value),
        _ => Vec::new(),
    }
}

fn collect_recursive<'a>(value: &'a Value, name: &str, out: &mut Vec<&'a Value>) {
    if let Some(found) = value.get(name) {
        out.push(found);
    }
    for child in children(value) {
        collect_recursive(child, name, out);
    }
}
