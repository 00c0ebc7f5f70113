/*
 * path.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Property paths used by directives and attribute interpolation.
//!
//! A path is a dot-separated list of segments, each optionally followed by a
//! single bracketed integer index: `a.b[2].c`.

use crate::error::PathError;
use crate::value::Value;
use std::fmt;
use std::str::FromStr;

/// One `name` or `name[index]` step of a [`PropertyPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub key: String,
    pub index: Option<usize>,
}

/// A parsed property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath {
    segments: Vec<PathSegment>,
}

impl PropertyPath {
    pub fn parse(text: &str) -> Result<Self, PathError> {
        let text = text.trim();
        let fail = |reason: &str| PathError {
            path: text.to_string(),
            reason: reason.to_string(),
        };

        if text.is_empty() {
            return Err(fail("path is empty"));
        }

        let mut segments = Vec::new();
        for raw in text.split('.') {
            let raw = raw.trim();
            let (key, index) = match raw.find('[') {
                Some(open) => {
                    let Some(inner) = raw[open + 1..].strip_suffix(']') else {
                        return Err(fail("unclosed `[` in segment"));
                    };
                    let index = inner
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| fail("index must be a non-negative integer"))?;
                    (&raw[..open], Some(index))
                }
                None => (raw, None),
            };
            if key.is_empty() {
                return Err(fail("empty segment"));
            }
            if !key.chars().all(is_key_char) {
                return Err(fail("segment contains invalid characters"));
            }
            segments.push(PathSegment {
                key: key.to_string(),
                index,
            });
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// The first key, looked up in the render context.
    pub fn root(&self) -> &str {
        &self.segments[0].key
    }

    /// Resolve against a root value; missing steps yield `undefined`.
    pub fn resolve_in(&self, root: &Value) -> Value {
        self.resolve_from(root.get_member(self.root()))
    }

    /// Continue resolution given the value of the root key.
    pub fn resolve_from(&self, root_value: Value) -> Value {
        let mut current = match self.segments[0].index {
            Some(i) => root_value.get_index(i),
            None => root_value,
        };
        for segment in &self.segments[1..] {
            if current.is_nullish() {
                return Value::Undefined;
            }
            current = current.get_member(&segment.key);
            if let Some(i) = segment.index {
                current = current.get_index(i);
            }
        }
        current
    }
}

fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '-'
}

impl FromStr for PropertyPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&segment.key)?;
            if let Some(index) = segment.index {
                write!(f, "[{index}]")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_segments() {
        let path = PropertyPath::parse("a.b[2].c").unwrap();
        assert_eq!(
            path.segments(),
            &[
                PathSegment {
                    key: "a".into(),
                    index: None
                },
                PathSegment {
                    key: "b".into(),
                    index: Some(2)
                },
                PathSegment {
                    key: "c".into(),
                    index: None
                },
            ]
        );
        assert_eq!(path.to_string(), "a.b[2].c");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(PropertyPath::parse("").is_err());
        assert!(PropertyPath::parse("a..b").is_err());
        assert!(PropertyPath::parse("a[x]").is_err());
        assert!(PropertyPath::parse("a[1").is_err());
        assert!(PropertyPath::parse("a b").is_err());
        assert!(PropertyPath::parse("[0]").is_err());
    }

    #[test]
    fn test_resolve() {
        let root = Value::from(json!({"a": {"b": [1, 2, {"c": "deep"}]}}));
        let path: PropertyPath = "a.b[2].c".parse().unwrap();
        assert_eq!(path.resolve_in(&root), Value::string("deep"));

        let missing: PropertyPath = "a.x.y.z".parse().unwrap();
        assert_eq!(missing.resolve_in(&root), Value::Undefined);

        let out_of_range: PropertyPath = "a.b[9]".parse().unwrap();
        assert_eq!(out_of_range.resolve_in(&root), Value::Undefined);
    }
}
