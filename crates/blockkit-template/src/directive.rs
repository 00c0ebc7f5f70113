/*
 * directive.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! `render-for` and `render-if` directive grammars.
//!
//! ```text
//! render-for="item in path"
//! render-for="(item, index) in path"
//!
//! render-if="path"
//! render-if="!path"
//! render-if="path === literal"
//! ```

use crate::context::RenderContext;
use crate::error::DirectiveError;
use crate::path::PropertyPath;
use once_cell::sync::Lazy;
use regex::Regex;

/// Attribute name for iteration.
pub const FOR_ATTRIBUTE: &str = "render-for";

/// Attribute name for conditional rendering.
pub const IF_ATTRIBUTE: &str = "render-if";

static FOR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:\(\s*([A-Za-z_$][\w$]*)\s*(?:,\s*([A-Za-z_$][\w$]*)\s*)?\)|([A-Za-z_$][\w$]*))\s+in\s+(\S+)\s*$",
    )
    .expect("render-for pattern is valid")
});

/// A parsed `render-for` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForDirective {
    /// Name bound to each entry.
    pub item: String,
    /// Name bound to the array index or object key, if requested.
    pub index: Option<String>,
    pub collection: PropertyPath,
}

impl ForDirective {
    pub fn parse(expression: &str) -> Result<Self, DirectiveError> {
        let malformed = || DirectiveError::MalformedFor {
            expression: expression.to_string(),
        };
        let caps = FOR_PATTERN.captures(expression).ok_or_else(malformed)?;

        let item = caps
            .get(1)
            .or_else(|| caps.get(3))
            .map(|m| m.as_str().to_string())
            .ok_or_else(malformed)?;
        let index = caps.get(2).map(|m| m.as_str().to_string());
        let collection = caps
            .get(4)
            .and_then(|m| PropertyPath::parse(m.as_str()).ok())
            .ok_or_else(malformed)?;

        Ok(Self {
            item,
            index,
            collection,
        })
    }
}

/// A parsed `render-if` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Truthy(PropertyPath),
    Not(PropertyPath),
    /// Lookup compared to a literal after string coercion.
    Equals { path: PropertyPath, literal: String },
}

impl Condition {
    pub fn parse(expression: &str) -> Result<Self, DirectiveError> {
        let malformed = |reason: String| DirectiveError::MalformedCondition {
            expression: expression.to_string(),
            reason,
        };
        let text = expression.trim();

        if let Some((left, right)) = text.split_once("===") {
            let path = PropertyPath::parse(left).map_err(|e| malformed(e.reason))?;
            let literal = strip_quotes(right.trim());
            return Ok(Condition::Equals {
                path,
                literal: literal.to_string(),
            });
        }

        if let Some(rest) = text.strip_prefix('!') {
            let path = PropertyPath::parse(rest).map_err(|e| malformed(e.reason))?;
            return Ok(Condition::Not(path));
        }

        PropertyPath::parse(text)
            .map(Condition::Truthy)
            .map_err(|e| malformed(e.reason))
    }

    pub fn evaluate(&self, context: &RenderContext) -> bool {
        match self {
            Condition::Truthy(path) => context.resolve(path).is_truthy(),
            Condition::Not(path) => !context.resolve(path).is_truthy(),
            Condition::Equals { path, literal } => {
                context.resolve(path).to_js_string() == *literal
            }
        }
    }
}

fn strip_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_for_simple() {
        let d = ForDirective::parse("item in items").unwrap();
        assert_eq!(d.item, "item");
        assert_eq!(d.index, None);
        assert_eq!(d.collection.to_string(), "items");
    }

    #[test]
    fn test_for_with_index() {
        let d = ForDirective::parse(" ( p , i ) in data.people[0] ").unwrap();
        assert_eq!(d.item, "p");
        assert_eq!(d.index.as_deref(), Some("i"));
        assert_eq!(d.collection.to_string(), "data.people[0]");

        let d = ForDirective::parse("(p) in people").unwrap();
        assert_eq!(d.item, "p");
        assert_eq!(d.index, None);
    }

    #[test]
    fn test_for_malformed() {
        for bad in ["items", "in items", "a, b in items", "(a b) in x", "x in", "x of items", "x in a..b"] {
            assert!(
                matches!(ForDirective::parse(bad), Err(DirectiveError::MalformedFor { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_condition_forms() {
        assert_eq!(
            Condition::parse("user.active").unwrap(),
            Condition::Truthy(PropertyPath::parse("user.active").unwrap())
        );
        assert_eq!(
            Condition::parse("!hidden").unwrap(),
            Condition::Not(PropertyPath::parse("hidden").unwrap())
        );
        assert_eq!(
            Condition::parse("kind === 'card'").unwrap(),
            Condition::Equals {
                path: PropertyPath::parse("kind").unwrap(),
                literal: "card".to_string()
            }
        );
        assert!(Condition::parse("a && b").is_err());
        assert!(Condition::parse("").is_err());
    }

    #[test]
    fn test_condition_evaluation() {
        let ctx = RenderContext::from_json(json!({
            "count": 0,
            "size": 2,
            "flag": true,
            "kind": "card",
            "list": []
        }));
        let check = |text: &str| Condition::parse(text).unwrap().evaluate(&ctx);

        assert!(!check("count"));
        assert!(check("size"));
        assert!(check("flag"));
        assert!(check("list"));
        assert!(check("!missing"));
        assert!(!check("!flag"));
        assert!(check("kind === \"card\""));
        assert!(check("size === 2"));
        assert!(check("flag === true"));
        assert!(!check("kind === 'row'"));
    }
}
