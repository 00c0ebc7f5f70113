/*
 * registry.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Block-type definitions.
 */

//! Block-type registry.
//!
//! A registry file maps type keys to definitions:
//!
//! ```yaml
//! text:
//!   title: Text
//!   fields:
//!     - name: content
//!       input: textarea
//!       default: ""
//!       rules:
//!         required: true
//!         maxLength: 500
//!   render:
//!     kind: html
//!     template: "<p>[[ content ]]</p>"
//! ```

use crate::block::{PropMap, RenderRecipe};
use hashlink::LinkedHashMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to read registry file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid registry YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid registry JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown block type: {0}")]
    UnknownType(String),
}

/// Editor widget used for a field. Also fixes the accepted value type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Text,
    Textarea,
    Number,
    Checkbox,
    Select,
    Color,
    Url,
}

impl InputKind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            InputKind::Number => value.is_number(),
            InputKind::Checkbox => value.is_boolean(),
            _ => value.is_string(),
        }
    }

    fn expected(self) -> &'static str {
        match self {
            InputKind::Number => "a number",
            InputKind::Checkbox => "a boolean",
            _ => "a string",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldRules {
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<FieldPattern>,
}

/// A `pattern` rule, compiled when the registry is loaded so a bad regex
/// fails the load instead of every later check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPattern(Regex);

impl FieldPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl PartialEq for FieldPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Display for FieldPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for FieldPattern {
    type Error = regex::Error;

    fn try_from(pattern: String) -> Result<Self, Self::Error> {
        Self::new(&pattern)
    }
}

impl From<FieldPattern> for String {
    fn from(pattern: FieldPattern) -> Self {
        pattern.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub input: InputKind,
    /// Allowed values for `select` fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default)]
    pub rules: FieldRules,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldDefinition {
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTypeDefinition {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render: Option<RenderRecipe>,
}

/// Which rule a value broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Rule {
    Required,
    Type,
    Choice,
    Min,
    Max,
    MinLength,
    MaxLength,
    Pattern,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rule::Required => "required",
            Rule::Type => "type",
            Rule::Choice => "option",
            Rule::Min => "min",
            Rule::Max => "max",
            Rule::MinLength => "minLength",
            Rule::MaxLength => "maxLength",
            Rule::Pattern => "pattern",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropViolation {
    pub field: String,
    pub rule: Rule,
    pub message: String,
}

impl fmt::Display for PropViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.field, self.rule, self.message)
    }
}

/// Block-type definitions keyed by type.
#[derive(Debug, Clone, Default)]
pub struct BlockTypeRegistry {
    types: LinkedHashMap<String, BlockTypeDefinition>,
}

impl BlockTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, RegistryError> {
        let types: BTreeMap<String, BlockTypeDefinition> = serde_yaml::from_str(source)?;
        Ok(types.into_iter().collect())
    }

    pub fn from_json_str(source: &str) -> Result<Self, RegistryError> {
        let types: BTreeMap<String, BlockTypeDefinition> = serde_json::from_str(source)?;
        Ok(types.into_iter().collect())
    }

    /// Load a registry file. `.json` files are read as JSON, anything else
    /// as YAML.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let source = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let registry = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&source)?,
            _ => Self::from_yaml_str(&source)?,
        };
        tracing::debug!(path = %path.display(), count = registry.len(), "Loaded block registry");
        Ok(registry)
    }

    pub fn register(&mut self, block_type: impl Into<String>, definition: BlockTypeDefinition) {
        self.types.replace(block_type.into(), definition);
    }

    pub fn get(&self, block_type: &str) -> Option<&BlockTypeDefinition> {
        self.types.get(block_type)
    }

    pub fn contains(&self, block_type: &str) -> bool {
        self.types.contains_key(block_type)
    }

    pub fn types(&self) -> impl Iterator<Item = (&str, &BlockTypeDefinition)> {
        self.types.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Render recipe registered for a type.
    pub fn recipe(&self, block_type: &str) -> Option<&RenderRecipe> {
        self.get(block_type).and_then(|d| d.render.as_ref())
    }

    /// Field defaults for a type, in field order.
    pub fn default_props(&self, block_type: &str) -> Result<PropMap, RegistryError> {
        let definition = self.definition(block_type)?;
        Ok(definition
            .fields
            .iter()
            .filter_map(|f| f.default.clone().map(|d| (f.name.clone(), d)))
            .collect())
    }

    /// Check `props` against every field rule of `block_type`.
    ///
    /// Returns all violations; an empty list means the props are valid.
    pub fn validate_props(
        &self,
        block_type: &str,
        props: &PropMap,
    ) -> Result<Vec<PropViolation>, RegistryError> {
        let definition = self.definition(block_type)?;
        let mut violations = Vec::new();
        for field in &definition.fields {
            check_field(field, props.get(&field.name), &mut violations);
        }
        Ok(violations)
    }

    /// Problems in the definitions themselves: inverted bounds, `select`
    /// fields without options, defaults breaking their own rules. Invalid
    /// patterns never get this far; they fail the load.
    pub fn check(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for (block_type, definition) in &self.types {
            if definition.title.trim().is_empty() {
                problems.push(format!("{block_type}: title is empty"));
            }
            for field in &definition.fields {
                let at = format!("{block_type}.{}", field.name);
                let rules = &field.rules;
                if let (Some(min), Some(max)) = (rules.min, rules.max)
                    && min > max
                {
                    problems.push(format!("{at}: min {min} is greater than max {max}"));
                }
                if let (Some(min), Some(max)) = (rules.min_length, rules.max_length)
                    && min > max
                {
                    problems.push(format!("{at}: minLength {min} is greater than maxLength {max}"));
                }
                if field.input == InputKind::Select && field.options.is_empty() {
                    problems.push(format!("{at}: select field has no options"));
                }
                if let Some(default) = &field.default {
                    let mut violations = Vec::new();
                    check_field(field, Some(default), &mut violations);
                    problems.extend(
                        violations
                            .into_iter()
                            .map(|v| format!("{at}: default value breaks {} rule: {}", v.rule, v.message)),
                    );
                }
            }
        }
        problems
    }

    fn definition(&self, block_type: &str) -> Result<&BlockTypeDefinition, RegistryError> {
        self.get(block_type)
            .ok_or_else(|| RegistryError::UnknownType(block_type.to_string()))
    }
}

impl FromIterator<(String, BlockTypeDefinition)> for BlockTypeRegistry {
    fn from_iter<I: IntoIterator<Item = (String, BlockTypeDefinition)>>(iter: I) -> Self {
        Self {
            types: iter.into_iter().collect(),
        }
    }
}

fn check_field(field: &FieldDefinition, value: Option<&Value>, out: &mut Vec<PropViolation>) {
    let mut push = |rule: Rule, message: String| {
        out.push(PropViolation {
            field: field.name.clone(),
            rule,
            message,
        })
    };
    let rules = &field.rules;

    let value = match value {
        None | Some(Value::Null) => {
            if rules.required {
                push(Rule::Required, format!("{} is required", field.label()));
            }
            return;
        }
        Some(Value::String(s)) if s.is_empty() && rules.required => {
            push(Rule::Required, format!("{} is required", field.label()));
            return;
        }
        Some(value) => value,
    };

    if !field.input.accepts(value) {
        push(
            Rule::Type,
            format!("{} must be {}", field.label(), field.input.expected()),
        );
        return;
    }

    if let Some(number) = value.as_f64() {
        if let Some(min) = rules.min
            && number < min
        {
            push(Rule::Min, format!("{} must be at least {min}", field.label()));
        }
        if let Some(max) = rules.max
            && number > max
        {
            push(Rule::Max, format!("{} must be at most {max}", field.label()));
        }
    }

    if let Some(text) = value.as_str() {
        let length = text.chars().count();
        if field.input == InputKind::Select
            && !field.options.is_empty()
            && !field.options.iter().any(|o| o == text)
        {
            push(
                Rule::Choice,
                format!("{} must be one of: {}", field.label(), field.options.join(", ")),
            );
        }
        if let Some(min) = rules.min_length
            && length < min
        {
            push(
                Rule::MinLength,
                format!("{} must be at least {min} characters", field.label()),
            );
        }
        if let Some(max) = rules.max_length
            && length > max
        {
            push(
                Rule::MaxLength,
                format!("{} must be at most {max} characters", field.label()),
            );
        }
        if let Some(pattern) = &rules.pattern
            && !pattern.is_match(text)
        {
            push(
                Rule::Pattern,
                format!("{} does not match {pattern}", field.label()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const REGISTRY: &str = r#"
text:
  title: Text
  fields:
    - name: content
      input: textarea
      default: "Hello"
      rules:
        required: true
        maxLength: 10
  render:
    kind: html
    template: "<p>[[ content ]]</p>"
counter:
  title: Counter
  fields:
    - name: count
      input: number
      default: 1
      rules: { min: 0, max: 5 }
    - name: slug
      rules: { pattern: "^[a-z]+$" }
    - name: size
      input: select
      options: [small, large]
"#;

    fn registry() -> BlockTypeRegistry {
        BlockTypeRegistry::from_yaml_str(REGISTRY).unwrap()
    }

    fn props(value: Value) -> PropMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_load_yaml() {
        let registry = registry();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("text"));
        assert_eq!(
            registry.recipe("text"),
            Some(&RenderRecipe::html("<p>[[ content ]]</p>"))
        );
        assert_eq!(registry.get("counter").unwrap().fields[2].input, InputKind::Select);
        assert!(registry.check().is_empty());
    }

    #[test]
    fn test_load_json_equivalent() {
        let registry = BlockTypeRegistry::from_json_str(
            r#"{"badge": {"title": "Badge", "fields": [{"name": "label", "rules": {"minLength": 1}}]}}"#,
        )
        .unwrap();
        assert_eq!(registry.get("badge").unwrap().fields[0].rules.min_length, Some(1));
    }

    #[test]
    fn test_default_props() {
        let registry = registry();
        assert_eq!(
            Value::Object(registry.default_props("counter").unwrap()),
            json!({"count": 1})
        );
        assert!(matches!(
            registry.default_props("nope"),
            Err(RegistryError::UnknownType(t)) if t == "nope"
        ));
    }

    #[test]
    fn test_validate_props_reports_every_violation() {
        let registry = registry();
        let violations = registry
            .validate_props(
                "counter",
                &props(json!({"count": 9, "slug": "Not Valid", "size": "medium"})),
            )
            .unwrap();
        let rules: Vec<(String, Rule)> = violations
            .into_iter()
            .map(|v| (v.field, v.rule))
            .collect();
        assert_eq!(
            rules,
            vec![
                ("count".to_string(), Rule::Max),
                ("slug".to_string(), Rule::Pattern),
                ("size".to_string(), Rule::Choice),
            ]
        );
    }

    #[test]
    fn test_required_and_type() {
        let registry = registry();
        let violations = registry
            .validate_props("text", &props(json!({"content": ""})))
            .unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, Rule::Required);

        let violations = registry
            .validate_props("counter", &props(json!({"count": "3"})))
            .unwrap();
        assert_eq!(violations[0].rule, Rule::Type);
        assert_eq!(violations[0].to_string(), "count (type): count must be a number");

        assert!(
            registry
                .validate_props("text", &props(json!({"content": "short"})))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_check_reports_definition_problems() {
        let registry = BlockTypeRegistry::from_yaml_str(
            r#"
broken:
  title: ""
  fields:
    - name: b
      input: number
      default: 10
      rules: { min: 5, max: 1 }
    - name: c
      input: select
"#,
        )
        .unwrap();
        let problems = registry.check();
        assert!(problems.iter().any(|p| p == "broken: title is empty"));
        assert!(problems.iter().any(|p| p == "broken.b: min 5 is greater than max 1"));
        assert!(problems.iter().any(|p| p == "broken.c: select field has no options"));
        assert!(problems.iter().any(|p| p.starts_with("broken.b: default value breaks max")));
    }

    #[test]
    fn test_invalid_pattern_fails_load() {
        let err = BlockTypeRegistry::from_yaml_str(
            r#"
badge:
  title: Badge
  fields:
    - name: code
      rules: { pattern: "(" }
"#,
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::Yaml(_)));

        let err = BlockTypeRegistry::from_json_str(
            r#"{"badge": {"title": "Badge", "fields": [{"name": "code", "rules": {"pattern": "[a-"}}]}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::Json(_)));
    }

    #[test]
    fn test_pattern_serializes_as_source() {
        let registry = registry();
        let rules = &registry.get("counter").unwrap().fields[1].rules;
        assert_eq!(rules.pattern.as_ref().map(FieldPattern::as_str), Some("^[a-z]+$"));
        assert_eq!(
            serde_json::to_value(rules).unwrap(),
            json!({"required": false, "pattern": "^[a-z]+$"})
        );
    }
}
