/*
 * value.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Runtime values for directives and expressions.
//!
//! [`Value`] follows the loose scripting semantics templates are written
//! against: `undefined` and `null` are distinct, numbers are `f64`, objects keep
//! insertion order, and a value can carry a fragment of markup nodes that is
//! spliced into the output instead of being stringified.

use crate::markup::{Node, serialize_nodes};
use hashlink::LinkedHashMap;

/// An insertion-ordered object.
pub type ObjectMap = LinkedHashMap<String, Value>;

/// A value in the template language.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(ObjectMap),
    /// Markup produced by an expression; spliced into text as nodes.
    Markup(Vec<Node>),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Truthiness with scripting rules: `0`, `NaN`, `""`, `null`, `undefined`
    /// and `false` are falsy; everything else, including `[]` and `{}`, is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Markup(_) => true,
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Name reported by `typeof`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Null | Value::Array(_) | Value::Object(_) | Value::Markup(_) => "object",
        }
    }

    /// String conversion as performed by `String(value)`.
    pub fn to_js_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    if item.is_nullish() {
                        String::new()
                    } else {
                        item.to_js_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".to_string(),
            Value::Markup(nodes) => serialize_nodes(nodes),
        }
    }

    /// String used when a value is interpolated into text.
    ///
    /// `null` and `undefined` vanish, objects are shown as indented JSON and
    /// everything else uses [`Value::to_js_string`].
    pub fn to_interpolated_string(&self) -> String {
        match self {
            Value::Undefined | Value::Null => String::new(),
            Value::Object(_) => self.to_json_string(Some(2)),
            _ => self.to_js_string(),
        }
    }

    /// Numeric conversion as performed by `Number(value)`.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    match trimmed {
                        "Infinity" | "+Infinity" => f64::INFINITY,
                        "-Infinity" => f64::NEG_INFINITY,
                        _ => trimmed.parse::<f64>().unwrap_or(f64::NAN),
                    }
                }
            }
            Value::Array(items) => match items.as_slice() {
                [] => 0.0,
                [single] => single.to_number(),
                _ => f64::NAN,
            },
            Value::Object(_) | Value::Markup(_) => f64::NAN,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectMap> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Member lookup by key; arrays accept integer keys and `length`.
    /// Anything that is not present reads as `undefined`.
    pub fn get_member(&self, key: &str) -> Value {
        match self {
            Value::Object(map) => map.get(key).cloned().unwrap_or_default(),
            Value::Array(items) => {
                if key == "length" {
                    return Value::Number(items.len() as f64);
                }
                key.parse::<usize>()
                    .ok()
                    .and_then(|i| items.get(i).cloned())
                    .unwrap_or_default()
            }
            Value::String(s) => {
                if key == "length" {
                    return Value::Number(s.chars().count() as f64);
                }
                key.parse::<usize>()
                    .ok()
                    .and_then(|i| s.chars().nth(i))
                    .map(|c| Value::String(c.to_string()))
                    .unwrap_or_default()
            }
            _ => Value::Undefined,
        }
    }

    /// Element lookup by position.
    pub fn get_index(&self, index: usize) -> Value {
        match self {
            Value::Array(items) => items.get(index).cloned().unwrap_or_default(),
            Value::Object(map) => map.get(&index.to_string()).cloned().unwrap_or_default(),
            Value::String(s) => s
                .chars()
                .nth(index)
                .map(|c| Value::String(c.to_string()))
                .unwrap_or_default(),
            _ => Value::Undefined,
        }
    }

    /// Serialize as JSON text; `indent` selects pretty printing.
    ///
    /// Markup is written as its serialized string; `undefined` as `null`.
    pub fn to_json_string(&self, indent: Option<usize>) -> String {
        let json = serde_json::Value::from(self.clone());
        match indent {
            Some(width) if width > 0 => pretty_json(&json, width),
            _ => json.to_string(),
        }
    }
}

/// JS-style number formatting: integers without a fraction, `NaN`, `Infinity`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

fn pretty_json(json: &serde_json::Value, width: usize) -> String {
    let indent = vec![b' '; width.min(10)];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    match serde::Serialize::serialize(json, &mut serializer) {
        Ok(()) => String::from_utf8(out).unwrap_or_default(),
        Err(_) => json.to_string(),
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Undefined | Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Number(n) => number_to_json(n),
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
            Value::Markup(nodes) => serde_json::Value::String(serialize_nodes(&nodes)),
        }
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if !n.is_finite() {
        return serde_json::Value::Null;
    }
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return serde_json::Value::from(n as i64);
    }
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<ObjectMap> for Value {
    fn from(map: ObjectMap) -> Self {
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Undefined.is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(!Value::string("").is_truthy());
        assert!(Value::string("false").is_truthy());
        assert!(Value::Array(vec![]).is_truthy());
        assert!(Value::Object(ObjectMap::new()).is_truthy());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(1e21), "1000000000000000000000");
    }

    #[test]
    fn test_js_string() {
        let arr = Value::Array(vec![Value::from(1.0), Value::Null, Value::from("x")]);
        assert_eq!(arr.to_js_string(), "1,,x");
        assert_eq!(Value::Undefined.to_js_string(), "undefined");
        assert_eq!(Value::Undefined.to_interpolated_string(), "");
        assert_eq!(Value::Null.to_interpolated_string(), "");
    }

    #[test]
    fn test_object_interpolates_as_pretty_json() {
        let value = Value::from(json!({"a": 1, "b": [true]}));
        assert_eq!(
            value.to_interpolated_string(),
            "{\n  \"a\": 1,\n  \"b\": [\n    true\n  ]\n}"
        );
    }

    #[test]
    fn test_json_roundtrip_keeps_key_order() {
        let value = Value::from(json!({"z": 1, "a": 2.5, "m": null}));
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(serde_json::Value::from(value), json!({"z": 1, "a": 2.5, "m": null}));
    }

    #[test]
    fn test_member_lookup() {
        let value = Value::from(json!({"items": [10, 20], "name": "abc"}));
        let items = value.get_member("items");
        assert_eq!(items.get_member("length"), Value::Number(2.0));
        assert_eq!(items.get_index(1), Value::Number(20.0));
        assert_eq!(items.get_index(5), Value::Undefined);
        assert_eq!(value.get_member("name").get_member("length"), Value::Number(3.0));
        assert_eq!(value.get_member("missing"), Value::Undefined);
        assert_eq!(Value::Null.get_member("x"), Value::Undefined);
    }

    #[test]
    fn test_to_number() {
        assert_eq!(Value::string(" 42 ").to_number(), 42.0);
        assert_eq!(Value::string("").to_number(), 0.0);
        assert!(Value::string("abc").to_number().is_nan());
        assert_eq!(Value::Bool(true).to_number(), 1.0);
        assert_eq!(Value::Null.to_number(), 0.0);
        assert!(Value::Undefined.to_number().is_nan());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "object");
        assert_eq!(Value::Undefined.type_name(), "undefined");
        assert_eq!(Value::from(1.0).type_name(), "number");
    }
}
