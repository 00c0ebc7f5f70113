/*
 * expr/builtins.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Utility namespaces (`Math`, `JSON`, `Date`) and value methods.
//!
//! These are the only callables an expression can reach. There is no way to
//! define new functions or reach anything outside the render context.

use crate::error::ExpressionError;
use crate::value::{Value, format_number};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

const MATH_FUNCTIONS: &[&str] = &[
    "abs", "ceil", "floor", "round", "trunc", "sign", "min", "max", "pow", "sqrt",
];
const JSON_FUNCTIONS: &[&str] = &["stringify", "parse"];
const DATE_FUNCTIONS: &[&str] = &["now", "parse", "iso"];

const STRING_METHODS: &[&str] = &[
    "toUpperCase",
    "toLowerCase",
    "trim",
    "includes",
    "startsWith",
    "endsWith",
];
const ARRAY_METHODS: &[&str] = &["join", "includes"];
const NUMBER_METHODS: &[&str] = &["toFixed"];

/// A utility namespace visible to every expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Math,
    Json,
    Date,
}

/// A function exposed by a [`Namespace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Builtin {
    pub namespace: Namespace,
    pub name: &'static str,
}

/// What `Namespace.member` refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum NamespaceMember {
    Constant(Value),
    Function(Builtin),
}

impl Namespace {
    pub fn lookup(name: &str) -> Option<Namespace> {
        match name {
            "Math" => Some(Namespace::Math),
            "JSON" => Some(Namespace::Json),
            "Date" => Some(Namespace::Date),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Namespace::Math => "Math",
            Namespace::Json => "JSON",
            Namespace::Date => "Date",
        }
    }

    pub fn member(self, name: &str) -> Option<NamespaceMember> {
        if self == Namespace::Math {
            match name {
                "PI" => return Some(NamespaceMember::Constant(Value::Number(std::f64::consts::PI))),
                "E" => return Some(NamespaceMember::Constant(Value::Number(std::f64::consts::E))),
                _ => {}
            }
        }
        let table = match self {
            Namespace::Math => MATH_FUNCTIONS,
            Namespace::Json => JSON_FUNCTIONS,
            Namespace::Date => DATE_FUNCTIONS,
        };
        table.iter().copied().find(|f| *f == name).map(|f| {
            NamespaceMember::Function(Builtin {
                namespace: self,
                name: f,
            })
        })
    }
}

/// Whether `receiver.name(...)` is a supported method call.
pub fn has_method(receiver: &Value, name: &str) -> bool {
    let table = match receiver {
        Value::String(_) => STRING_METHODS,
        Value::Array(_) => ARRAY_METHODS,
        Value::Number(_) => NUMBER_METHODS,
        _ => return false,
    };
    table.contains(&name)
}

fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).cloned().unwrap_or_default()
}

fn num_arg(args: &[Value], i: usize) -> f64 {
    arg(args, i).to_number()
}

pub fn call_builtin(builtin: Builtin, args: &[Value]) -> Result<Value, ExpressionError> {
    match builtin.namespace {
        Namespace::Math => Ok(Value::Number(call_math(builtin.name, args))),
        Namespace::Json => call_json(builtin.name, args),
        Namespace::Date => call_date(builtin.name, args),
    }
}

fn call_math(name: &str, args: &[Value]) -> f64 {
    let x = num_arg(args, 0);
    match name {
        "abs" => x.abs(),
        "ceil" => x.ceil(),
        "floor" => x.floor(),
        "round" => (x + 0.5).floor(),
        "trunc" => x.trunc(),
        "sign" => {
            if x.is_nan() || x == 0.0 {
                x
            } else {
                x.signum()
            }
        }
        "sqrt" => x.sqrt(),
        "pow" => x.powf(num_arg(args, 1)),
        "min" => fold_numbers(args, f64::INFINITY, f64::min),
        "max" => fold_numbers(args, f64::NEG_INFINITY, f64::max),
        _ => f64::NAN,
    }
}

/// `f64::min`/`max` ignore NaN; scripting min/max propagate it.
fn fold_numbers(args: &[Value], init: f64, pick: fn(f64, f64) -> f64) -> f64 {
    let mut acc = init;
    for value in args {
        let n = value.to_number();
        if n.is_nan() {
            return f64::NAN;
        }
        acc = pick(acc, n);
    }
    acc
}

fn call_json(name: &str, args: &[Value]) -> Result<Value, ExpressionError> {
    match name {
        "stringify" => {
            let value = arg(args, 0);
            if value == Value::Undefined {
                return Ok(Value::Undefined);
            }
            let indent = match arg(args, 2) {
                Value::Number(n) if n >= 1.0 => Some(n as usize),
                Value::String(s) if !s.is_empty() => Some(s.chars().count()),
                _ => None,
            };
            Ok(Value::String(value.to_json_string(indent)))
        }
        "parse" => {
            let text = arg(args, 0).to_js_string();
            serde_json::from_str::<serde_json::Value>(&text)
                .map(Value::from)
                .map_err(|e| ExpressionError::syntax(format!("JSON.parse: {e}"), 0))
        }
        _ => Ok(Value::Undefined),
    }
}

fn call_date(name: &str, args: &[Value]) -> Result<Value, ExpressionError> {
    match name {
        "now" => Ok(Value::Number(Utc::now().timestamp_millis() as f64)),
        "parse" => Ok(Value::Number(parse_date(&arg(args, 0).to_js_string()))),
        "iso" => {
            let millis = match arg(args, 0) {
                Value::Undefined => Utc::now().timestamp_millis() as f64,
                other => other.to_number(),
            };
            format_iso(millis).map(Value::String)
        }
        _ => Ok(Value::Undefined),
    }
}

/// Milliseconds since the epoch, or NaN when the text is not a date.
fn parse_date(text: &str) -> f64 {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return dt.timestamp_millis() as f64;
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map_or(f64::NAN, |dt| dt.and_utc().timestamp_millis() as f64)
}

fn format_iso(millis: f64) -> Result<String, ExpressionError> {
    if !millis.is_finite() {
        return Err(ExpressionError::type_error("Invalid time value"));
    }
    DateTime::<Utc>::from_timestamp_millis(millis as i64)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .ok_or_else(|| ExpressionError::type_error("Invalid time value"))
}

pub fn call_method(receiver: &Value, name: &str, args: &[Value]) -> Result<Value, ExpressionError> {
    match (receiver, name) {
        (Value::String(s), "toUpperCase") => Ok(Value::String(s.to_uppercase())),
        (Value::String(s), "toLowerCase") => Ok(Value::String(s.to_lowercase())),
        (Value::String(s), "trim") => Ok(Value::String(s.trim().to_string())),
        (Value::String(s), "includes") => Ok(Value::Bool(s.contains(&arg(args, 0).to_js_string()))),
        (Value::String(s), "startsWith") => {
            Ok(Value::Bool(s.starts_with(&arg(args, 0).to_js_string())))
        }
        (Value::String(s), "endsWith") => {
            Ok(Value::Bool(s.ends_with(&arg(args, 0).to_js_string())))
        }
        (Value::Array(items), "join") => {
            let separator = match arg(args, 0) {
                Value::Undefined => ",".to_string(),
                other => other.to_js_string(),
            };
            let joined = items
                .iter()
                .map(|item| {
                    if item.is_nullish() {
                        String::new()
                    } else {
                        item.to_js_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(&separator);
            Ok(Value::String(joined))
        }
        (Value::Array(items), "includes") => {
            let needle = arg(args, 0);
            Ok(Value::Bool(items.iter().any(|item| same_value_zero(item, &needle))))
        }
        (Value::Number(n), "toFixed") => to_fixed(*n, num_arg(args, 0)).map(Value::String),
        _ => Err(ExpressionError::type_error(format!(
            "{}.{name} is not a function",
            receiver.type_name()
        ))),
    }
}

/// Equality used by `includes`: NaN matches NaN.
fn same_value_zero(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y || (x.is_nan() && y.is_nan()),
        _ => a == b,
    }
}

fn to_fixed(n: f64, digits: f64) -> Result<String, ExpressionError> {
    let digits = if digits.is_nan() { 0.0 } else { digits.trunc() };
    if !(0.0..=100.0).contains(&digits) {
        return Err(ExpressionError::type_error(
            "toFixed() digits argument must be between 0 and 100",
        ));
    }
    if !n.is_finite() || n.abs() >= 1e21 {
        return Ok(format_number(n));
    }
    let digits = digits as usize;
    // Halfway cases round away from zero.
    let rounded = if digits <= 15 {
        let scale = 10f64.powi(digits as i32);
        (n.abs() * scale).round() / scale * n.signum() + 0.0
    } else {
        n
    };
    Ok(format!("{rounded:.digits$}"))
}
