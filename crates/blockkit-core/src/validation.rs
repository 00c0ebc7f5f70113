/*
 * validation.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Shape checks shared by the create and update use cases.

use crate::block::{BlockChanges, NewBlock, PropMap, StyleMap};
use crate::error::{BlockError, BlockResult};
use serde_json::Value;

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Every value must be a string, number, boolean or null.
pub fn validate_primitives(field: &str, values: &PropMap) -> BlockResult<()> {
    for (key, value) in values {
        if matches!(value, Value::Array(_) | Value::Object(_)) {
            return Err(BlockError::validation(
                format!("{field}.{key}"),
                format!(
                    "expected a string, number, boolean or null, found {}",
                    json_type_name(value)
                ),
            ));
        }
    }
    Ok(())
}

/// Every value must be a string or a number.
pub fn validate_style(style: &StyleMap) -> BlockResult<()> {
    for (key, value) in style {
        if !matches!(value, Value::String(_) | Value::Number(_)) {
            return Err(BlockError::validation(
                format!("style.{key}"),
                format!("expected a string or number, found {}", json_type_name(value)),
            ));
        }
    }
    Ok(())
}

pub fn validate_new_block(block: &NewBlock) -> BlockResult<()> {
    if block.block_type.trim().is_empty() {
        return Err(BlockError::validation("type", "must not be empty"));
    }
    validate_primitives("settings", &block.settings)?;
    validate_primitives("props", &block.props)?;
    if let Some(style) = &block.style {
        validate_style(style)?;
    }
    Ok(())
}

pub fn validate_changes(changes: &BlockChanges) -> BlockResult<()> {
    if let Some(settings) = &changes.settings {
        validate_primitives("settings", settings)?;
    }
    if let Some(props) = &changes.props {
        validate_primitives("props", props)?;
    }
    if let Some(style) = &changes.style {
        validate_style(style)?;
    }
    Ok(())
}
