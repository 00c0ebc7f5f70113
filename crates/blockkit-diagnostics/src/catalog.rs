/*
 * catalog.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error code catalog and lookup.
//!
//! Maps error codes (like "B-2-1") to their metadata: subsystem, title and a
//! default message.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata for an error code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorCodeInfo {
    /// Subsystem name (e.g., "markup", "directive", "expression")
    pub subsystem: String,

    /// Short title for the error
    pub title: String,

    /// Default message
    pub message_template: String,

    /// When this error was introduced (version)
    pub since_version: String,
}

/// Global error catalog, embedded at compile time from `error_catalog.json`.
///
/// # Panics
///
/// Panics if the embedded JSON is invalid, which can only happen if the
/// catalog file is edited incorrectly.
pub static ERROR_CATALOG: Lazy<HashMap<String, ErrorCodeInfo>> = Lazy::new(|| {
    let json_data = include_str!("../error_catalog.json");
    serde_json::from_str(json_data).expect("Invalid error catalog JSON - this is a bug in blockkit")
});

/// Look up error code information.
pub fn get_error_info(code: &str) -> Option<&ErrorCodeInfo> {
    ERROR_CATALOG.get(code)
}

/// Get the subsystem name for an error code.
///
/// ```
/// use blockkit_diagnostics::catalog::get_subsystem;
///
/// assert_eq!(get_subsystem("B-2-1"), Some("directive"));
/// ```
pub fn get_subsystem(code: &str) -> Option<&str> {
    ERROR_CATALOG.get(code).map(|info| info.subsystem.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        assert!(!ERROR_CATALOG.is_empty());
    }

    #[test]
    fn test_every_code_is_well_formed() {
        for code in ERROR_CATALOG.keys() {
            let parts: Vec<&str> = code.split('-').collect();
            assert_eq!(parts.len(), 3, "bad code {code}");
            assert_eq!(parts[0], "B");
            assert!(parts[1].parse::<u32>().is_ok());
            assert!(parts[2].parse::<u32>().is_ok());
        }
    }

    #[test]
    fn test_lookup() {
        let info = get_error_info("B-3-1").unwrap();
        assert_eq!(info.subsystem, "expression");
        assert_eq!(info.title, "Unknown Name");
        assert_eq!(get_subsystem("B-1-1"), Some("markup"));
    }

    #[test]
    fn test_nonexistent_code() {
        assert!(get_error_info("B-999-999").is_none());
        assert!(get_subsystem("B-999-999").is_none());
    }
}
