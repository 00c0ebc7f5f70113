/*
 * commands/mod.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Command implementations for the blockkit CLI
//!
//! Each command module handles the CLI interface and delegates to
//! blockkit-core and blockkit-template for the actual work.

pub mod block;
pub mod registry;
pub mod render;

use anyhow::{Context, Result};
use blockkit_core::BlockKitConfig;
use blockkit_diagnostics::{DiagnosticMessage, SourceFile};
use std::path::Path;

/// Explicit `--config`, else `blockkit.toml` in the working directory.
pub fn load_config(path: Option<&Path>) -> Result<BlockKitConfig> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Ok(BlockKitConfig::discover(path, &cwd)?)
}

/// Write diagnostics to stderr, one JSON object per line or as text.
pub fn report_diagnostics(
    diagnostics: &[DiagnosticMessage],
    source: Option<&SourceFile>,
    json: bool,
) {
    for diagnostic in diagnostics {
        if json {
            eprintln!("{}", diagnostic.to_json());
        } else {
            eprintln!("{}", diagnostic.to_text(source));
        }
    }
}
