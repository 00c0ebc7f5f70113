/*
 * commands/registry.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! `blockkit registry check`

use std::path::Path;

use anyhow::Result;
use blockkit_core::BlockTypeRegistry;
use tracing::info;

/// Load a registry and list any problems in its definitions.
pub fn check(path: &Path) -> Result<()> {
    let registry = BlockTypeRegistry::load(path)?;

    for (block_type, definition) in registry.types() {
        let recipe = definition
            .render
            .as_ref()
            .map(|r| r.kind())
            .unwrap_or("none");
        println!(
            "{block_type}: {} ({} fields, render: {recipe})",
            definition.title,
            definition.fields.len()
        );
    }

    let problems = registry.check();
    for problem in &problems {
        eprintln!("{problem}");
    }
    if !problems.is_empty() {
        anyhow::bail!("{} has {} problem(s)", path.display(), problems.len());
    }

    info!(types = registry.len(), "Registry {} is valid", path.display());
    Ok(())
}
