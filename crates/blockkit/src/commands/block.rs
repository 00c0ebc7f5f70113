/*
 * commands/block.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Block command implementation
 */

//! `blockkit block`: load a block description, store it in a scratch
//! in-memory repository and render it.
//!
//! The input is a block creation payload:
//!
//! ```json
//! { "type": "text", "props": { "content": "hi" } }
//! ```
//!
//! Field defaults from the registry are applied under the given props.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use blockkit_core::{
    BlockController, BlockKitConfig, BlockTypeRegistry, InMemoryBlockRepository, NewBlock,
    RenderedBlock,
};
use tracing::{debug, info, warn};

use super::report_diagnostics;

/// Arguments for the block command
#[derive(Debug)]
pub struct BlockArgs {
    pub block: PathBuf,
    /// Overrides `[registry] path` from the config file
    pub registry: Option<PathBuf>,
    pub json_diagnostics: bool,
}

/// Execute the block command
pub fn execute(args: BlockArgs, config: &BlockKitConfig) -> Result<()> {
    let text = std::fs::read_to_string(&args.block)
        .with_context(|| format!("Failed to read block {}", args.block.display()))?;
    let new: NewBlock = serde_json::from_str(&text)
        .with_context(|| format!("Invalid block JSON in {}", args.block.display()))?;

    let mut controller = BlockController::new(Arc::new(InMemoryBlockRepository::new()))
        .with_options(config.render_options());
    if let Some(path) = args.registry.as_ref().or(config.registry.path.as_ref()) {
        controller = controller.with_registry(BlockTypeRegistry::load(path)?);
    }
    let registered = controller
        .registry()
        .is_none_or(|registry| registry.contains(&new.block_type));
    if !registered {
        warn!(block_type = %new.block_type, "Block type is not in the registry");
    }

    let rendered = pollster::block_on(async {
        let block = if registered {
            controller.add(new).await?
        } else {
            controller.create(new).await?
        };
        debug!(block_id = %block.id, "Stored block");
        controller.render_block(&block.id).await
    })
    .with_context(|| format!("Failed to render block {}", args.block.display()))?;

    match &rendered {
        RenderedBlock::Markup {
            markup,
            diagnostics,
        } => {
            println!("{markup}");
            report_diagnostics(diagnostics, None, args.json_diagnostics);
            if diagnostics.iter().any(|d| d.is_error()) {
                anyhow::bail!("Rendering {} produced errors", args.block.display());
            }
        }
        RenderedBlock::Hidden => info!("Block is hidden; nothing rendered"),
        other => println!("{}", serde_json::to_string_pretty(other)?),
    }

    Ok(())
}
