/*
 * commands/render.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Render command implementation
 */

//! `blockkit render`: render one template file against a JSON context.

use std::path::PathBuf;

use anyhow::{Context, Result};
use blockkit_core::BlockKitConfig;
use blockkit_diagnostics::SourceFile;
use blockkit_template::{RenderContext, Template};
use tracing::{debug, info};

use super::report_diagnostics;

/// Arguments for the render command
#[derive(Debug)]
pub struct RenderArgs {
    pub template: PathBuf,
    /// JSON object used as the render context
    pub context: Option<PathBuf>,
    pub strict: bool,
    pub json_diagnostics: bool,
}

/// Execute the render command
pub fn execute(args: RenderArgs, config: &BlockKitConfig) -> Result<()> {
    let source = std::fs::read_to_string(&args.template)
        .with_context(|| format!("Failed to read template {}", args.template.display()))?;

    let context = match &args.context {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read context {}", path.display()))?;
            let json: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("Invalid JSON in {}", path.display()))?;
            if !json.is_object() {
                anyhow::bail!("Context file {} must contain a JSON object", path.display());
            }
            RenderContext::from_json(json)
        }
        None => RenderContext::new(),
    };

    let mut options = config.render_options();
    if args.strict {
        options.strict_mode = true;
    }
    debug!(?options, template = %args.template.display(), "Rendering template");

    let template = Template::compile(&source)?;
    let rendered = template.render_with(&context, options);

    println!("{}", rendered.to_markup());

    let file = SourceFile::new(args.template.display().to_string(), source);
    report_diagnostics(&rendered.diagnostics, Some(&file), args.json_diagnostics);

    if rendered.has_errors() {
        anyhow::bail!(
            "Rendering {} produced errors",
            args.template.display()
        );
    }

    info!(
        diagnostics = rendered.diagnostics.len(),
        "Rendered {}",
        args.template.display()
    );
    Ok(())
}
