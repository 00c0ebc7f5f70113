/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Turning a stored block into output.

use crate::block::{Block, PropMap, RenderRecipe};
use crate::error::{BlockError, BlockResult};
use crate::registry::BlockTypeRegistry;
use blockkit_diagnostics::DiagnosticMessage;
use blockkit_template::{RenderContext, RenderOptions, Template};
use serde::Serialize;

/// Output of [`BlockRenderer::render`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderedBlock {
    /// Interpreter output for an `html` recipe.
    Markup {
        markup: String,
        diagnostics: Vec<DiagnosticMessage>,
    },
    /// Descriptor for the host to mount. Props are the recipe props
    /// overlaid with the block props.
    Component {
        framework: String,
        name: String,
        props: PropMap,
    },
    External {
        adapter: String,
        payload: serde_json::Value,
    },
    Hidden,
}

impl RenderedBlock {
    pub fn markup(&self) -> Option<&str> {
        match self {
            RenderedBlock::Markup { markup, .. } => Some(markup),
            _ => None,
        }
    }

    pub fn diagnostics(&self) -> &[DiagnosticMessage] {
        match self {
            RenderedBlock::Markup { diagnostics, .. } => diagnostics,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BlockRenderer {
    options: RenderOptions,
}

impl BlockRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render with the block's own recipe, falling back to the recipe
    /// registered for its type.
    ///
    /// # Errors
    ///
    /// `MissingRecipe` when neither exists. Template problems are reported
    /// as diagnostics, not errors.
    pub fn render(
        &self,
        block: &Block,
        registry: Option<&BlockTypeRegistry>,
    ) -> BlockResult<RenderedBlock> {
        if !block.visible {
            return Ok(RenderedBlock::Hidden);
        }

        let recipe = block
            .render
            .as_ref()
            .or_else(|| registry.and_then(|r| r.recipe(&block.block_type)))
            .ok_or_else(|| BlockError::MissingRecipe {
                block_type: block.block_type.clone(),
            })?;

        tracing::debug!(
            block_id = %block.id,
            block_type = %block.block_type,
            recipe = recipe.kind(),
            "Rendering block"
        );

        match recipe {
            RenderRecipe::Html { template } => {
                let template = Template::compile(template)?;
                let context = RenderContext::from_json(serde_json::Value::Object(block.props.clone()));
                let rendered = template.render_with(&context, self.options);
                if !rendered.diagnostics.is_empty() {
                    tracing::warn!(
                        block_id = %block.id,
                        count = rendered.diagnostics.len(),
                        "Block rendered with diagnostics"
                    );
                }
                Ok(RenderedBlock::Markup {
                    markup: rendered.to_markup(),
                    diagnostics: rendered.diagnostics,
                })
            }
            RenderRecipe::Component {
                framework,
                name,
                props,
            } => {
                let mut merged = props.clone();
                merged.extend(block.props.clone());
                Ok(RenderedBlock::Component {
                    framework: framework.clone(),
                    name: name.clone(),
                    props: merged,
                })
            }
            RenderRecipe::External { adapter, payload } => Ok(RenderedBlock::External {
                adapter: adapter.clone(),
                payload: payload.clone(),
            }),
        }
    }
}
