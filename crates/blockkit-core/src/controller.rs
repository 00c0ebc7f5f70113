/*
 * controller.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Single entry point for hosts.
//!
//! A [`BlockController`] bundles a repository, an optional block-type
//! registry and render options. Hosts create one and pass it where needed.

use crate::block::{Block, BlockChanges, BlockId, NewBlock, PropMap};
use crate::config::BlockKitConfig;
use crate::error::{BlockError, BlockResult};
use crate::registry::{BlockTypeRegistry, RegistryError};
use crate::render::{BlockRenderer, RenderedBlock};
use crate::repository::BlockRepository;
use crate::usecases::{
    BlockFlags, CreateBlock, DeleteBlock, DuplicateBlock, MoveBlock, Position, ReorderBlocks,
    UpdateBlock, UpdateOutcome,
};
use blockkit_template::RenderOptions;
use std::sync::Arc;

pub struct BlockController {
    repository: Arc<dyn BlockRepository>,
    registry: Option<Arc<BlockTypeRegistry>>,
    renderer: BlockRenderer,
    create: CreateBlock,
    update: UpdateBlock,
    delete: DeleteBlock,
    duplicate: DuplicateBlock,
    reorder: ReorderBlocks,
    mover: MoveBlock,
    flags: BlockFlags,
}

impl BlockController {
    pub fn new(repository: Arc<dyn BlockRepository>) -> Self {
        Self {
            registry: None,
            renderer: BlockRenderer::default(),
            create: CreateBlock::new(repository.clone()),
            update: UpdateBlock::new(repository.clone()),
            delete: DeleteBlock::new(repository.clone()),
            duplicate: DuplicateBlock::new(repository.clone()),
            reorder: ReorderBlocks::new(repository.clone()),
            mover: MoveBlock::new(repository.clone()),
            flags: BlockFlags::new(repository.clone()),
            repository,
        }
    }

    /// Controller configured from a [`BlockKitConfig`]: render options, and
    /// the registry file when one is named.
    pub fn from_config(
        repository: Arc<dyn BlockRepository>,
        config: &BlockKitConfig,
    ) -> Result<Self, RegistryError> {
        let mut controller = Self::new(repository).with_options(config.render_options());
        if let Some(path) = &config.registry.path {
            controller = controller.with_registry(BlockTypeRegistry::load(path)?);
        }
        Ok(controller)
    }

    pub fn with_registry(mut self, registry: impl Into<Arc<BlockTypeRegistry>>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.renderer = BlockRenderer::new(options);
        self
    }

    pub fn registry(&self) -> Option<&BlockTypeRegistry> {
        self.registry.as_deref()
    }

    pub fn repository(&self) -> &Arc<dyn BlockRepository> {
        &self.repository
    }

    pub async fn get(&self, id: &BlockId) -> BlockResult<Option<Block>> {
        self.repository.get_by_id(id).await
    }

    pub async fn all(&self) -> BlockResult<Vec<Block>> {
        self.repository.get_all().await
    }

    pub async fn children(&self, id: &BlockId) -> BlockResult<Vec<Block>> {
        self.repository.get_children(id).await
    }

    pub async fn create(&self, block: NewBlock) -> BlockResult<Block> {
        self.create.execute(block).await
    }

    /// Create a block of a registered type: field defaults first, then
    /// `overrides`, checked against the type's field rules.
    ///
    /// Without a registry this is a plain create with `overrides` as props.
    pub async fn add_block(&self, block_type: &str, overrides: PropMap) -> BlockResult<Block> {
        self.add(NewBlock::new(block_type).with_props(overrides)).await
    }

    /// Like [`add_block`](Self::add_block) for a full creation payload.
    /// Registry defaults fill props the payload leaves out; settings, style
    /// and the other fields pass through unchanged.
    pub async fn add(&self, mut new: NewBlock) -> BlockResult<Block> {
        let Some(registry) = self.registry.as_deref() else {
            return self.create.execute(new).await;
        };
        let block_type = new.block_type.clone();

        let mut props = registry
            .default_props(&block_type)
            .map_err(|err| BlockError::validation("type", err.to_string()))?;
        props.extend(std::mem::take(&mut new.props));
        new.props = props;

        let violations = registry
            .validate_props(&block_type, &new.props)
            .map_err(|err| BlockError::validation("type", err.to_string()))?;
        if let Some(first) = violations.first() {
            for violation in &violations {
                tracing::debug!(block_type = %block_type, field = %violation.field, rule = %violation.rule, "{}", violation.message);
            }
            let message = violations
                .iter()
                .map(|v| v.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(BlockError::validation(format!("props.{}", first.field), message));
        }

        let block = self.create.execute(new).await?;
        tracing::info!(block_id = %block.id, block_type = %block_type, "Added block");
        Ok(block)
    }

    pub async fn update(&self, id: &BlockId, changes: BlockChanges) -> BlockResult<UpdateOutcome> {
        self.update.execute(id, changes).await
    }

    pub async fn delete(&self, id: &BlockId) -> BlockResult<bool> {
        self.delete.execute(id).await
    }

    pub async fn duplicate(&self, id: &BlockId) -> BlockResult<Option<Block>> {
        self.duplicate.execute(id).await
    }

    pub async fn reorder(&self, parent: Option<&BlockId>, ids: &[BlockId]) -> BlockResult<Vec<Block>> {
        self.reorder.execute(parent, ids).await
    }

    pub async fn move_to(&self, id: &BlockId, position: Position) -> BlockResult<Block> {
        self.mover.execute(id, position).await
    }

    pub async fn set_locked(&self, id: &BlockId, locked: bool) -> BlockResult<UpdateOutcome> {
        self.flags.set_locked(id, locked).await
    }

    pub async fn set_visible(&self, id: &BlockId, visible: bool) -> BlockResult<UpdateOutcome> {
        self.flags.set_visible(id, visible).await
    }

    pub async fn toggle_locked(&self, id: &BlockId) -> BlockResult<UpdateOutcome> {
        self.flags.toggle_locked(id).await
    }

    pub async fn toggle_visible(&self, id: &BlockId) -> BlockResult<UpdateOutcome> {
        self.flags.toggle_visible(id).await
    }

    /// Render a stored block.
    pub async fn render_block(&self, id: &BlockId) -> BlockResult<RenderedBlock> {
        let block = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| BlockError::not_found(id))?;
        self.renderer.render(&block, self.registry())
    }
}
