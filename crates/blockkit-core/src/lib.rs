/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Block domain for blockkit.
//!
//! This crate owns the block record, the [`BlockRepository`] storage port and
//! the use cases that enforce block invariants on top of it:
//!
//! - [`CreateBlock`], [`UpdateBlock`]
//! - [`DeleteBlock`] and [`DuplicateBlock`], both cascading to descendants
//! - [`ReorderBlocks`] and [`MoveBlock`]
//! - [`BlockFlags`] for lock and visibility toggles
//!
//! [`BlockController`] bundles them with a [`BlockTypeRegistry`] and a
//! [`BlockRenderer`].
//!
//! ```
//! use std::sync::Arc;
//! use blockkit_core::{BlockController, InMemoryBlockRepository, NewBlock, RenderRecipe};
//!
//! # pollster::block_on(async {
//! let controller = BlockController::new(Arc::new(InMemoryBlockRepository::new()));
//! let block = controller
//!     .create(
//!         NewBlock::new("text")
//!             .with_prop("content", "hi")
//!             .with_render(RenderRecipe::html("<p>[[ content ]]</p>")),
//!     )
//!     .await
//!     .unwrap();
//!
//! let rendered = controller.render_block(&block.id).await.unwrap();
//! assert_eq!(rendered.markup(), Some("<p>hi</p>"));
//! # });
//! ```

pub mod block;
pub mod config;
pub mod controller;
pub mod error;
pub mod registry;
pub mod render;
pub mod repository;
pub mod usecases;
pub mod validation;

pub use block::{
    Block, BlockChanges, BlockId, BlockMetadata, NewBlock, PropMap, RenderRecipe, StyleMap,
};
pub use config::{BlockKitConfig, ConfigError};
pub use controller::BlockController;
pub use error::{BlockError, BlockResult, ErrorKind};
pub use registry::{
    BlockTypeDefinition, BlockTypeRegistry, FieldPattern, PropViolation, RegistryError,
};
pub use render::{BlockRenderer, RenderedBlock};
pub use repository::{BlockRepository, InMemoryBlockRepository};
pub use usecases::{
    BlockFlags, CreateBlock, DeleteBlock, DuplicateBlock, MoveBlock, Position, ReorderBlocks,
    UpdateBlock, UpdateOutcome,
};
