/*
 * usecases/create.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::block::{Block, NewBlock};
use crate::error::BlockResult;
use crate::repository::BlockRepository;
use crate::validation::validate_new_block;
use std::sync::Arc;

/// Create a block after checking its shape.
pub struct CreateBlock {
    repository: Arc<dyn BlockRepository>,
}

impl CreateBlock {
    pub fn new(repository: Arc<dyn BlockRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, block: NewBlock) -> BlockResult<Block> {
        validate_new_block(&block)?;
        let created = self.repository.create(block).await?;
        tracing::debug!(
            block_id = %created.id,
            block_type = %created.block_type,
            "Created block"
        );
        Ok(created)
    }
}
