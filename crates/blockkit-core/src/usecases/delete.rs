/*
 * usecases/delete.rs
 * Copyright (c) 2025 Posit, PBC
 */

use super::collect_subtree;
use crate::block::BlockId;
use crate::error::{BlockError, BlockResult};
use crate::repository::BlockRepository;
use std::sync::Arc;

/// Delete a block and all of its descendants.
pub struct DeleteBlock {
    repository: Arc<dyn BlockRepository>,
}

impl DeleteBlock {
    pub fn new(repository: Arc<dyn BlockRepository>) -> Self {
        Self { repository }
    }

    /// Returns `false` when `id` does not exist.
    ///
    /// # Errors
    ///
    /// `BlockError::Permission` if the block or any descendant is locked.
    /// Nothing is removed in that case.
    pub async fn execute(&self, id: &BlockId) -> BlockResult<bool> {
        let Some(root) = self.repository.get_by_id(id).await? else {
            tracing::debug!(block_id = %id, "Delete target not found");
            return Ok(false);
        };

        let subtree = collect_subtree(self.repository.as_ref(), root).await?;
        if let Some(locked) = subtree.iter().find(|b| b.locked) {
            return Err(BlockError::permission(&locked.id, "deleted"));
        }

        // Children go before their parents.
        for block in subtree.iter().rev() {
            self.repository.delete(&block.id).await?;
        }

        tracing::debug!(block_id = %id, count = subtree.len(), "Deleted block subtree");
        Ok(true)
    }
}
