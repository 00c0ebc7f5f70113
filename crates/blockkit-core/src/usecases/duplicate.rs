/*
 * usecases/duplicate.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::block::{Block, BlockId};
use crate::error::BlockResult;
use crate::repository::BlockRepository;
use std::sync::Arc;

/// Copy a block and its descendants.
///
/// Copies keep type, settings, props, style, render recipe, order and
/// visibility, get fresh ids and metadata, and are never locked. The top copy
/// keeps the original's parent; every descendant copy is re-parented to the
/// copy of its original parent.
pub struct DuplicateBlock {
    repository: Arc<dyn BlockRepository>,
}

impl DuplicateBlock {
    pub fn new(repository: Arc<dyn BlockRepository>) -> Self {
        Self { repository }
    }

    /// Returns the top copy, or `None` when `id` does not exist.
    pub async fn execute(&self, id: &BlockId) -> BlockResult<Option<Block>> {
        let Some(original) = self.repository.get_by_id(id).await? else {
            tracing::debug!(block_id = %id, "Duplicate target not found");
            return Ok(None);
        };

        let copy = self.repository.create(original.to_copy()).await?;
        let mut count = 1;

        // (original id, id of its copy)
        let mut pending: Vec<(BlockId, BlockId)> = vec![(original.id, copy.id.clone())];
        while let Some((source, target)) = pending.pop() {
            let children = self.repository.get_children(&source).await?;
            for child in children {
                let mut new = child.to_copy();
                new.parent = Some(target.clone());
                let child_copy = self.repository.create(new).await?;
                count += 1;
                pending.push((child.id, child_copy.id));
            }
        }

        tracing::debug!(block_id = %id, copy_id = %copy.id, count, "Duplicated block subtree");
        Ok(Some(copy))
    }
}
