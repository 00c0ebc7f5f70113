/*
 * usecases/update.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::block::{Block, BlockChanges, BlockId};
use crate::error::{BlockError, BlockResult};
use crate::repository::BlockRepository;
use crate::validation::validate_changes;
use std::sync::Arc;

/// Result of [`UpdateBlock::execute`].
///
/// A missing target is an ordinary outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(Block),
    NotFound,
}

impl UpdateOutcome {
    pub fn block(&self) -> Option<&Block> {
        match self {
            UpdateOutcome::Updated(block) => Some(block),
            UpdateOutcome::NotFound => None,
        }
    }

    pub fn into_block(self) -> Option<Block> {
        match self {
            UpdateOutcome::Updated(block) => Some(block),
            UpdateOutcome::NotFound => None,
        }
    }
}

pub struct UpdateBlock {
    repository: Arc<dyn BlockRepository>,
}

impl UpdateBlock {
    pub fn new(repository: Arc<dyn BlockRepository>) -> Self {
        Self { repository }
    }

    /// Apply `changes` to a stored block.
    ///
    /// A locked block accepts content and flag changes but not a new
    /// `order` or new `x`/`y` style coordinates.
    pub async fn execute(&self, id: &BlockId, changes: BlockChanges) -> BlockResult<UpdateOutcome> {
        let Some(current) = self.repository.get_by_id(id).await? else {
            tracing::debug!(block_id = %id, "Update target not found");
            return Ok(UpdateOutcome::NotFound);
        };
        validate_changes(&changes)?;
        if current.locked && moves_block(&current, &changes) {
            return Err(BlockError::permission(id, "moved"));
        }

        let updated = self.repository.update(id, changes).await?;
        tracing::debug!(
            block_id = %id,
            version = updated.metadata.version,
            "Updated block"
        );
        Ok(UpdateOutcome::Updated(updated))
    }
}

fn moves_block(current: &Block, changes: &BlockChanges) -> bool {
    if let Some(order) = changes.order
        && current.order != Some(order)
    {
        return true;
    }
    let Some(style) = &changes.style else {
        return false;
    };
    ["x", "y"].into_iter().any(|axis| {
        style.get(axis).is_some_and(|value| {
            current.style.as_ref().and_then(|s| s.get(axis)) != Some(value)
        })
    })
}
