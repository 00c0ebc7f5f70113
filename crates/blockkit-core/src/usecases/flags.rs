/*
 * usecases/flags.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Lock and visibility toggles.
//!
//! Each is a single-field change routed through [`UpdateBlock`], so a missing
//! block yields [`UpdateOutcome::NotFound`] rather than an error.

use super::update::{UpdateBlock, UpdateOutcome};
use crate::block::{BlockChanges, BlockId};
use crate::error::BlockResult;
use crate::repository::BlockRepository;
use std::sync::Arc;

pub struct BlockFlags {
    repository: Arc<dyn BlockRepository>,
    update: UpdateBlock,
}

impl BlockFlags {
    pub fn new(repository: Arc<dyn BlockRepository>) -> Self {
        Self {
            update: UpdateBlock::new(repository.clone()),
            repository,
        }
    }

    pub async fn set_locked(&self, id: &BlockId, locked: bool) -> BlockResult<UpdateOutcome> {
        tracing::debug!(block_id = %id, locked, "Setting lock");
        self.update
            .execute(id, BlockChanges::new().locked(locked))
            .await
    }

    pub async fn set_visible(&self, id: &BlockId, visible: bool) -> BlockResult<UpdateOutcome> {
        tracing::debug!(block_id = %id, visible, "Setting visibility");
        self.update
            .execute(id, BlockChanges::new().visible(visible))
            .await
    }

    pub async fn toggle_locked(&self, id: &BlockId) -> BlockResult<UpdateOutcome> {
        match self.repository.get_by_id(id).await? {
            Some(block) => self.set_locked(id, !block.locked).await,
            None => Ok(UpdateOutcome::NotFound),
        }
    }

    pub async fn toggle_visible(&self, id: &BlockId) -> BlockResult<UpdateOutcome> {
        match self.repository.get_by_id(id).await? {
            Some(block) => self.set_visible(id, !block.visible).await,
            None => Ok(UpdateOutcome::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::NewBlock;
    use crate::repository::InMemoryBlockRepository;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_lock_and_visibility_are_orthogonal() {
        let repo = Arc::new(InMemoryBlockRepository::new());
        let block = repo.create(NewBlock::new("text")).await.unwrap();
        let flags = BlockFlags::new(repo.clone());

        let locked = flags.toggle_locked(&block.id).await.unwrap().into_block().unwrap();
        assert!(locked.locked);
        assert!(locked.visible);

        let hidden = flags.toggle_visible(&block.id).await.unwrap().into_block().unwrap();
        assert!(hidden.locked);
        assert!(!hidden.visible);
        assert_eq!(hidden.metadata.version, 3);

        let shown = flags.set_visible(&block.id, true).await.unwrap().into_block().unwrap();
        assert!(shown.visible);
        let unlocked = flags.toggle_locked(&block.id).await.unwrap().into_block().unwrap();
        assert!(!unlocked.locked);
    }

    #[tokio::test]
    async fn test_flags_on_missing_block() {
        let repo = Arc::new(InMemoryBlockRepository::new());
        let flags = BlockFlags::new(repo);
        let id = BlockId::from("ghost");
        assert_eq!(flags.set_locked(&id, true).await.unwrap(), UpdateOutcome::NotFound);
        assert_eq!(flags.toggle_visible(&id).await.unwrap(), UpdateOutcome::NotFound);
    }
}
