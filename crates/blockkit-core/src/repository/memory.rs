/*
 * repository/memory.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! In-process block store.

use super::{BlockRepository, sort_blocks};
use crate::block::{Block, BlockChanges, BlockId, NewBlock};
use crate::error::{BlockError, BlockResult};
use async_trait::async_trait;
use chrono::Utc;
use hashlink::LinkedHashMap;
use tokio::sync::RwLock;

/// Reference [`BlockRepository`] backed by an insertion-ordered map.
#[derive(Debug, Default)]
pub struct InMemoryBlockRepository {
    blocks: RwLock<LinkedHashMap<BlockId, Block>>,
}

impl InMemoryBlockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn collect<F>(&self, filter: F) -> Vec<Block>
    where
        F: Fn(&Block) -> bool,
    {
        let blocks = self.blocks.read().await;
        let mut matching: Vec<Block> = blocks.values().filter(|&b| filter(b)).cloned().collect();
        sort_blocks(&mut matching);
        matching
    }
}

#[async_trait]
impl BlockRepository for InMemoryBlockRepository {
    async fn create(&self, block: NewBlock) -> BlockResult<Block> {
        let mut blocks = self.blocks.write().await;
        let mut id = BlockId::generate();
        while blocks.contains_key(&id) {
            id = BlockId::generate();
        }
        let created = Block::from_new(id.clone(), block, Utc::now());
        blocks.insert(id, created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: &BlockId) -> BlockResult<Option<Block>> {
        Ok(self.blocks.read().await.get(id).cloned())
    }

    async fn get_all(&self) -> BlockResult<Vec<Block>> {
        Ok(self.collect(|_| true).await)
    }

    async fn get_by_type(&self, block_type: &str) -> BlockResult<Vec<Block>> {
        Ok(self.collect(|b| b.block_type == block_type).await)
    }

    async fn get_children(&self, parent: &BlockId) -> BlockResult<Vec<Block>> {
        Ok(self.collect(|b| b.parent.as_ref() == Some(parent)).await)
    }

    async fn update(&self, id: &BlockId, changes: BlockChanges) -> BlockResult<Block> {
        let mut blocks = self.blocks.write().await;
        let block = blocks.get_mut(id).ok_or_else(|| BlockError::not_found(id))?;
        block.apply(changes, Utc::now());
        Ok(block.clone())
    }

    async fn delete(&self, id: &BlockId) -> BlockResult<bool> {
        Ok(self.blocks.write().await.remove(id).is_some())
    }

    async fn exists(&self, id: &BlockId) -> BlockResult<bool> {
        Ok(self.blocks.read().await.contains_key(id))
    }

    async fn count(&self) -> BlockResult<usize> {
        Ok(self.blocks.read().await.len())
    }

    async fn clear(&self) -> BlockResult<()> {
        self.blocks.write().await.clear();
        Ok(())
    }
}
