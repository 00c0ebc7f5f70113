/*
 * repository/mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Storage port for block records.
 */

//! Storage port for block records.
//!
//! Use cases only talk to storage through [`BlockRepository`]. Adapters may
//! suspend on I/O; the use cases run each call to completion sequentially.

mod memory;

pub use memory::InMemoryBlockRepository;

use crate::block::{Block, BlockChanges, BlockId, NewBlock};
use crate::error::BlockResult;
use async_trait::async_trait;

/// Contract every block store must satisfy.
#[async_trait]
pub trait BlockRepository: Send + Sync {
    /// Store a new block. The repository assigns the id and stamps
    /// metadata with `version = 1`.
    async fn create(&self, block: NewBlock) -> BlockResult<Block>;

    async fn get_by_id(&self, id: &BlockId) -> BlockResult<Option<Block>>;

    /// All blocks, ordered as described by [`sort_blocks`].
    async fn get_all(&self) -> BlockResult<Vec<Block>>;

    async fn get_by_type(&self, block_type: &str) -> BlockResult<Vec<Block>>;

    /// Direct children of `parent`, same ordering as [`get_all`](Self::get_all).
    async fn get_children(&self, parent: &BlockId) -> BlockResult<Vec<Block>>;

    /// Merge `changes` into the stored block, bump its version and refresh
    /// `updatedAt`.
    ///
    /// # Errors
    ///
    /// `BlockError::NotFound` if `id` is absent.
    async fn update(&self, id: &BlockId, changes: BlockChanges) -> BlockResult<Block>;

    /// Remove one record. Returns whether it existed. Does not cascade.
    async fn delete(&self, id: &BlockId) -> BlockResult<bool>;

    async fn exists(&self, id: &BlockId) -> BlockResult<bool>;

    async fn count(&self) -> BlockResult<usize>;

    async fn clear(&self) -> BlockResult<()>;
}

/// Order blocks by `order` when every block has one, otherwise by creation
/// time. The sort is stable, so ties keep the input (insertion) order.
pub fn sort_blocks(blocks: &mut [Block]) {
    if blocks.iter().all(|b| b.order.is_some()) {
        blocks.sort_by_key(|b| b.order);
    } else {
        blocks.sort_by_key(|b| b.metadata.created_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;

    fn block(id: &str, order: Option<i64>, age: i64) -> Block {
        let mut new = NewBlock::new("text");
        new.order = order;
        Block::from_new(
            BlockId::from(id),
            new,
            Utc::now() - Duration::seconds(age),
        )
    }

    fn ids(blocks: &[Block]) -> Vec<&str> {
        blocks.iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn test_sort_by_order_when_complete() {
        let mut blocks = vec![block("a", Some(2), 30), block("b", Some(0), 20), block("c", Some(1), 10)];
        sort_blocks(&mut blocks);
        assert_eq!(ids(&blocks), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_by_creation_when_order_missing() {
        let mut blocks = vec![block("a", Some(2), 10), block("b", None, 30), block("c", Some(0), 20)];
        sort_blocks(&mut blocks);
        assert_eq!(ids(&blocks), vec!["b", "c", "a"]);
    }
}
