/*
 * usecases/mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Block use cases.
 */

//! Block use cases.
//!
//! Each use case holds the repository port and enforces the block invariants
//! before delegating. Per block the state machine is:
//!
//! ```text
//! Active <-> Locked      (SetLocked / ToggleLocked)
//! Active <-> Hidden      (SetVisible / ToggleVisible, orthogonal to lock)
//! *      ->  Deleted     (DeleteBlock, cascades to descendants)
//! ```
//!
//! Cascading operations walk the tree sequentially. They are not
//! transactional, but every permission check for the subtree runs before
//! the first write.

mod create;
mod delete;
mod duplicate;
mod flags;
mod position;
mod update;

pub use create::CreateBlock;
pub use delete::DeleteBlock;
pub use duplicate::DuplicateBlock;
pub use flags::BlockFlags;
pub use position::{MoveBlock, Position, ReorderBlocks};
pub use update::{UpdateBlock, UpdateOutcome};

use crate::block::Block;
use crate::error::BlockResult;
use crate::repository::BlockRepository;
use std::collections::HashSet;

/// `root` followed by all of its descendants, depth first, parents before
/// children.
pub(crate) async fn collect_subtree(
    repository: &dyn BlockRepository,
    root: Block,
) -> BlockResult<Vec<Block>> {
    let mut seen = HashSet::new();
    let mut subtree = Vec::new();
    let mut stack = vec![root];

    while let Some(block) = stack.pop() {
        if !seen.insert(block.id.clone()) {
            continue;
        }
        let children = repository.get_children(&block.id).await?;
        stack.extend(children.into_iter().rev());
        subtree.push(block);
    }

    Ok(subtree)
}
