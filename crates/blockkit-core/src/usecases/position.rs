/*
 * usecases/position.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Structural moves: sibling reordering and canvas coordinates.
//!
//! Both refuse to touch locked blocks.

use crate::block::{Block, BlockChanges, BlockId, StyleMap};
use crate::error::{BlockError, BlockResult};
use crate::repository::{BlockRepository, sort_blocks};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Reorder the siblings under one parent.
pub struct ReorderBlocks {
    repository: Arc<dyn BlockRepository>,
}

impl ReorderBlocks {
    pub fn new(repository: Arc<dyn BlockRepository>) -> Self {
        Self { repository }
    }

    /// Assign positions `0..n` to `ids` (children of `parent`, or top-level
    /// blocks when `parent` is `None`). Siblings not listed keep their
    /// relative order and are placed after the listed ones.
    ///
    /// Returns the siblings in their new order. All checks run before the
    /// first write.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an id that does not exist
    /// - `Validation` for a repeated id or an id with a different parent
    /// - `Permission` for a locked block whose position would change
    pub async fn execute(&self, parent: Option<&BlockId>, ids: &[BlockId]) -> BlockResult<Vec<Block>> {
        let mut listed = HashSet::new();
        for id in ids {
            if !listed.insert(id) {
                return Err(BlockError::validation(
                    "ids",
                    format!("block {id} is listed more than once"),
                ));
            }
        }

        let siblings = match parent {
            Some(parent) => self.repository.get_children(parent).await?,
            None => {
                // `get_all` orders across every record; nested blocks
                // without an order must not decide the top-level order.
                let mut top: Vec<Block> = self
                    .repository
                    .get_all()
                    .await?
                    .into_iter()
                    .filter(|b| b.parent.is_none())
                    .collect();
                sort_blocks(&mut top);
                top
            }
        };

        let mut sequence = Vec::with_capacity(siblings.len());
        for id in ids {
            if let Some(block) = siblings.iter().find(|b| &b.id == id) {
                sequence.push(block.clone());
                continue;
            }
            if self.repository.exists(id).await? {
                return Err(BlockError::validation(
                    "ids",
                    format!("block {id} is not a sibling in this list"),
                ));
            }
            return Err(BlockError::not_found(id));
        }
        sequence.extend(siblings.into_iter().filter(|b| !listed.contains(&b.id)));

        let mut moves = Vec::new();
        for (position, block) in sequence.iter().enumerate() {
            let position = position as i64;
            if block.order == Some(position) {
                continue;
            }
            if block.locked {
                return Err(BlockError::permission(&block.id, "moved"));
            }
            moves.push((block.id.clone(), position));
        }

        for (id, position) in &moves {
            let updated = self
                .repository
                .update(id, BlockChanges::new().order(*position))
                .await?;
            if let Some(slot) = sequence.iter_mut().find(|b| &b.id == id) {
                *slot = updated;
            }
        }

        tracing::debug!(count = moves.len(), "Reordered blocks");
        Ok(sequence)
    }
}

/// Canvas coordinates of a block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn validate(&self) -> BlockResult<()> {
        for (axis, value) in [("x", self.x), ("y", self.y)] {
            if !value.is_finite() {
                return Err(BlockError::validation(
                    format!("position.{axis}"),
                    "must be a finite number",
                ));
            }
            if value < 0.0 {
                return Err(BlockError::validation(
                    format!("position.{axis}"),
                    format!("must not be negative, got {value}"),
                ));
            }
        }
        Ok(())
    }

    fn to_style(self) -> StyleMap {
        let mut style = StyleMap::new();
        for (axis, value) in [("x", self.x), ("y", self.y)] {
            if let Some(number) = serde_json::Number::from_f64(value) {
                style.insert(axis.to_string(), serde_json::Value::Number(number));
            }
        }
        style
    }
}

/// Place a block at explicit coordinates, stored as `x`/`y` in its style.
pub struct MoveBlock {
    repository: Arc<dyn BlockRepository>,
}

impl MoveBlock {
    pub fn new(repository: Arc<dyn BlockRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, id: &BlockId, position: Position) -> BlockResult<Block> {
        position.validate()?;

        let block = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| BlockError::not_found(id))?;
        if block.locked {
            return Err(BlockError::permission(id, "moved"));
        }

        let moved = self
            .repository
            .update(id, BlockChanges::new().style(position.to_style()))
            .await?;
        tracing::debug!(block_id = %id, x = position.x, y = position.y, "Moved block");
        Ok(moved)
    }
}
