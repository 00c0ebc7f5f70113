/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Error types for block use cases.
 */

//! Error types for blockkit-core.

use crate::block::BlockId;
use blockkit_template::TemplateError;
use thiserror::Error;

/// Main error type for block operations.
#[derive(Debug, Error)]
pub enum BlockError {
    /// Bad input shape: a non-primitive prop, an invalid position, ...
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Block not found: {id}")]
    NotFound { id: BlockId },

    /// Mutation refused because a block is locked.
    #[error("Block {id} is locked and cannot be {action}")]
    Permission { id: BlockId, action: String },

    /// Neither the block nor its registered type carries a render recipe.
    #[error("No render recipe for block type '{block_type}'")]
    MissingRecipe { block_type: String },

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// Failure reported by a repository adapter.
    #[error("Repository error: {0}")]
    Repository(String),
}

/// Coarse classification of a [`BlockError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Permission,
    Repository,
}

impl BlockError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BlockError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(id: &BlockId) -> Self {
        BlockError::NotFound { id: id.clone() }
    }

    pub fn permission(id: &BlockId, action: impl Into<String>) -> Self {
        BlockError::Permission {
            id: id.clone(),
            action: action.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BlockError::Validation { .. } | BlockError::Template(_) => ErrorKind::Validation,
            BlockError::NotFound { .. } | BlockError::MissingRecipe { .. } => ErrorKind::NotFound,
            BlockError::Permission { .. } => ErrorKind::Permission,
            BlockError::Repository(_) => ErrorKind::Repository,
        }
    }
}

/// Result type alias for block operations.
pub type BlockResult<T> = std::result::Result<T, BlockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let id = BlockId::from("b1");
        assert_eq!(
            BlockError::permission(&id, "deleted").to_string(),
            "Block b1 is locked and cannot be deleted"
        );
        assert_eq!(
            BlockError::validation("props.items", "must be a primitive").to_string(),
            "Invalid props.items: must be a primitive"
        );
        assert_eq!(BlockError::not_found(&id).to_string(), "Block not found: b1");
    }

    #[test]
    fn test_kinds_are_distinguishable() {
        let id = BlockId::from("b1");
        assert_eq!(BlockError::not_found(&id).kind(), ErrorKind::NotFound);
        assert_eq!(BlockError::permission(&id, "moved").kind(), ErrorKind::Permission);
        assert_eq!(BlockError::validation("type", "empty").kind(), ErrorKind::Validation);
        assert_eq!(
            BlockError::MissingRecipe {
                block_type: "text".into()
            }
            .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            BlockError::Repository("disk full".into()).kind(),
            ErrorKind::Repository
        );
    }
}
