//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::item::ItemId;

/// Domain errors represent inconsistent item data.
/// These are independent of configuration and I/O concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("item at position {position} has no usable id")]
    MissingId { position: usize },

    #[error("duplicate item id: {0}")]
    DuplicateId(ItemId),

    #[error("item {id} references missing parent {parent_id}")]
    OrphanedItem { id: ItemId, parent_id: ItemId },

    #[error("cycle detected in hierarchy at: {0}")]
    CycleDetected(ItemId),

    #[error("node is no longer part of the tree")]
    StaleNode,
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
