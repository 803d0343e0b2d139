//! Application-level errors and cancellation reasons

use thiserror::Error;

use crate::application::hooks::UpdateAction;
use crate::domain::{DomainError, ItemId};

/// Structural refusal: the operation violates configuration or data consistency.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Refusal {
    #[error("creating items is disabled")]
    CreateDisabled,

    #[error("deleting items is disabled")]
    DeleteDisabled,

    #[error("item {0} has children and deleting parents is disabled")]
    DeleteParentDisabled(ItemId),

    #[error("updating items is disabled")]
    UpdateDisabled,

    #[error("item not found: {0}")]
    NotFound(ItemId),

    #[error("depth {depth} exceeds maximum depth {max}")]
    MaxDepthExceeded { depth: usize, max: usize },

    #[error("only a single root item is allowed")]
    SingleRootOnly,

    #[error("moving {id} below {parent} would create a cycle")]
    WouldCreateCycle { id: ItemId, parent: ItemId },

    #[error("field '{0}' can only be changed structurally")]
    StructuralField(String),

    #[error("item factory produced an item without an id")]
    MissingFactoryId,

    #[error("{0}")]
    Inconsistent(#[from] DomainError),
}

/// A before-hook explicitly cancelled the operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Veto {
    #[error("creation of {0} cancelled by before-create hook")]
    Create(ItemId),

    #[error("deletion of {0} cancelled by before-delete hook")]
    Delete(ItemId),

    #[error("{action} of {id} cancelled by before-update hook")]
    Update { id: ItemId, action: UpdateAction },
}

/// Outcome of an edit that left the tree unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Cancelled {
    #[error("refused: {0}")]
    Refused(#[from] Refusal),

    #[error("vetoed: {0}")]
    Vetoed(#[from] Veto),
}

impl Cancelled {
    pub fn is_refusal(&self) -> bool {
        matches!(self, Cancelled::Refused(_))
    }

    pub fn is_veto(&self) -> bool {
        matches!(self, Cancelled::Vetoed(_))
    }
}

/// Result type for editor mutations.
pub type EditResult<T> = Result<T, Cancelled>;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Cancelled(#[from] Cancelled),

    #[error("config error: {message}")]
    Config { message: String },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
