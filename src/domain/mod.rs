//! Domain layer: items, tree conversion and arena storage
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod converter;
pub mod error;
pub mod item;
pub mod render;

pub use arena::{ItemArena, ItemNode};
pub use converter::{flatten, flatten_ref, flatten_with, unflatten, OrphanPolicy};
pub use error::{DomainError, DomainResult};
pub use item::{count_items, FieldNames, Item, ItemId, TreeItem};
pub use render::ToTermTree;
