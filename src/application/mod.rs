//! Application layer: the tree editor and the contract it offers its owner
//!
//! This layer orchestrates domain logic; hooks and factories are the seams.

pub mod editor;
pub mod error;
pub mod factory;
pub mod hooks;
pub mod options;

pub use editor::TreeEditor;
pub use error::{ApplicationError, ApplicationResult, Cancelled, EditResult, Refusal, Veto};
pub use factory::{CreateContext, DefaultItemFactory, ItemFactory};
pub use hooks::{HookDecision, NoHooks, TreeHooks, UpdateAction};
pub use options::{OpenState, OpenStateAccess, TreeOptions};
