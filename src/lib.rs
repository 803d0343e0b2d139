//! treedit: hierarchical item trees
//!
//! Converts between flat parent-pointer collections and nested trees, and
//! edits trees through a cancellable before/after hook protocol.
//!
//! Layers, innermost first:
//! - `domain`: items, conversion, the arena-backed tree
//! - `application`: the editor, hooks, factories, options
//! - `infrastructure`: JSON persistence
//! - `cli`: argument parsing and commands

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::{
    Cancelled, CreateContext, EditResult, HookDecision, ItemFactory, OpenState, Refusal,
    TreeEditor, TreeHooks, TreeOptions, UpdateAction, Veto,
};
pub use config::{Editable, Settings};
pub use domain::{flatten, flatten_with, unflatten, FieldNames, Item, ItemId, OrphanPolicy, TreeItem};
