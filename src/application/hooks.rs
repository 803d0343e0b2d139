//! Lifecycle hooks surrounding every structural edit.

use std::fmt;

use crate::domain::{Item, TreeItem};

/// Verdict of a before-hook.
///
/// Only an explicit `Cancel` stops an operation; no hook, `()` and `true`
/// all proceed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HookDecision {
    #[default]
    Proceed,
    Cancel,
}

impl HookDecision {
    pub fn is_cancel(self) -> bool {
        self == HookDecision::Cancel
    }
}

impl From<bool> for HookDecision {
    fn from(proceed: bool) -> Self {
        if proceed {
            HookDecision::Proceed
        } else {
            HookDecision::Cancel
        }
    }
}

impl From<()> for HookDecision {
    fn from(_: ()) -> Self {
        HookDecision::Proceed
    }
}

impl From<Option<bool>> for HookDecision {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(false) => HookDecision::Cancel,
            _ => HookDecision::Proceed,
        }
    }
}

/// Kind of update passed to the update hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateAction {
    /// Payload fields changed
    Edit,
    /// Item re-attached to another parent
    Move,
}

impl fmt::Display for UpdateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateAction::Edit => write!(f, "edit"),
            UpdateAction::Move => write!(f, "move"),
        }
    }
}

/// Callbacks an owner (UI, persistence) plugs into the editor.
///
/// Every method has a no-op default. Before-hooks see the candidate item as
/// it would look after the change; returning `HookDecision::Cancel` leaves
/// the tree untouched.
pub trait TreeHooks {
    /// An item was selected or deselected.
    fn on_select(&mut self, _item: &Item, _selected: bool) {}

    /// An item was expanded or collapsed.
    fn on_toggle(&mut self, _item: &Item, _expanded: bool) {}

    fn on_before_create(&mut self, _item: &Item) -> HookDecision {
        HookDecision::Proceed
    }

    fn on_create(&mut self, _item: &Item) {}

    fn on_before_delete(&mut self, _item: &Item) -> HookDecision {
        HookDecision::Proceed
    }

    /// Receives the removed subtree.
    fn on_delete(&mut self, _removed: &TreeItem) {}

    fn on_before_update(
        &mut self,
        _item: &Item,
        _action: UpdateAction,
        _new_parent: Option<&Item>,
    ) -> HookDecision {
        HookDecision::Proceed
    }

    fn on_update(&mut self, _item: &Item, _action: UpdateAction, _new_parent: Option<&Item>) {}

    /// Whether the owner knows of children not loaded into the tree.
    fn has_children(&self, _item: &Item) -> Option<bool> {
        None
    }
}

/// Hooks that let everything proceed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl TreeHooks for NoHooks {}
