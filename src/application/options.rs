//! Editor options: settings plus the behaviour an owner plugs in.

use std::fmt;

use crate::application::factory::{DefaultItemFactory, ItemFactory};
use crate::application::hooks::{NoHooks, TreeHooks};
use crate::config::Settings;
use crate::domain::{Item, ItemId};

/// Mode an open-state accessor function is called in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenStateAccess {
    Get,
    Set(bool),
}

/// Accessor type for function-backed open state.
pub type OpenStateFn = dyn Fn(&ItemId, OpenStateAccess) -> Option<bool>;

/// Where an item's expanded/collapsed state lives.
pub enum OpenState {
    /// Boolean payload field; absent reads as collapsed
    Field(String),
    /// Owner-managed state; `Get` returns the state, `Set` stores it
    Accessor(Box<OpenStateFn>),
}

impl OpenState {
    pub fn accessor(f: impl Fn(&ItemId, OpenStateAccess) -> Option<bool> + 'static) -> Self {
        OpenState::Accessor(Box::new(f))
    }

    pub fn get(&self, id: &ItemId, item: &Item) -> bool {
        match self {
            OpenState::Field(field) => item.flag(field),
            OpenState::Accessor(f) => f(id, OpenStateAccess::Get).unwrap_or(false),
        }
    }

    pub fn set(&self, id: &ItemId, item: &mut Item, expanded: bool) {
        match self {
            OpenState::Field(field) => {
                item.set(field.clone(), expanded);
            }
            OpenState::Accessor(f) => {
                f(id, OpenStateAccess::Set(expanded));
            }
        }
    }
}

impl fmt::Debug for OpenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenState::Field(field) => f.debug_tuple("Field").field(field).finish(),
            OpenState::Accessor(_) => f.write_str("Accessor(..)"),
        }
    }
}

/// Everything the editor is configured with; fixed once the editor exists.
pub struct TreeOptions {
    pub settings: Settings,
    pub open_state: OpenState,
    pub factory: Box<dyn ItemFactory>,
    pub hooks: Box<dyn TreeHooks>,
}

impl TreeOptions {
    /// Field-backed open state, UUID factory and no hooks.
    pub fn new(settings: Settings) -> Self {
        let open_state = OpenState::Field(settings.fields.is_open.clone());
        let factory = Box::new(DefaultItemFactory::new(settings.fields.clone()));
        Self {
            settings,
            open_state,
            factory,
            hooks: Box::new(NoHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: impl TreeHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    pub fn with_factory(mut self, factory: impl ItemFactory + 'static) -> Self {
        self.factory = Box::new(factory);
        self
    }

    pub fn with_open_state(mut self, open_state: OpenState) -> Self {
        self.open_state = open_state;
        self
    }
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl fmt::Debug for TreeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeOptions")
            .field("settings", &self.settings)
            .field("open_state", &self.open_state)
            .finish_non_exhaustive()
    }
}
