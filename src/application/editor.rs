//! Stateful tree editor driving the before/after hook protocol.

use generational_arena::Index;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::application::error::{ApplicationResult, Cancelled, EditResult, Refusal, Veto};
use crate::application::factory::CreateContext;
use crate::application::hooks::UpdateAction;
use crate::application::options::TreeOptions;
use crate::config::Settings;
use crate::domain::item::CHILDREN;
use crate::domain::{
    flatten, unflatten, DomainError, FieldNames, Item, ItemArena, ItemId, ToTermTree, TreeItem,
};

/// Holds the current tree and applies structural edits to it.
///
/// Mutations take `&mut self` and hooks only ever see borrowed items, so no
/// second edit can run between a before-hook and its mutation. Every
/// mutation either applies completely or returns `Cancelled` with the tree
/// unchanged.
#[derive(Debug)]
pub struct TreeEditor {
    arena: ItemArena,
    options: TreeOptions,
}

impl TreeEditor {
    /// Take ownership of a nested tree.
    #[instrument(level = "debug", skip(tree, options), fields(roots = tree.len()))]
    pub fn new(tree: Vec<TreeItem>, options: TreeOptions) -> ApplicationResult<Self> {
        let arena = ItemArena::from_tree(tree, &options.settings.fields)?;
        debug!(items = arena.len(), "editor ready");
        Ok(Self { arena, options })
    }

    /// Unflatten `items` with the configured orphan policy and edit the result.
    #[instrument(level = "debug", skip(items, options), fields(count = items.len()))]
    pub fn from_flat(items: Vec<Item>, options: TreeOptions) -> ApplicationResult<Self> {
        let settings = &options.settings;
        let tree = unflatten(items, &settings.fields, settings.orphans)?;
        Self::new(tree, options)
    }

    pub fn settings(&self) -> &Settings {
        &self.options.settings
    }

    fn names(&self) -> &FieldNames {
        &self.options.settings.fields
    }

    pub fn placeholder(&self) -> &str {
        &self.options.settings.placeholder
    }

    // ------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------

    pub fn find(&self, id: &ItemId) -> Option<&Item> {
        self.arena.find(id).and_then(|idx| self.arena.item(idx))
    }

    pub fn children(&self, id: &ItemId) -> Vec<&Item> {
        self.arena
            .find(id)
            .map(|idx| {
                self.arena
                    .children_of(idx)
                    .iter()
                    .filter_map(|&c| self.arena.item(c))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn roots(&self) -> Vec<&Item> {
        self.arena
            .roots()
            .iter()
            .filter_map(|&r| self.arena.item(r))
            .collect()
    }

    /// Loaded children, or children the owner reports through `has_children`.
    pub fn has_children(&self, id: &ItemId) -> bool {
        self.arena.find(id).is_some_and(|idx| self.has_children_at(idx))
    }

    fn has_children_at(&self, idx: Index) -> bool {
        if !self.arena.children_of(idx).is_empty() {
            return true;
        }
        self.arena
            .item(idx)
            .and_then(|item| self.options.hooks.has_children(item))
            .unwrap_or(false)
    }

    /// Distance to the nearest root (roots are 0); `None` for unknown ids.
    pub fn depth(&self, id: &ItemId) -> Option<usize> {
        self.arena.find(id).map(|idx| self.arena.depth(idx))
    }

    pub fn is_expanded(&self, id: &ItemId) -> bool {
        self.find(id)
            .is_some_and(|item| self.options.open_state.get(id, item))
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Number of levels in the tree.
    pub fn height(&self) -> usize {
        self.arena.height()
    }

    pub fn leaf_ids(&self) -> Vec<ItemId> {
        self.arena.leaf_ids()
    }

    /// Owned snapshot of the nested tree.
    pub fn tree(&self) -> Vec<TreeItem> {
        self.arena.to_tree()
    }

    pub fn into_tree(self) -> Vec<TreeItem> {
        self.arena.into_tree()
    }

    /// Flat collection for external consumers, parents before children.
    pub fn to_flat(&self) -> Vec<Item> {
        flatten(self.tree())
    }

    /// Text rendering; the placeholder when empty.
    pub fn render(&self) -> String {
        if self.is_empty() {
            return self.placeholder().to_string();
        }
        self.arena.to_term_tree(self.names(), ".").to_string()
    }

    // ------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------

    /// Create a new item as last child of `parent`, or as a new root.
    #[instrument(level = "debug", skip(self))]
    pub fn create(&mut self, parent: Option<&ItemId>, width: Option<usize>) -> EditResult<&Item> {
        if !self.settings().editable.can_create {
            return self.refuse(Refusal::CreateDisabled);
        }
        let parent_idx = match parent {
            Some(id) => Some(self.lookup(id)?),
            None => None,
        };
        let idx = self.create_at(parent_idx, width)?;
        self.item_at(idx)
    }

    /// Create a new item next to `sibling`, under the same parent.
    #[instrument(level = "debug", skip(self))]
    pub fn create_sibling(&mut self, sibling: &ItemId, width: Option<usize>) -> EditResult<&Item> {
        if !self.settings().editable.can_create {
            return self.refuse(Refusal::CreateDisabled);
        }
        let sibling_idx = self.lookup(sibling)?;
        let parent_idx = self.arena.parent_of(sibling_idx);
        let idx = self.create_at(parent_idx, width)?;
        self.item_at(idx)
    }

    /// Create a child of `parent` and expand `parent` so the child is visible.
    #[instrument(level = "debug", skip(self))]
    pub fn add_child(&mut self, parent: &ItemId, width: Option<usize>) -> EditResult<&Item> {
        if !self.settings().editable.can_create {
            return self.refuse(Refusal::CreateDisabled);
        }
        let parent_idx = self.lookup(parent)?;
        let idx = self.create_at(Some(parent_idx), width)?;
        self.set_expanded(parent_idx, true);
        self.item_at(idx)
    }

    fn create_at(&mut self, parent: Option<Index>, width: Option<usize>) -> EditResult<Index> {
        let depth = parent.map_or(0, |p| self.arena.depth(p) + 1);
        if let Some(max) = self.settings().max_depth {
            if depth > max {
                return self.refuse(Refusal::MaxDepthExceeded { depth, max });
            }
        }
        if parent.is_none() && !self.settings().multiple_roots && !self.arena.roots().is_empty() {
            return self.refuse(Refusal::SingleRootOnly);
        }

        let siblings = match parent {
            Some(p) => self.arena.children_of(p).len(),
            None => self.arena.roots().len(),
        };
        let ctx = CreateContext {
            parent: parent.and_then(|p| self.arena.item(p)),
            depth,
            width: width.unwrap_or(siblings),
        };
        let mut item = self.options.factory.create(&ctx);

        let names = &self.options.settings.fields;
        let Some(id) = item.id(names) else {
            return self.refuse(Refusal::MissingFactoryId);
        };
        if self.arena.find(&id).is_some() {
            return self.refuse(DomainError::DuplicateId(id).into());
        }
        if item.remove(CHILDREN).is_some() {
            warn!(%id, field = CHILDREN, "stripping reserved field from created item");
        }
        let parent_value = parent
            .and_then(|p| self.arena.get(p))
            .map(|node| node.id.to_value())
            .unwrap_or_else(|| id.root_sentinel());
        item.set(names.parent_id.clone(), parent_value);

        if self.options.hooks.on_before_create(&item).is_cancel() {
            return self.cancel(Veto::Create(id).into());
        }

        let idx = match self.arena.insert(id.clone(), item, parent) {
            Ok(idx) => idx,
            Err(e) => return self.refuse(e.into()),
        };
        if let Some(created) = self.arena.item(idx) {
            self.options.hooks.on_create(created);
        }
        debug!(%id, depth, "created item");
        Ok(idx)
    }

    /// Delete an item; with `can_delete_parent` its whole subtree goes too.
    #[instrument(level = "debug", skip(self))]
    pub fn delete(&mut self, id: &ItemId) -> EditResult<TreeItem> {
        if !self.settings().editable.can_delete {
            return self.refuse(Refusal::DeleteDisabled);
        }
        let idx = self.lookup(id)?;
        if self.has_children_at(idx) && !self.settings().editable.can_delete_parent {
            return self.refuse(Refusal::DeleteParentDisabled(id.clone()));
        }

        let vetoed = match self.arena.item(idx) {
            Some(item) => self.options.hooks.on_before_delete(item).is_cancel(),
            None => false,
        };
        if vetoed {
            return self.cancel(Veto::Delete(id.clone()).into());
        }

        let Some(removed) = self.arena.remove_subtree(idx) else {
            return self.refuse(Refusal::NotFound(id.clone()));
        };
        self.options.hooks.on_delete(&removed);
        debug!(%id, removed = removed.len(), "deleted item");
        Ok(removed)
    }

    /// Merge `changes` into an item's payload; a `null` value removes the field.
    ///
    /// Structural fields (id, parent id, children) are refused; use
    /// [`TreeEditor::move_item`] to re-parent.
    #[instrument(level = "debug", skip(self, changes))]
    pub fn update(&mut self, id: &ItemId, changes: Map<String, Value>) -> EditResult<&Item> {
        if !self.settings().editable.can_update {
            return self.refuse(Refusal::UpdateDisabled);
        }
        let idx = self.lookup(id)?;
        if let Some(field) = changes.keys().find(|k| self.names().is_structural(k)) {
            let field = field.clone();
            return self.refuse(Refusal::StructuralField(field));
        }

        let mut candidate = self.item_at(idx)?.clone();
        for (field, value) in changes {
            if value.is_null() {
                candidate.remove(&field);
            } else {
                candidate.set(field, value);
            }
        }

        let action = UpdateAction::Edit;
        if self.options.hooks.on_before_update(&candidate, action, None).is_cancel() {
            return self.cancel(Veto::Update { id: id.clone(), action }.into());
        }

        if let Some(item) = self.arena.item_mut(idx) {
            *item = candidate;
        }
        if let Some(item) = self.arena.item(idx) {
            self.options.hooks.on_update(item, action, None);
        }
        debug!(%id, "updated item");
        self.item_at(idx)
    }

    /// Re-attach an item as last child of `new_parent`, or as last root.
    ///
    /// Only the moved item is checked against `max_depth`; its descendants
    /// travel along.
    #[instrument(level = "debug", skip(self))]
    pub fn move_item(&mut self, id: &ItemId, new_parent: Option<&ItemId>) -> EditResult<&Item> {
        if !self.settings().editable.can_update {
            return self.refuse(Refusal::UpdateDisabled);
        }
        let idx = self.lookup(id)?;
        let parent_idx = match new_parent {
            Some(parent_id) => {
                let p = self.lookup(parent_id)?;
                if p == idx || self.arena.is_ancestor(idx, p) {
                    return self.refuse(Refusal::WouldCreateCycle {
                        id: id.clone(),
                        parent: parent_id.clone(),
                    });
                }
                Some(p)
            }
            None => None,
        };

        let depth = parent_idx.map_or(0, |p| self.arena.depth(p) + 1);
        if let Some(max) = self.settings().max_depth {
            if depth > max {
                return self.refuse(Refusal::MaxDepthExceeded { depth, max });
            }
        }
        if parent_idx.is_none()
            && !self.settings().multiple_roots
            && self.arena.roots().iter().any(|&r| r != idx)
        {
            return self.refuse(Refusal::SingleRootOnly);
        }

        let mut candidate = self.item_at(idx)?.clone();
        let parent_value = match new_parent {
            Some(parent_id) => parent_id.to_value(),
            None => id.root_sentinel(),
        };
        candidate.set(self.names().parent_id.clone(), parent_value);

        let action = UpdateAction::Move;
        let parent_item = parent_idx.and_then(|p| self.arena.item(p));
        if self
            .options
            .hooks
            .on_before_update(&candidate, action, parent_item)
            .is_cancel()
        {
            return self.cancel(Veto::Update { id: id.clone(), action }.into());
        }

        if let Err(e) = self.arena.move_node(idx, parent_idx) {
            return self.refuse(e.into());
        }
        if let Some(item) = self.arena.item_mut(idx) {
            *item = candidate;
        }
        if let Some(item) = self.arena.item(idx) {
            let parent_item = parent_idx.and_then(|p| self.arena.item(p));
            self.options.hooks.on_update(item, action, parent_item);
        }
        debug!(%id, parent = ?new_parent, depth, "moved item");
        self.item_at(idx)
    }

    /// Flip the expanded state; returns the new state.
    #[instrument(level = "debug", skip(self))]
    pub fn toggle(&mut self, id: &ItemId) -> EditResult<bool> {
        let idx = self.lookup(id)?;
        let expanded = !self.is_expanded(id);
        self.write_open_state(idx, expanded);
        Ok(expanded)
    }

    /// Notify the owner that an item was (de)selected.
    #[instrument(level = "debug", skip(self))]
    pub fn select(&mut self, id: &ItemId, selected: bool) -> EditResult<()> {
        let idx = self.lookup(id)?;
        if let Some(item) = self.arena.item(idx) {
            self.options.hooks.on_select(item, selected);
        }
        Ok(())
    }

    fn set_expanded(&mut self, idx: Index, expanded: bool) {
        let current = match self.arena.get(idx) {
            Some(node) => self.options.open_state.get(&node.id, &node.item),
            None => return,
        };
        if current != expanded {
            self.write_open_state(idx, expanded);
        }
    }

    fn write_open_state(&mut self, idx: Index, expanded: bool) {
        let Some(id) = self.arena.get(idx).map(|node| node.id.clone()) else {
            return;
        };
        if let Some(item) = self.arena.item_mut(idx) {
            self.options.open_state.set(&id, item, expanded);
        }
        if let Some(item) = self.arena.item(idx) {
            self.options.hooks.on_toggle(item, expanded);
        }
    }

    // ------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------

    fn lookup(&self, id: &ItemId) -> EditResult<Index> {
        match self.arena.find(id) {
            Some(idx) => Ok(idx),
            None => self.refuse(Refusal::NotFound(id.clone())),
        }
    }

    fn item_at(&self, idx: Index) -> EditResult<&Item> {
        match self.arena.get(idx) {
            Some(node) => Ok(&node.item),
            None => Err(Refusal::Inconsistent(DomainError::StaleNode).into()),
        }
    }

    fn refuse<T>(&self, refusal: Refusal) -> EditResult<T> {
        self.cancel(refusal.into())
    }

    fn cancel<T>(&self, cancelled: Cancelled) -> EditResult<T> {
        if self.options.settings.logging {
            info!(%cancelled, "operation cancelled");
        } else {
            debug!(%cancelled, "operation cancelled");
        }
        Err(cancelled)
    }
}
