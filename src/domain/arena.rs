use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::item::{FieldNames, Item, ItemId, TreeItem};

/// Node in the arena-based hierarchy.
#[derive(Debug)]
pub struct ItemNode {
    /// Identifier the node is indexed under
    pub id: ItemId,
    /// Payload
    pub item: Item,
    /// Index of parent node in the arena, None for root nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in sibling order
    pub children: Vec<Index>,
}

/// Arena-based forest for structural editing.
///
/// Uses generational arena for memory-safe node references and an id index
/// for O(1) lookups. The index is patched in the same call as every
/// structural change and is never handed out for mutation.
#[derive(Debug, Default)]
pub struct ItemArena {
    arena: Arena<ItemNode>,
    roots: Vec<Index>,
    index: HashMap<ItemId, Index>,
}

impl ItemArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a nested tree.
    ///
    /// The nesting is authoritative: every item's parent field is rewritten to
    /// its actual parent's id, or to the root sentinel for top-level items.
    #[instrument(level = "debug", skip(tree, names), fields(roots = tree.len()))]
    pub fn from_tree(tree: Vec<TreeItem>, names: &FieldNames) -> DomainResult<Self> {
        let mut arena = Self::new();
        let mut stack: Vec<(TreeItem, Option<Index>)> =
            tree.into_iter().rev().map(|node| (node, None)).collect();
        let mut position = 0;

        while let Some((TreeItem { mut item, children }, parent)) = stack.pop() {
            let id = item.id(names).ok_or(DomainError::MissingId { position })?;
            position += 1;
            let parent_value = match parent.and_then(|p| arena.get(p)) {
                Some(node) => node.id.to_value(),
                None => id.root_sentinel(),
            };
            item.set(names.parent_id.clone(), parent_value);
            let idx = arena.insert(id, item, parent)?;
            for child in children.into_iter().rev() {
                stack.push((child, Some(idx)));
            }
        }

        Ok(arena)
    }

    /// Append a node as last child of `parent`, or as last root.
    #[instrument(level = "trace", skip(self, item))]
    pub fn insert(&mut self, id: ItemId, item: Item, parent: Option<Index>) -> DomainResult<Index> {
        if self.index.contains_key(&id) {
            return Err(DomainError::DuplicateId(id));
        }
        if let Some(parent_idx) = parent {
            if !self.arena.contains(parent_idx) {
                return Err(DomainError::StaleNode);
            }
        }

        let node_idx = self.arena.insert(ItemNode {
            id: id.clone(),
            item,
            parent,
            children: Vec::new(),
        });
        self.index.insert(id, node_idx);

        match parent.and_then(|p| self.arena.get_mut(p)) {
            Some(parent_node) => parent_node.children.push(node_idx),
            None => self.roots.push(node_idx),
        }

        Ok(node_idx)
    }

    pub fn find(&self, id: &ItemId) -> Option<Index> {
        self.index.get(id).copied()
    }

    pub fn get(&self, idx: Index) -> Option<&ItemNode> {
        self.arena.get(idx)
    }

    pub fn item(&self, idx: Index) -> Option<&Item> {
        self.arena.get(idx).map(|node| &node.item)
    }

    /// Mutable access to the payload only; structure stays behind the arena API.
    pub fn item_mut(&mut self, idx: Index) -> Option<&mut Item> {
        self.arena.get_mut(idx).map(|node| &mut node.item)
    }

    pub fn parent_of(&self, idx: Index) -> Option<Index> {
        self.arena.get(idx).and_then(|node| node.parent)
    }

    pub fn children_of(&self, idx: Index) -> &[Index] {
        self.arena
            .get(idx)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Sibling sequence `idx` lives in: its parent's children or the roots.
    pub fn siblings_of(&self, idx: Index) -> &[Index] {
        match self.parent_of(idx) {
            Some(parent) => self.children_of(parent),
            None => &self.roots,
        }
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Distance to the nearest root; roots have depth 0.
    #[instrument(level = "trace", skip(self))]
    pub fn depth(&self, idx: Index) -> usize {
        let mut depth = 0;
        let mut current = self.parent_of(idx);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent_of(parent);
        }
        depth
    }

    /// Number of levels in the forest, 0 when empty.
    #[instrument(level = "debug", skip(self))]
    pub fn height(&self) -> usize {
        self.iter()
            .map(|(idx, _)| self.depth(idx) + 1)
            .max()
            .unwrap_or(0)
    }

    /// True when `ancestor` lies on the parent chain of `idx`.
    pub fn is_ancestor(&self, ancestor: Index, idx: Index) -> bool {
        let mut current = self.parent_of(idx);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent_of(parent);
        }
        false
    }

    /// Re-attach `idx` as last child of `new_parent`, or as last root.
    #[instrument(level = "trace", skip(self))]
    pub fn move_node(&mut self, idx: Index, new_parent: Option<Index>) -> DomainResult<()> {
        let id = match self.arena.get(idx) {
            Some(node) => node.id.clone(),
            None => return Err(DomainError::StaleNode),
        };
        if let Some(parent) = new_parent {
            if parent == idx || self.is_ancestor(idx, parent) {
                return Err(DomainError::CycleDetected(id));
            }
            if !self.arena.contains(parent) {
                return Err(DomainError::StaleNode);
            }
        }

        let old_parent = self.parent_of(idx);
        self.unlink(idx, old_parent);
        match new_parent.and_then(|p| self.arena.get_mut(p)) {
            Some(parent_node) => parent_node.children.push(idx),
            None => self.roots.push(idx),
        }
        if let Some(node) = self.arena.get_mut(idx) {
            node.parent = new_parent;
        }
        Ok(())
    }

    /// Remove a node together with its whole subtree and return it owned.
    ///
    /// Every removed id is purged from the index.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_subtree(&mut self, idx: Index) -> Option<TreeItem> {
        let parent = self.arena.get(idx)?.parent;
        let order: Vec<Index> = PostOrderIterator::from_start(self, idx)
            .map(|(i, _)| i)
            .collect();
        self.unlink(idx, parent);

        let mut built: HashMap<Index, TreeItem> = HashMap::with_capacity(order.len());
        for current in order {
            if let Some(node) = self.arena.remove(current) {
                self.index.remove(&node.id);
                let children = node
                    .children
                    .iter()
                    .filter_map(|child| built.remove(child))
                    .collect();
                built.insert(
                    current,
                    TreeItem {
                        item: node.item,
                        children,
                    },
                );
            }
        }
        built.remove(&idx)
    }

    fn unlink(&mut self, idx: Index, parent: Option<Index>) {
        match parent.and_then(|p| self.arena.get_mut(p)) {
            Some(parent_node) => parent_node.children.retain(|&c| c != idx),
            None => self.roots.retain(|&r| r != idx),
        }
    }

    /// Snapshot of the forest as an owned nested tree.
    pub fn to_tree(&self) -> Vec<TreeItem> {
        self.roots
            .iter()
            .filter_map(|&root| self.subtree(root))
            .collect()
    }

    fn subtree(&self, idx: Index) -> Option<TreeItem> {
        let node = self.arena.get(idx)?;
        Some(TreeItem {
            item: node.item.clone(),
            children: node
                .children
                .iter()
                .filter_map(|&c| self.subtree(c))
                .collect(),
        })
    }

    /// Consume the arena, yielding the nested tree.
    pub fn into_tree(mut self) -> Vec<TreeItem> {
        let roots = self.roots.clone();
        roots
            .into_iter()
            .filter_map(|root| self.remove_subtree(root))
            .collect()
    }

    /// Ids of all leaf nodes in pre-order.
    pub fn leaf_ids(&self) -> Vec<ItemId> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| node.id.clone())
            .collect()
    }

    /// Pre-order traversal over all roots.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }
}

pub struct TreeIterator<'a> {
    arena: &'a ItemArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a ItemArena) -> Self {
        let stack = arena.roots.iter().rev().copied().collect();
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a ItemNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    arena: &'a ItemArena,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a ItemArena) -> Self {
        let stack = arena.roots.iter().rev().map(|&r| (r, false)).collect();
        Self { arena, stack }
    }

    fn from_start(arena: &'a ItemArena, start: Index) -> Self {
        Self {
            arena,
            stack: vec![(start, false)],
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a ItemNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
