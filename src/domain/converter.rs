//! Conversion between flat parent-pointer lists and nested trees.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{instrument, warn};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::item::{FieldNames, Item, ItemId, TreeItem, CHILDREN};

/// What `unflatten` does with items that cannot be attached to a root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanPolicy {
    /// Leave them out of the result and log a warning per item
    #[default]
    Drop,
    /// Fail with `OrphanedItem` or `CycleDetected`
    Fail,
}

/// Build a nested tree from a flat, ordered collection.
///
/// Items are moved into the tree, not copied. Children keep the relative
/// order they had in `items`; roots are the items whose parent field is
/// absent or a root sentinel.
///
/// Items whose parent does not exist, and items hanging off a parent cycle,
/// are handled according to `policy`.
#[instrument(level = "debug", skip(items, names), fields(count = items.len()))]
pub fn unflatten(
    mut items: Vec<Item>,
    names: &FieldNames,
    policy: OrphanPolicy,
) -> DomainResult<Vec<TreeItem>> {
    let mut positions: HashMap<ItemId, usize> = HashMap::with_capacity(items.len());
    let mut links: Vec<(ItemId, Option<ItemId>)> = Vec::with_capacity(items.len());

    for (position, item) in items.iter_mut().enumerate() {
        let id = item
            .id(names)
            .ok_or(DomainError::MissingId { position })?;
        if positions.insert(id.clone(), position).is_some() {
            return Err(DomainError::DuplicateId(id));
        }
        if item.remove(CHILDREN).is_some() {
            warn!(%id, field = CHILDREN, "stripping reserved field from flat item");
        }
        links.push((id, item.parent_id(names)));
    }

    let mut roots = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); items.len()];
    for (position, (id, parent)) in links.iter().enumerate() {
        match parent {
            None => roots.push(position),
            Some(parent_id) => match positions.get(parent_id) {
                Some(&parent_pos) => children[parent_pos].push(position),
                None => {
                    if policy == OrphanPolicy::Fail {
                        return Err(DomainError::OrphanedItem {
                            id: id.clone(),
                            parent_id: parent_id.clone(),
                        });
                    }
                    warn!(%id, parent = %parent_id, "dropping item with missing parent");
                }
            },
        }
    }

    let mut slots: Vec<Option<Item>> = items.into_iter().map(Some).collect();
    let tree = assemble(&roots, &children, &mut slots);

    // Anything left over was never reached from a root.
    for (position, slot) in slots.iter().enumerate() {
        if slot.is_none() {
            continue;
        }
        let (id, parent) = &links[position];
        let parent_known = parent.as_ref().is_some_and(|p| positions.contains_key(p));
        if !parent_known {
            // already reported above
            continue;
        }
        if policy == OrphanPolicy::Fail {
            return Err(DomainError::CycleDetected(id.clone()));
        }
        warn!(%id, "dropping item unreachable from any root");
    }

    Ok(tree)
}

/// Builds the owned tree bottom-up with an explicit stack.
fn assemble(
    roots: &[usize],
    children: &[Vec<usize>],
    slots: &mut [Option<Item>],
) -> Vec<TreeItem> {
    let mut built: Vec<Option<TreeItem>> = (0..slots.len()).map(|_| None).collect();
    let mut stack: Vec<(usize, bool)> = roots.iter().rev().map(|&p| (p, false)).collect();

    while let Some((position, visited)) = stack.pop() {
        if visited {
            let item = slots[position].take().unwrap_or_default();
            let kids = children[position]
                .iter()
                .filter_map(|&child| built[child].take())
                .collect();
            built[position] = Some(TreeItem {
                item,
                children: kids,
            });
        } else {
            stack.push((position, true));
            for &child in children[position].iter().rev() {
                stack.push((child, false));
            }
        }
    }

    roots.iter().filter_map(|&p| built[p].take()).collect()
}

/// Flatten a nested tree in pre-order: parents before children, siblings in order.
///
/// Items keep their fields as they are, so `unflatten(flatten(t))` rebuilds `t`
/// only when the parent fields already agree with the nesting. Use
/// [`flatten_with`] for trees of unknown provenance.
#[instrument(level = "debug", skip(tree))]
pub fn flatten(tree: Vec<TreeItem>) -> Vec<Item> {
    let mut flat = Vec::new();
    let mut stack: Vec<TreeItem> = tree.into_iter().rev().collect();

    while let Some(TreeItem { item, children }) = stack.pop() {
        flat.push(item);
        stack.extend(children.into_iter().rev());
    }

    flat
}

/// Flatten a nested tree and write each item's parent field from the nesting.
///
/// Top-level items get the root sentinel matching their id type. Unlike
/// [`flatten`] this never trusts stored parent fields, so `unflatten` of the
/// result always rebuilds the same shape.
#[instrument(level = "debug", skip(tree, names))]
pub fn flatten_with(tree: Vec<TreeItem>, names: &FieldNames) -> Vec<Item> {
    let mut flat = Vec::new();
    let mut stack: Vec<(TreeItem, Option<Value>)> =
        tree.into_iter().rev().map(|node| (node, None)).collect();

    while let Some((TreeItem { mut item, children }, parent)) = stack.pop() {
        let id = item.id(names);
        let parent_value = match (parent, &id) {
            (Some(parent), _) => parent,
            (None, Some(id)) => id.root_sentinel(),
            (None, None) => Value::Null,
        };
        item.set(names.parent_id.clone(), parent_value);
        let own = id.map(|id| id.to_value()).unwrap_or(Value::Null);
        stack.extend(children.into_iter().rev().map(|child| (child, Some(own.clone()))));
        flat.push(item);
    }

    flat
}

/// Borrowing variant of [`flatten`].
pub fn flatten_ref(tree: &[TreeItem]) -> Vec<&Item> {
    let mut flat = Vec::new();
    let mut stack: Vec<&TreeItem> = tree.iter().rev().collect();

    while let Some(node) = stack.pop() {
        flat.push(&node.item);
        stack.extend(node.children.iter().rev());
    }

    flat
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, parent: i64) -> Item {
        Item::new().with("id", id).with("parentId", parent)
    }

    //  1
    //  ├── 2
    //  │   └── 4
    //  └── 3
    #[test]
    fn test_unflatten_keeps_sibling_order() {
        let names = FieldNames::default();
        let items = vec![item(3, 1), item(1, 0), item(4, 2), item(2, 1)];

        let tree = unflatten(items, &names, OrphanPolicy::Drop).unwrap();

        assert_eq!(tree.len(), 1);
        let ids: Vec<_> = tree[0]
            .children
            .iter()
            .map(|c| c.item.id(&names).unwrap())
            .collect();
        assert_eq!(ids, vec![ItemId::Int(3), ItemId::Int(2)]);
        assert_eq!(tree[0].children[1].children.len(), 1);
    }

    #[test]
    fn test_flatten_ref_matches_flatten() {
        let names = FieldNames::default();
        let tree = unflatten(
            vec![item(1, 0), item(2, 1), item(3, 0)],
            &names,
            OrphanPolicy::Drop,
        )
        .unwrap();

        let borrowed: Vec<Item> = flatten_ref(&tree).into_iter().cloned().collect();
        assert_eq!(borrowed, flatten(tree));
    }

    #[test]
    fn test_self_parent_is_a_cycle() {
        let names = FieldNames::default();
        let result = unflatten(vec![item(1, 1)], &names, OrphanPolicy::Fail);
        assert_eq!(result, Err(DomainError::CycleDetected(ItemId::Int(1))));
    }
}
