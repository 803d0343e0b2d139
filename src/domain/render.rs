/*
Text rendering of item hierarchies via termtree.

termtree wants a single root, so a forest is hung below a caller supplied label.
 */
use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::ItemArena;
use crate::domain::item::{FieldNames, TreeItem};

pub trait ToTermTree {
    fn to_term_tree(&self, names: &FieldNames, title: &str) -> Tree<String>;
}

impl ToTermTree for [TreeItem] {
    #[instrument(level = "debug", skip(self, names))]
    fn to_term_tree(&self, names: &FieldNames, title: &str) -> Tree<String> {
        fn build(node: &TreeItem, names: &FieldNames) -> Tree<String> {
            let leaves: Vec<_> = node.children.iter().map(|c| build(c, names)).collect();
            Tree::new(node.item.label(names)).with_leaves(leaves)
        }

        Tree::new(title.to_string()).with_leaves(self.iter().map(|root| build(root, names)))
    }
}

impl ToTermTree for ItemArena {
    #[instrument(level = "debug", skip(self, names))]
    fn to_term_tree(&self, names: &FieldNames, title: &str) -> Tree<String> {
        fn build_tree(arena: &ItemArena, node_idx: Index, names: &FieldNames, parent_tree: &mut Tree<String>) {
            for &child_idx in arena.children_of(node_idx) {
                if let Some(child) = arena.item(child_idx) {
                    let mut child_tree = Tree::new(child.label(names));
                    build_tree(arena, child_idx, names, &mut child_tree);
                    parent_tree.push(child_tree);
                }
            }
        }

        let mut tree = Tree::new(title.to_string());
        for &root_idx in self.roots() {
            if let Some(root) = self.item(root_idx) {
                let mut root_tree = Tree::new(root.label(names));
                build_tree(self, root_idx, names, &mut root_tree);
                tree.push(root_tree);
            }
        }
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::Item;

    fn sample() -> Vec<TreeItem> {
        vec![
            TreeItem::new(Item::new().with("id", 1).with("name", "a")).with_children(vec![
                TreeItem::new(Item::new().with("id", 2).with("parentId", 1)),
            ]),
            TreeItem::new(Item::new().with("id", 3)),
        ]
    }

    #[test]
    fn test_arena_and_nested_render_alike() {
        let names = FieldNames::default();
        let tree = sample();
        let arena = ItemArena::from_tree(tree.clone(), &names).unwrap();

        let nested = tree.as_slice().to_term_tree(&names, "items").to_string();
        let from_arena = arena.to_term_tree(&names, "items").to_string();

        assert_eq!(nested, from_arena);
        assert!(nested.starts_with("items\n"));
        assert!(nested.contains("a (1)"));
        assert!(nested.contains("2"));
    }
}
