//! Tests for the arena-backed item forest

use treedit::domain::{
    unflatten, DomainError, FieldNames, Item, ItemArena, ItemId, OrphanPolicy, ToTermTree,
};
use treedit::util::testing::{init_test_setup, item, sample_items};

fn sample_arena() -> ItemArena {
    let names = FieldNames::default();
    let tree = unflatten(sample_items(), &names, OrphanPolicy::Fail).unwrap();
    ItemArena::from_tree(tree, &names).unwrap()
}

fn idx(arena: &ItemArena, id: i64) -> generational_arena::Index {
    arena.find(&ItemId::Int(id)).unwrap()
}

// ============================================================
// Structure
// ============================================================

#[test]
fn given_sample_tree_when_loaded_then_index_and_depths_match() {
    init_test_setup();
    let arena = sample_arena();

    assert_eq!(arena.len(), 7);
    assert_eq!(arena.roots().len(), 3);
    assert_eq!(arena.depth(idx(&arena, 1)), 0);
    assert_eq!(arena.depth(idx(&arena, 4)), 2);
    assert_eq!(arena.depth(idx(&arena, 7)), 3);
    assert_eq!(arena.height(), 4);
}

#[test]
fn given_sample_tree_when_iterating_then_preorder_and_postorder_cover_all() {
    let arena = sample_arena();

    let pre: Vec<ItemId> = arena.iter().map(|(_, n)| n.id.clone()).collect();
    let post: Vec<ItemId> = arena.iter_postorder().map(|(_, n)| n.id.clone()).collect();

    assert_eq!(pre, vec![1.into(), 2.into(), 4.into(), 7.into(), 3.into(), 5.into(), 6.into()]);
    assert_eq!(post, vec![7.into(), 4.into(), 2.into(), 3.into(), 1.into(), 5.into(), 6.into()]);
}

#[test]
fn given_sample_tree_when_listing_leaves_then_returns_leaf_ids_in_order() {
    let arena = sample_arena();
    assert_eq!(arena.leaf_ids(), vec![7.into(), 3.into(), 5.into(), 6.into()]);
}

#[test]
fn given_node_when_asking_for_siblings_then_includes_itself() {
    let arena = sample_arena();
    let siblings = arena.siblings_of(idx(&arena, 3));
    assert_eq!(siblings, &[idx(&arena, 2), idx(&arena, 3)]);
}

#[test]
fn given_ancestor_chain_when_checking_is_ancestor_then_follows_parents_only() {
    let arena = sample_arena();
    assert!(arena.is_ancestor(idx(&arena, 1), idx(&arena, 7)));
    assert!(!arena.is_ancestor(idx(&arena, 7), idx(&arena, 1)));
    assert!(!arena.is_ancestor(idx(&arena, 3), idx(&arena, 4)));
}

// ============================================================
// Insert / move / remove
// ============================================================

#[test]
fn given_existing_id_when_inserting_then_duplicate_is_rejected() {
    let mut arena = sample_arena();
    let result = arena.insert(1.into(), item(1, 0, "again"), None);
    assert_eq!(result, Err(DomainError::DuplicateId(1.into())));
    assert_eq!(arena.len(), 7);
}

#[test]
fn given_node_when_moved_below_descendant_then_cycle_is_rejected() {
    let mut arena = sample_arena();
    let (one, seven) = (idx(&arena, 1), idx(&arena, 7));

    let result = arena.move_node(one, Some(seven));

    assert_eq!(result, Err(DomainError::CycleDetected(1.into())));
    assert_eq!(arena.parent_of(one), None);
}

#[test]
fn given_subtree_when_moved_to_root_then_descendants_travel_along() {
    let mut arena = sample_arena();
    let (two, seven) = (idx(&arena, 2), idx(&arena, 7));

    arena.move_node(two, None).unwrap();

    assert_eq!(arena.roots().last(), Some(&two));
    assert_eq!(arena.depth(seven), 2);
    assert_eq!(arena.children_of(idx(&arena, 1)), &[idx(&arena, 3)]);
}

#[test]
fn given_subtree_when_removed_then_index_forgets_every_id() {
    let mut arena = sample_arena();

    let removed = arena.remove_subtree(idx(&arena, 2)).unwrap();

    assert_eq!(removed.len(), 3);
    assert_eq!(arena.len(), 4);
    for gone in [2, 4, 7] {
        assert!(arena.find(&ItemId::Int(gone)).is_none(), "{gone} still indexed");
    }
    assert_eq!(arena.children_of(idx(&arena, 1)).len(), 1);
}

#[test]
fn given_removed_index_when_removed_again_then_none() {
    let mut arena = sample_arena();
    let two = idx(&arena, 2);
    arena.remove_subtree(two).unwrap();
    assert!(arena.remove_subtree(two).is_none());
    assert!(arena.item(two).is_none());
}

#[test]
fn given_arena_when_converted_back_then_matches_source_tree() {
    let names = FieldNames::default();
    let tree = unflatten(sample_items(), &names, OrphanPolicy::Fail).unwrap();
    let arena = ItemArena::from_tree(tree.clone(), &names).unwrap();

    assert_eq!(arena.to_tree(), tree);
    assert_eq!(arena.into_tree(), tree);
}

#[test]
fn given_tree_item_without_id_when_loading_arena_then_missing_id() {
    let names = FieldNames::default();
    let tree = vec![treedit::TreeItem::new(Item::new().with("name", "anon"))];

    let result = ItemArena::from_tree(tree, &names);

    assert!(matches!(result, Err(DomainError::MissingId { position: 0 })));
}

// ============================================================
// Rendering
// ============================================================

#[test]
fn given_sample_tree_when_rendered_then_shows_labels_nested() {
    let arena = sample_arena();

    let text = arena.to_term_tree(&FieldNames::default(), ".").to_string();

    assert!(text.starts_with(".\n"));
    assert!(text.contains("one (1)"));
    assert!(text.contains("seven (7)"));
    let one = text.find("one (1)").unwrap();
    let five = text.find("five (5)").unwrap();
    assert!(one < five);
}
