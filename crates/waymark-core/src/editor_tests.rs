//! Tests for the guide editor state store: CRUD, nesting, cross-container
//! moves, merge ordering, and the fail-quiet addressing policy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use waymark_api::{Block, Guide, InteractiveAction, Step};

use crate::editor::{Branch, EditorChildren, GuideEditor};
use crate::ids::BlockId;

fn interactive(content: &str) -> Block {
    Block::Interactive {
        action: InteractiveAction::Button,
        reftarget: Some(format!("button:{content}")),
        content: Some(content.to_string()),
        targetvalue: None,
        requirements: None,
        skippable: None,
    }
}

fn section_with(title: &str, blocks: Vec<Block>) -> Block {
    Block::Section {
        title: Some(title.to_string()),
        blocks,
    }
}

fn conditional(conditions: &[&str]) -> Block {
    Block::Conditional {
        conditions: conditions.iter().map(|c| c.to_string()).collect(),
        when_true: Vec::new(),
        when_false: Vec::new(),
    }
}

#[test]
fn add_block_appends_and_inserts() {
    let mut editor = GuideEditor::new();
    let first = editor.add_block(Block::markdown("first"), None);
    let _last = editor.add_block(Block::markdown("last"), None);
    let middle = editor.add_block(Block::markdown("middle"), Some(1));

    let guide = editor.get_guide();
    assert_eq!(guide.blocks.len(), 3);
    assert_eq!(guide.blocks[1], Block::markdown("middle"));
    assert_ne!(first, middle);
    assert!(editor.is_dirty());
}

#[test]
fn add_block_clamps_out_of_range_index() {
    let mut editor = GuideEditor::new();
    editor.add_block(Block::markdown("a"), Some(99));
    assert_eq!(editor.root_count(), 1);
}

#[test]
fn update_block_keeps_id() {
    let mut editor = GuideEditor::new();
    let id = editor.add_block(Block::markdown("old"), None);
    assert!(editor.update_block(&id, Block::markdown("new")));
    let node = editor.block(&id).unwrap();
    assert_eq!(node.block, Block::markdown("new"));
    assert_eq!(node.id, id);
}

#[test]
fn unknown_ids_are_silent_noops() {
    let mut editor = GuideEditor::new();
    editor.add_block(Block::markdown("a"), None);
    editor.mark_saved();
    let before = editor.revision();
    let ghost = BlockId::generate();

    assert!(!editor.update_block(&ghost, Block::markdown("x")));
    assert!(!editor.remove_block(&ghost));
    assert!(editor.duplicate_block(&ghost).is_none());
    assert!(!editor.move_block(0, 7));
    assert!(!editor.nest_block_in_section(&ghost, &ghost, None));

    assert_eq!(editor.revision(), before);
    assert!(!editor.is_dirty());
}

#[test]
fn move_block_same_index_is_noop() {
    let mut editor = GuideEditor::new();
    editor.add_block(Block::markdown("a"), None);
    editor.add_block(Block::markdown("b"), None);
    let before = editor.revision();

    assert!(!editor.move_block(1, 1));
    assert_eq!(editor.revision(), before);

    assert!(editor.move_block(0, 1));
    assert_eq!(editor.get_guide().blocks[0], Block::markdown("b"));
}

#[test]
fn mark_saved_is_idempotent() {
    let mut editor = GuideEditor::new();
    editor.add_block(Block::markdown("a"), None);
    assert!(editor.is_dirty());

    editor.mark_saved();
    let after_first = editor.revision();
    assert!(!editor.is_dirty());

    editor.mark_saved();
    assert!(!editor.is_dirty());
    assert_eq!(editor.revision(), after_first);
}

#[test]
fn duplicate_block_is_a_deep_independent_copy() {
    let mut editor = GuideEditor::new();
    let original = editor.add_block(
        section_with("Setup", vec![interactive("a"), interactive("b")]),
        None,
    );

    let copy = editor.duplicate_block(&original).unwrap();
    assert_ne!(original, copy);

    // Mutating the copy's nested list must not touch the original.
    let copy_child_id = match &editor.block(&copy).unwrap().children {
        EditorChildren::Section(children) => {
            assert_eq!(children.len(), 2);
            children[0].id.clone()
        }
        other => panic!("expected section children, got {other:?}"),
    };
    assert!(editor.unnest_block_from_section(&copy_child_id, &copy, None));

    let guide = editor.get_guide();
    match &guide.blocks[0] {
        Block::Section { blocks, .. } => assert_eq!(blocks.len(), 2),
        other => panic!("expected section, got {other:?}"),
    }
    match &guide.blocks[1] {
        Block::Section { blocks, .. } => assert_eq!(blocks.len(), 1),
        other => panic!("expected section copy, got {other:?}"),
    }
}

#[test]
fn duplicate_assigns_fresh_ids_recursively() {
    let mut editor = GuideEditor::new();
    let original = editor.add_block(section_with("S", vec![interactive("a")]), None);
    let copy = editor.duplicate_block(&original).unwrap();

    let original_child = match &editor.block(&original).unwrap().children {
        EditorChildren::Section(c) => c[0].id.clone(),
        _ => unreachable!(),
    };
    let copy_child = match &editor.block(&copy).unwrap().children {
        EditorChildren::Section(c) => c[0].id.clone(),
        _ => unreachable!(),
    };
    assert_ne!(original_child, copy_child);
}

#[test]
fn nest_and_unnest_round_trip() {
    let mut editor = GuideEditor::new();
    let block = editor.add_block(interactive("x"), None);
    let section = editor.add_block(Block::section("Steps"), None);

    assert!(editor.nest_block_in_section(&block, &section, None));
    assert_eq!(editor.root_count(), 1);
    match &editor.get_guide().blocks[0] {
        Block::Section { blocks, .. } => assert_eq!(blocks.len(), 1),
        other => panic!("expected section, got {other:?}"),
    }

    // The nested child keeps its stable id and can be addressed directly.
    assert!(editor.unnest_block_from_section(&block, &section, None));
    assert_eq!(editor.root_count(), 2);
    // Default unnest position: right after the section.
    assert!(matches!(
        editor.get_guide().blocks[1],
        Block::Interactive { .. }
    ));
}

#[test]
fn nest_rejects_containers_and_bad_targets() {
    let mut editor = GuideEditor::new();
    let inner_section = editor.add_block(Block::section("inner"), None);
    let outer_section = editor.add_block(Block::section("outer"), None);
    let markdown = editor.add_block(Block::markdown("m"), None);
    let cond = editor.add_block(conditional(&["c"]), None);
    let before = editor.revision();

    // A section can never be nested into another section.
    assert!(!editor.nest_block_in_section(&inner_section, &outer_section, None));
    // A conditional cannot be nested either.
    assert!(!editor.nest_block_in_section(&cond, &outer_section, None));
    // The target must actually be a section.
    assert!(!editor.nest_block_in_section(&markdown, &cond, Some(0)));

    assert_eq!(editor.revision(), before);
    assert_eq!(editor.root_count(), 4);
}

#[test]
fn conditional_branch_crud() {
    let mut editor = GuideEditor::new();
    let cond = editor.add_block(conditional(&["is-admin"]), None);

    let a = editor
        .add_block_to_branch(&cond, Branch::WhenTrue, interactive("a"), None)
        .unwrap();
    let b = editor
        .add_block_to_branch(&cond, Branch::WhenTrue, interactive("b"), None)
        .unwrap();
    editor
        .add_block_to_branch(&cond, Branch::WhenFalse, Block::markdown("no access"), None)
        .unwrap();

    assert!(editor.update_branch_block(&cond, Branch::WhenTrue, &a, interactive("a2")));
    assert!(editor.move_branch_block(&cond, Branch::WhenTrue, 0, 1));
    assert!(editor.delete_branch_block(&cond, Branch::WhenTrue, &b));

    let copy = editor.duplicate_branch_block(&cond, Branch::WhenTrue, &a);
    assert!(copy.is_some());

    match &editor.get_guide().blocks[0] {
        Block::Conditional {
            when_true,
            when_false,
            ..
        } => {
            assert_eq!(when_true.len(), 2); // a2 + its duplicate
            assert_eq!(when_false.len(), 1);
        }
        other => panic!("expected conditional, got {other:?}"),
    }
}

#[test]
fn branch_ops_reject_wrong_container_kind() {
    let mut editor = GuideEditor::new();
    let section = editor.add_block(Block::section("s"), None);
    let before = editor.revision();

    assert!(editor
        .add_block_to_branch(&section, Branch::WhenTrue, Block::markdown("x"), None)
        .is_none());
    assert!(!editor.move_branch_block(&section, Branch::WhenFalse, 0, 1));
    assert_eq!(editor.revision(), before);
}

#[test]
fn add_block_to_branch_rejects_containers() {
    let mut editor = GuideEditor::new();
    let cond = editor.add_block(conditional(&["c"]), None);
    assert!(editor
        .add_block_to_branch(&cond, Branch::WhenTrue, Block::section("s"), None)
        .is_none());
}

#[test]
fn cross_container_move_is_atomic() {
    let mut editor = GuideEditor::new();
    let from = editor.add_block(section_with("from", vec![interactive("x")]), None);
    let to = editor.add_block(Block::section("to"), None);
    let child = match &editor.block(&from).unwrap().children {
        EditorChildren::Section(c) => c[0].id.clone(),
        _ => unreachable!(),
    };

    let notifications = Arc::new(AtomicUsize::new(0));
    let seen = notifications.clone();
    editor.set_on_change(Box::new(move |guide: &Guide| {
        seen.fetch_add(1, Ordering::SeqCst);
        // Both sides of the move are visible in the same snapshot.
        let counts: Vec<usize> = guide
            .blocks
            .iter()
            .map(|b| match b {
                Block::Section { blocks, .. } => blocks.len(),
                _ => usize::MAX,
            })
            .collect();
        assert_eq!(counts, vec![0, 1]);
    }));

    let before = editor.revision();
    assert!(editor.move_block_between_sections(&child, &from, &to, None));
    assert_eq!(editor.revision(), before + 1);
    assert_eq!(notifications.load(Ordering::SeqCst), 1);
}

#[test]
fn move_between_branches_same_conditional() {
    let mut editor = GuideEditor::new();
    let cond = editor.add_block(conditional(&["c"]), None);
    let block = editor
        .add_block_to_branch(&cond, Branch::WhenTrue, interactive("x"), None)
        .unwrap();

    assert!(editor.move_block_between_branches(
        &cond,
        &cond,
        &block,
        Branch::WhenTrue,
        Branch::WhenFalse,
        None,
    ));
    match &editor.get_guide().blocks[0] {
        Block::Conditional {
            when_true,
            when_false,
            ..
        } => {
            assert!(when_true.is_empty());
            assert_eq!(when_false.len(), 1);
        }
        other => panic!("expected conditional, got {other:?}"),
    }
}

#[test]
fn move_between_branches_different_conditionals() {
    let mut editor = GuideEditor::new();
    let first = editor.add_block(conditional(&["a"]), None);
    let second = editor.add_block(conditional(&["b"]), None);
    let block = editor
        .add_block_to_branch(&first, Branch::WhenFalse, Block::markdown("x"), None)
        .unwrap();

    assert!(editor.move_block_between_branches(
        &first,
        &second,
        &block,
        Branch::WhenFalse,
        Branch::WhenTrue,
        Some(0),
    ));
    match &editor.get_guide().blocks[1] {
        Block::Conditional { when_true, .. } => assert_eq!(when_true.len(), 1),
        other => panic!("expected conditional, got {other:?}"),
    }
}

#[test]
fn merge_orders_steps_by_document_position() {
    // Root section with nested interactive "B" at root index 0, root
    // interactive "A" at index 1. Selecting in reverse visual order must
    // still merge as [B, A]... careful: the section sits first, so its
    // nested child is visually first.
    let mut editor = GuideEditor::new();
    let section = editor.add_block(section_with("S", vec![interactive("B")]), None);
    let root = editor.add_block(interactive("A"), None);
    let nested = match &editor.block(&section).unwrap().children {
        EditorChildren::Section(c) => c[0].id.clone(),
        _ => unreachable!(),
    };

    // Selection order is [A(root), B(nested)] — reverse of visual order.
    let merged = editor
        .merge_blocks_to_multistep(&[root.clone(), nested.clone()])
        .unwrap();

    let guide = editor.get_guide();
    // Merged block lands at the visually-first original's position: the
    // nested block's section index, i.e. root index 0.
    match &guide.blocks[0] {
        Block::Multistep { steps, .. } => {
            assert_eq!(steps.len(), 2);
            assert_eq!(steps[0].tooltip.as_deref(), Some("B"));
            assert_eq!(steps[1].tooltip.as_deref(), Some("A"));
        }
        other => panic!("expected multistep, got {other:?}"),
    }
    // Originals are gone: the section is now empty, the root interactive removed.
    match &guide.blocks[1] {
        Block::Section { blocks, .. } => assert!(blocks.is_empty()),
        other => panic!("expected section, got {other:?}"),
    }
    assert_eq!(guide.blocks.len(), 2);
    assert!(editor.block(&merged).is_some());
}

#[test]
fn merge_flattens_existing_step_sequences() {
    let mut editor = GuideEditor::new();
    let multistep = editor.add_block(
        Block::Multistep {
            content: Some("existing".to_string()),
            steps: vec![
                Step::new(InteractiveAction::Highlight).with_reftarget("panel:one"),
                Step::new(InteractiveAction::Button).with_reftarget("button:two"),
            ],
            requirements: None,
            skippable: None,
        },
        None,
    );
    let single = editor.add_block(interactive("three"), None);

    editor
        .merge_blocks_to_guided(&[multistep, single])
        .unwrap();

    match &editor.get_guide().blocks[0] {
        Block::Guided { steps, content, .. } => {
            assert_eq!(steps.len(), 3);
            assert_eq!(content.as_deref(), Some("existing"));
        }
        other => panic!("expected guided, got {other:?}"),
    }
}

#[test]
fn merge_skips_non_qualifying_blocks_and_needs_two() {
    let mut editor = GuideEditor::new();
    let markdown = editor.add_block(Block::markdown("prose"), None);
    let single = editor.add_block(interactive("only"), None);
    let before = editor.revision();

    // Only one qualifying block in the selection: no-op.
    assert!(editor
        .merge_blocks_to_multistep(&[markdown, single])
        .is_none());
    assert_eq!(editor.revision(), before);
    assert_eq!(editor.root_count(), 2);
}

#[test]
fn load_guide_reuses_root_ids_positionally() {
    let guide = Guide::new("g1", "Guide").with_blocks(vec![
        Block::markdown("a"),
        Block::markdown("b"),
        Block::markdown("c"),
    ]);

    let mut editor = GuideEditor::new();
    editor.load_guide(guide.clone(), None);
    let ids = editor.root_ids();

    let mut restored = GuideEditor::new();
    restored.load_guide(guide, Some(&ids[..2]));
    let restored_ids = restored.root_ids();
    assert_eq!(restored_ids[0], ids[0]);
    assert_eq!(restored_ids[1], ids[1]);
    assert_ne!(restored_ids[2], ids[2]); // only supplied ids are reused
    assert!(!restored.is_dirty());
}

#[test]
fn load_and_get_round_trip() {
    let guide = Guide::new("g1", "Round trip").with_blocks(vec![
        Block::markdown("intro"),
        section_with("S", vec![interactive("a")]),
        Block::Conditional {
            conditions: vec!["feature-on".to_string()],
            when_true: vec![Block::markdown("yes")],
            when_false: vec![Block::markdown("no")],
        },
    ]);

    let mut editor = GuideEditor::new();
    editor.load_guide(guide.clone(), None);
    assert_eq!(editor.get_guide(), guide);
}

#[test]
fn imported_deep_nesting_is_addressable() {
    // Direct JSON import may nest containers inside containers; the
    // editor assigns stable ids all the way down and container-scoped
    // operations keep working on those children.
    let guide = Guide::new("g1", "Deep").with_blocks(vec![section_with(
        "outer",
        vec![Block::Section {
            title: Some("inner".to_string()),
            blocks: vec![Block::markdown("leaf")],
        }],
    )]);

    let mut editor = GuideEditor::new();
    editor.load_guide(guide, None);

    let outer = editor.root_ids()[0].clone();
    let inner = match &editor.block(&outer).unwrap().children {
        EditorChildren::Section(c) => c[0].id.clone(),
        _ => unreachable!(),
    };
    let leaf = match &editor.block(&inner).unwrap().children {
        EditorChildren::Section(c) => c[0].id.clone(),
        _ => unreachable!(),
    };

    assert!(editor.update_block(&leaf, Block::markdown("edited")));
    assert!(editor.move_block_between_sections(&leaf, &inner, &outer, Some(0)));
    match &editor.get_guide().blocks[0] {
        Block::Section { blocks, .. } => {
            assert_eq!(blocks[0], Block::markdown("edited"));
        }
        other => panic!("expected section, got {other:?}"),
    }
}

#[test]
fn reset_guide_clears_everything() {
    let mut editor = GuideEditor::new();
    editor.add_block(Block::markdown("x"), None);
    editor.set_title("Something");
    editor.reset_guide();

    assert_eq!(editor.root_count(), 0);
    assert!(!editor.is_dirty());
    assert_eq!(editor.get_guide().title, "");
}

#[test]
fn on_change_receives_snapshots_only_for_applied_mutations() {
    let mut editor = GuideEditor::new();
    let notifications = Arc::new(AtomicUsize::new(0));
    let seen = notifications.clone();
    editor.set_on_change(Box::new(move |_guide| {
        seen.fetch_add(1, Ordering::SeqCst);
    }));

    editor.add_block(Block::markdown("a"), None);
    assert_eq!(notifications.load(Ordering::SeqCst), 1);

    // A no-op does not notify.
    editor.move_block(0, 0);
    assert_eq!(notifications.load(Ordering::SeqCst), 1);

    editor.set_title("Titled");
    assert_eq!(notifications.load(Ordering::SeqCst), 2);
}

#[test]
fn root_ids_are_unique_and_not_reused() {
    let mut editor = GuideEditor::new();
    let first = editor.add_block(Block::markdown("a"), None);
    editor.remove_block(&first);
    let second = editor.add_block(Block::markdown("a"), None);
    assert_ne!(first, second);
}
