use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::*;
use crate::effects::Blur;
use crate::render::canvas::Canvas;
use crate::render::node::DrawNode;

fn rect(w: f64, h: f64) -> Node {
    Node::shape(Shape::rect(w, h), Color::RED)
}

/// root container with two rect children; all clean.
fn settled() -> (RenderTree, NodeId, NodeId, NodeId) {
    let mut tree = RenderTree::new();
    let root = tree.insert(Node::container());
    let a = tree.insert(rect(10.0, 10.0));
    let b = tree.insert(rect(5.0, 5.0).with_transform(Affine::translate((20.0, 0.0))));
    tree.append_child(root, a).unwrap();
    tree.append_child(root, b).unwrap();
    tree.set_root(Some(root)).unwrap();
    tree.begin_frame();
    tree.end_frame();
    (tree, root, a, b)
}

#[test]
fn new_nodes_start_dirty_and_settle_after_a_frame() {
    let mut tree = RenderTree::new();
    let n = tree.insert(Node::container());
    assert_eq!(tree.state(n).unwrap(), NodeState::Dirty);
    assert_eq!(tree.begin_frame(), vec![n]);
    assert_eq!(tree.state(n).unwrap(), NodeState::Rendering);
    tree.end_frame();
    assert_eq!(tree.state(n).unwrap(), NodeState::Clean);
    assert!(tree.is_clean());
}

#[test]
fn mutation_marks_ancestors_dirty_but_not_siblings() {
    let (mut tree, root, a, b) = settled();
    tree.set_opacity(a, 0.5).unwrap();
    assert!(tree.is_dirty(a).unwrap());
    assert!(tree.is_dirty(root).unwrap());
    assert!(!tree.is_dirty(b).unwrap());
}

#[test]
fn unchanged_values_do_not_dirty() {
    let (mut tree, _, a, _) = settled();
    tree.set_opacity(a, 1.0).unwrap();
    tree.set_fill(a, Color::RED).unwrap();
    tree.set_transform(a, Affine::IDENTITY).unwrap();
    assert!(tree.is_clean());
}

#[test]
fn setters_reject_wrong_node_kinds() {
    let (mut tree, root, a, _) = settled();
    assert!(matches!(tree.set_fill(root, Color::BLUE), Err(EngineError::Validation(_))));
    assert!(matches!(
        tree.update_filters(a, |c| c.len()),
        Err(EngineError::Validation(_))
    ));
    assert!(tree.is_clean());
}

#[test]
fn children_keep_paint_order() {
    let (mut tree, root, a, b) = settled();
    let c = tree.insert(rect(1.0, 1.0));
    tree.insert_child(root, 1, c).unwrap();
    assert_eq!(tree.children(root).unwrap(), &[a, c, b]);
    assert_eq!(tree.parent(c).unwrap(), Some(root));

    let d = tree.insert(rect(1.0, 1.0));
    let err = tree.insert_child(root, 9, d).unwrap_err();
    assert!(matches!(err, EngineError::OutOfRange(_)));
}

#[test]
fn structural_rules_are_enforced() {
    let (mut tree, root, a, b) = settled();
    // leaves take no children
    let x = tree.insert(rect(1.0, 1.0));
    assert!(matches!(tree.append_child(a, x), Err(EngineError::Validation(_))));
    // one parent per node
    assert!(matches!(tree.append_child(root, b), Err(EngineError::Validation(_))));
    // root cannot become a child
    let g = tree.insert(Node::container());
    assert!(matches!(tree.append_child(g, root), Err(EngineError::Validation(_))));
    // no cycles
    let inner = tree.insert(Node::container());
    tree.append_child(g, inner).unwrap();
    assert!(matches!(tree.append_child(inner, g), Err(EngineError::Validation(_))));
    // a parented node cannot be root
    assert!(tree.set_root(Some(inner)).is_err());
}

#[test]
fn detach_keeps_subtree_and_dirties_parent() {
    let (mut tree, root, a, b) = settled();
    tree.detach(a).unwrap();
    assert_eq!(tree.children(root).unwrap(), &[b]);
    assert_eq!(tree.parent(a).unwrap(), None);
    assert!(tree.contains(a));
    assert!(tree.is_dirty(root).unwrap());
}

#[test]
fn destroy_invalidates_handles_and_reuses_slots() {
    let (mut tree, root, a, b) = settled();
    let removed = tree.destroy(root).unwrap();
    assert_eq!(removed, vec![root, a, b]);
    assert!(tree.is_empty());
    assert_eq!(tree.root(), None);
    assert!(matches!(tree.get(a), Err(EngineError::Disposed(_))));

    let fresh = tree.insert(Node::container());
    assert!(tree.contains(fresh));
    assert!(!tree.contains(a) && !tree.contains(b) && !tree.contains(root));
    assert_eq!(tree.len(), 1);
}

#[test]
fn subtree_is_depth_first_preorder() {
    let mut tree = RenderTree::new();
    let r = tree.insert(Node::container());
    let g = tree.insert(Node::container());
    let l1 = tree.insert(rect(1.0, 1.0));
    let l2 = tree.insert(rect(1.0, 1.0));
    let l3 = tree.insert(rect(1.0, 1.0));
    tree.append_child(r, g).unwrap();
    tree.append_child(g, l1).unwrap();
    tree.append_child(g, l2).unwrap();
    tree.append_child(r, l3).unwrap();
    assert_eq!(tree.subtree(r).unwrap(), vec![r, g, l1, l2, l3]);
}

#[test]
fn bounds_union_children_and_skip_invisible() {
    let (mut tree, root, a, _) = settled();
    assert_eq!(
        tree.bounds_in(root, Affine::IDENTITY).unwrap(),
        PixelRect::new(0, 0, 25, 10)
    );
    assert_eq!(
        tree.bounds_in(root, Affine::translate((1.0, 2.0))).unwrap(),
        PixelRect::new(1, 2, 25, 10)
    );
    tree.set_visible(a, false).unwrap();
    assert_eq!(
        tree.bounds_in(root, Affine::IDENTITY).unwrap(),
        PixelRect::new(20, 0, 5, 5)
    );
    let empty = tree.insert(Node::container());
    assert!(tree.bounds_in(empty, Affine::IDENTITY).unwrap().is_empty());
}

#[test]
fn filter_bounds_grow_with_the_chain() {
    let mut tree = RenderTree::new();
    let f = tree.insert(Node::filter(FilterChain::new()));
    let leaf = tree.insert(rect(10.0, 10.0));
    tree.append_child(f, leaf).unwrap();
    tree.update_filters(f, |c| {
        c.attach(Box::new(Blur::new(2)));
    })
    .unwrap();
    assert_eq!(
        tree.bounds_in(f, Affine::IDENTITY).unwrap(),
        PixelRect::new(-2, -2, 14, 14)
    );
}

#[test]
fn filter_edits_dirty_the_node() {
    let mut tree = RenderTree::new();
    let f = tree.insert(Node::filter(FilterChain::new()));
    tree.begin_frame();
    tree.end_frame();
    tree.update_filters(f, |c| {
        c.attach(Box::new(Blur::new(1)));
    })
    .unwrap();
    assert!(tree.is_dirty(f).unwrap());
}

#[derive(Debug)]
struct Versioned(Arc<AtomicU64>);

impl DrawNode for Versioned {
    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, 1.0, 1.0)
    }

    fn render(&self, _canvas: &mut Canvas) -> EngineResult<()> {
        Ok(())
    }

    fn content_hash(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

#[test]
fn refresh_picks_up_custom_content_changes() {
    let version = Arc::new(AtomicU64::new(0));
    let mut tree = RenderTree::new();
    let n = tree.insert(Node::custom(Box::new(Versioned(version.clone()))));
    tree.begin_frame();
    tree.end_frame();

    tree.refresh(n).unwrap();
    assert!(tree.is_clean());

    version.store(7, Ordering::Relaxed);
    tree.refresh(n).unwrap();
    assert!(tree.is_dirty(n).unwrap());
}
