//! Arena of render nodes with explicit dirty propagation.

use smallvec::SmallVec;

use crate::bitmap::Bitmap;
use crate::effects::FilterChain;
use crate::foundation::core::{Affine, PixelRect, Rect};
use crate::foundation::error::{EngineError, EngineResult};
use crate::foundation::fingerprint::Fingerprint;
use crate::pixel::{Bgra8888, Color};
use crate::render::node::{Node, NodeId, NodeKind};
use crate::render::shape::Shape;

pub(crate) type Children = SmallVec<[NodeId; 4]>;

/// Invalidation state of a node.
///
/// Mutations move a node and its ancestors to `Dirty`. A frame moves every dirty node to
/// `Rendering` and back to `Clean` once it finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeState {
    Clean,
    Dirty,
    Rendering,
}

#[derive(Debug)]
struct Entry {
    node: Node,
    parent: Option<NodeId>,
    children: Children,
    state: NodeState,
    fingerprint: Fingerprint,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

/// Owns every node of a scene. Nodes are addressed by [`NodeId`] and linked by index.
#[derive(Debug, Default)]
pub struct RenderTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: Option<NodeId>,
    len: usize,
}

impl RenderTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.entry(id).is_ok()
    }

    /// Add a detached node. It starts dirty.
    pub fn insert(&mut self, node: Node) -> NodeId {
        let entry = Entry {
            fingerprint: node.fingerprint(),
            node,
            parent: None,
            children: Children::new(),
            state: NodeState::Dirty,
        };
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            entry: Some(entry),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    fn entry(&self, id: NodeId) -> EngineResult<&Entry> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.entry.as_ref())
            .ok_or_else(|| EngineError::disposed(format!("render node {id:?} no longer exists")))
    }

    fn entry_mut(&mut self, id: NodeId) -> EngineResult<&mut Entry> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.entry.as_mut())
            .ok_or_else(|| EngineError::disposed(format!("render node {id:?} no longer exists")))
    }

    pub fn get(&self, id: NodeId) -> EngineResult<&Node> {
        Ok(&self.entry(id)?.node)
    }

    pub fn parent(&self, id: NodeId) -> EngineResult<Option<NodeId>> {
        Ok(self.entry(id)?.parent)
    }

    /// Children in paint order.
    pub fn children(&self, id: NodeId) -> EngineResult<&[NodeId]> {
        Ok(&self.entry(id)?.children)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Make `id` the node rendered for each frame. It must not have a parent.
    pub fn set_root(&mut self, id: Option<NodeId>) -> EngineResult<()> {
        if let Some(id) = id
            && self.entry(id)?.parent.is_some()
        {
            return Err(EngineError::validation("root node must not have a parent"));
        }
        if self.root != id {
            self.root = id;
            if let Some(id) = id {
                self.mark_dirty(id)?;
            }
        }
        Ok(())
    }

    pub fn state(&self, id: NodeId) -> EngineResult<NodeState> {
        Ok(self.entry(id)?.state)
    }

    pub fn is_dirty(&self, id: NodeId) -> EngineResult<bool> {
        Ok(self.state(id)? != NodeState::Clean)
    }

    /// Mark `id` and every ancestor dirty.
    pub fn mark_dirty(&mut self, id: NodeId) -> EngineResult<()> {
        let mut cur = Some(id);
        while let Some(n) = cur {
            let e = self.entry_mut(n)?;
            if e.state == NodeState::Dirty && n != id {
                // Ancestors of a dirty node are already dirty.
                break;
            }
            e.state = NodeState::Dirty;
            cur = e.parent;
        }
        Ok(())
    }

    /// Append `child` as the last (topmost) child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> EngineResult<()> {
        let at = self.children(parent)?.len();
        self.insert_child(parent, at, child)
    }

    /// Insert `child` at paint position `index` under `parent`.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> EngineResult<()> {
        let p = self.entry(parent)?;
        if !p.node.accepts_children() {
            return Err(EngineError::validation(format!(
                "{} nodes cannot have children",
                p.node.kind_name()
            )));
        }
        if index > p.children.len() {
            return Err(EngineError::out_of_range(format!(
                "child index {index} exceeds {} children",
                p.children.len()
            )));
        }
        let c = self.entry(child)?;
        if c.parent.is_some() {
            return Err(EngineError::validation("node already has a parent"));
        }
        if self.root == Some(child) {
            return Err(EngineError::validation("the root node cannot become a child"));
        }
        let mut cur = Some(parent);
        while let Some(n) = cur {
            if n == child {
                return Err(EngineError::validation("attaching would create a cycle"));
            }
            cur = self.entry(n)?.parent;
        }

        self.entry_mut(parent)?.children.insert(index, child);
        self.entry_mut(child)?.parent = Some(parent);
        self.mark_dirty(parent)
    }

    /// Unlink `child` from its parent, keeping the node and its subtree alive.
    pub fn detach(&mut self, child: NodeId) -> EngineResult<()> {
        let Some(parent) = self.entry(child)?.parent else {
            return Ok(());
        };
        self.entry_mut(parent)?.children.retain(|c| *c != child);
        self.entry_mut(child)?.parent = None;
        self.mark_dirty(parent)
    }

    /// Remove `id` and its whole subtree. Returns the removed ids.
    pub fn destroy(&mut self, id: NodeId) -> EngineResult<Vec<NodeId>> {
        self.detach(id)?;
        let removed = self.subtree(id)?;
        for n in &removed {
            let slot = &mut self.slots[n.index as usize];
            slot.entry = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(n.index);
            self.len -= 1;
        }
        if self.root.is_some_and(|r| removed.contains(&r)) {
            self.root = None;
        }
        Ok(removed)
    }

    /// `id` followed by all its descendants, depth first.
    pub fn subtree(&self, id: NodeId) -> EngineResult<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            let e = self.entry(n)?;
            out.push(n);
            stack.extend(e.children.iter().rev().copied());
        }
        Ok(out)
    }

    /// Mutate the node's properties. The node is marked dirty only if its content changed.
    pub fn update<R>(&mut self, id: NodeId, f: impl FnOnce(&mut Node) -> R) -> EngineResult<R> {
        let e = self.entry_mut(id)?;
        let out = f(&mut e.node);
        let fp = e.node.fingerprint();
        if fp != e.fingerprint {
            e.fingerprint = fp;
            self.mark_dirty(id)?;
        }
        Ok(out)
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Affine) -> EngineResult<()> {
        self.update(id, |n| n.transform = transform)
    }

    pub fn set_opacity(&mut self, id: NodeId, opacity: f32) -> EngineResult<()> {
        self.update(id, |n| n.opacity = opacity)
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> EngineResult<()> {
        self.update(id, |n| n.visible = visible)
    }

    pub fn set_fill(&mut self, id: NodeId, color: Color) -> EngineResult<()> {
        self.update(id, |n| {
            let kind = n.kind_name();
            match &mut n.kind {
                NodeKind::Shape { fill, .. } => {
                    *fill = color;
                    Ok(())
                }
                _ => Err(EngineError::validation(format!("{kind} nodes have no fill"))),
            }
        })?
    }

    pub fn set_shape(&mut self, id: NodeId, new_shape: Shape) -> EngineResult<()> {
        self.update(id, |n| {
            let kind = n.kind_name();
            match &mut n.kind {
                NodeKind::Shape { shape, .. } => {
                    *shape = new_shape;
                    Ok(())
                }
                _ => Err(EngineError::validation(format!("{kind} nodes have no shape"))),
            }
        })?
    }

    pub fn set_bitmap(&mut self, id: NodeId, bitmap: Bitmap<Bgra8888>) -> EngineResult<()> {
        self.update(id, |n| {
            let kind = n.kind_name();
            match &mut n.kind {
                NodeKind::Bitmap(b) => {
                    *b = bitmap;
                    Ok(())
                }
                _ => Err(EngineError::validation(format!("{kind} nodes hold no bitmap"))),
            }
        })?
    }

    /// Edit the filter chain of a filter node.
    pub fn update_filters<R>(&mut self, id: NodeId, f: impl FnOnce(&mut FilterChain) -> R) -> EngineResult<R> {
        self.update(id, |n| {
            let kind = n.kind_name();
            match &mut n.kind {
                NodeKind::Filter(chain) => Ok(f(chain)),
                _ => Err(EngineError::validation(format!("{kind} nodes have no filters"))),
            }
        })?
    }

    /// Re-read a custom node's content hash, marking it dirty if it changed.
    pub fn refresh(&mut self, id: NodeId) -> EngineResult<()> {
        self.update(id, |_| ())
    }

    /// Device bounds of `id` when drawn under `parent` (the accumulated ancestor transform).
    ///
    /// Invisible and degenerate nodes have empty bounds.
    pub fn bounds_in(&self, id: NodeId, parent: Affine) -> EngineResult<PixelRect> {
        let e = self.entry(id)?;
        if !e.node.visible {
            return Ok(PixelRect::default());
        }
        let t = parent * e.node.transform;
        let local = |r: Rect| {
            if r.width() <= 0.0 || r.height() <= 0.0 {
                PixelRect::default()
            } else {
                PixelRect::round_out(t.transform_rect_bbox(r))
            }
        };
        Ok(match &e.node.kind {
            NodeKind::Container => self.children_bounds(&e.children, t)?,
            NodeKind::Filter(chain) => {
                let inner = self.children_bounds(&e.children, t)?;
                if inner.is_empty() {
                    inner
                } else {
                    chain.transform_bounds(inner)
                }
            }
            NodeKind::Shape { shape, .. } => local(shape.local_bounds()),
            NodeKind::Bitmap(b) => local(Rect::new(
                0.0,
                0.0,
                f64::from(b.width()),
                f64::from(b.height()),
            )),
            NodeKind::Custom(d) => local(d.bounds()),
        })
    }

    pub(crate) fn children_bounds(&self, children: &[NodeId], t: Affine) -> EngineResult<PixelRect> {
        children.iter().try_fold(PixelRect::default(), |acc, c| {
            Ok(acc.union(self.bounds_in(*c, t)?))
        })
    }

    /// Move every dirty node to `Rendering` and return them.
    pub(crate) fn begin_frame(&mut self) -> Vec<NodeId> {
        let mut dirty = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(e) = slot.entry.as_mut()
                && e.state == NodeState::Dirty
            {
                e.state = NodeState::Rendering;
                dirty.push(NodeId {
                    index: index as u32,
                    generation: slot.generation,
                });
            }
        }
        dirty
    }

    pub(crate) fn end_frame(&mut self) {
        for e in self.slots.iter_mut().filter_map(|s| s.entry.as_mut()) {
            if e.state == NodeState::Rendering {
                e.state = NodeState::Clean;
            }
        }
    }

    /// `true` when no node has pending changes.
    pub fn is_clean(&self) -> bool {
        self.slots
            .iter()
            .filter_map(|s| s.entry.as_ref())
            .all(|e| e.state == NodeState::Clean)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/tree.rs"]
mod tests;
