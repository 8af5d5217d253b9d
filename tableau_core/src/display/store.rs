// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, stage membership
//! and property management.

use alloc::boxed::Box;
use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::clip::ClipShape;
use super::id::{INVALID, NodeId};
use super::traverse::Children;
use crate::dirty;
use crate::graphics::{Graphics, RenderNode};
use crate::matrix::{Matrix, MatrixPool, TransformParams};
use crate::resource::ResourceKey;

/// Per-node boolean flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeFlags {
    /// Hides the node and its subtree from drawing and hit testing.
    /// Properties can still be mutated while hidden.
    pub hidden: bool,
    /// Whether the node's own content can be hit.
    pub touch_enabled: bool,
    /// Whether hits on descendants are reported as the descendant. When
    /// `false`, a hit anywhere in the subtree reports this node.
    pub touch_children: bool,
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self {
            hidden: false,
            touch_enabled: true,
            touch_children: true,
        }
    }
}

/// What a node draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A grouping node with no content of its own.
    Container,
    /// A node owning a [`Graphics`] surface.
    Shape,
}

#[derive(Debug)]
pub(crate) struct ShapeData {
    pub(crate) graphics: Graphics,
    /// World transform with the render-node offset folded in. Written only
    /// by the update pass.
    pub(crate) graphics_offset_matrix: Matrix,
}

#[derive(Debug)]
pub(crate) enum NodeContent {
    Container,
    Shape(Box<ShapeData>),
}

impl NodeContent {
    pub(crate) fn kind(&self) -> NodeKind {
        match self {
            Self::Container => NodeKind::Container,
            Self::Shape(_) => NodeKind::Shape,
        }
    }
}

/// Struct-of-arrays storage for every display object of a scene.
///
/// Nodes are addressed by [`NodeId`] handles. Each node occupies a slot in
/// parallel arrays; parents are stored as slot indices, children as a
/// sibling-linked list in draw order. Destroyed nodes are recycled through a
/// free list and generation counters reject stale handles.
#[derive(Debug)]
pub struct DisplayList {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties (set by callers) --
    pub(crate) local_transform: Vec<Matrix>,
    pub(crate) local_alpha: Vec<f32>,
    pub(crate) clip: Vec<Option<ClipShape>>,
    pub(crate) flags: Vec<NodeFlags>,
    pub(crate) content: Vec<NodeContent>,

    // -- Computed properties (written by update_transforms) --
    pub(crate) world_transform: Vec<Matrix>,
    pub(crate) effective_alpha: Vec<f32>,
    pub(crate) effective_hidden: Vec<bool>,

    // -- Stage membership --
    pub(crate) stage: u32,
    pub(crate) on_stage: Vec<bool>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) alive: Vec<bool>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Traversal cache --
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_position: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
    pub(crate) pending_released: Vec<ResourceKey>,

    // -- Scratch --
    pub(crate) matrix_pool: MatrixPool,
    pub(crate) pass_index: u64,
    /// Pass in which each shape's offset was last folded.
    pub(crate) folded_pass: Vec<u64>,
}

impl Default for DisplayList {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayList {
    /// Creates an empty display list with no stage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            local_transform: Vec::new(),
            local_alpha: Vec::new(),
            clip: Vec::new(),
            flags: Vec::new(),
            content: Vec::new(),
            world_transform: Vec::new(),
            effective_alpha: Vec::new(),
            effective_hidden: Vec::new(),
            stage: INVALID,
            on_stage: Vec::new(),
            generation: Vec::new(),
            alive: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_position: Vec::new(),
            traversal_dirty: true,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
            pending_released: Vec::new(),
            matrix_pool: MatrixPool::new(),
            pass_index: 0,
            folded_pass: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a container node and returns its handle.
    ///
    /// The node starts with an identity transform, full alpha, no clip,
    /// default flags and no parent.
    pub fn create_container(&mut self) -> NodeId {
        self.create_node(NodeContent::Container)
    }

    /// Creates a shape node with an empty [`Graphics`] bound to it.
    pub fn create_shape(&mut self) -> NodeId {
        let id = self.create_node(NodeContent::Container);
        let mut graphics = Graphics::new();
        graphics.set_target(id);
        self.content[id.idx as usize] = NodeContent::Shape(Box::new(ShapeData {
            graphics,
            graphics_offset_matrix: Matrix::IDENTITY,
        }));
        id
    }

    fn create_node(&mut self, content: NodeContent) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot; the generation was bumped on destroy.
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.local_transform[i] = Matrix::IDENTITY;
            self.local_alpha[i] = 1.0;
            self.clip[i] = None;
            self.flags[i] = NodeFlags::default();
            self.content[i] = content;
            self.world_transform[i] = Matrix::IDENTITY;
            self.effective_alpha[i] = 1.0;
            self.effective_hidden[i] = false;
            self.on_stage[i] = false;
            self.alive[i] = true;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.local_transform.push(Matrix::IDENTITY);
            self.local_alpha.push(1.0);
            self.clip.push(None);
            self.flags.push(NodeFlags::default());
            self.content.push(content);
            self.world_transform.push(Matrix::IDENTITY);
            self.effective_alpha.push(1.0);
            self.effective_hidden.push(false);
            self.on_stage.push(false);
            self.generation.push(0);
            self.alive.push(true);
            self.traversal_position.push(INVALID);
            self.folded_pass.push(0);
            idx
        };

        self.traversal_dirty = true;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
        self.dirty.mark_with(idx, dirty::TRANSFORM, &EagerPolicy);
        self.dirty.mark_with(idx, dirty::ALPHA, &EagerPolicy);

        self.id_at(idx)
    }

    /// Destroys a node, freeing its slot for reuse.
    ///
    /// A node on the stage leaves it first, running its teardown. A shape's
    /// [`Graphics`] is dropped with it; an attached backend resource is
    /// reported through [`FrameChanges::released`](super::FrameChanges::released).
    ///
    /// # Panics
    ///
    /// Panics if the node has children (remove them first) or if the handle
    /// is stale.
    pub fn destroy_node(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy node with children"
        );

        if self.on_stage[idx as usize] {
            self.remove_subtree_from_stage(idx);
        }
        if self.stage == idx {
            self.stage = INVALID;
        }
        if self.parent[idx as usize] != INVALID {
            self.unlink_from_parent(idx);
        }

        let content = core::mem::replace(&mut self.content[idx as usize], NodeContent::Container);
        if let NodeContent::Shape(mut shape) = content {
            if let Some(key) = shape.graphics.on_remove_from_stage() {
                self.pending_released.push(key);
            }
        }

        self.dirty.remove_key(idx);

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;
        self.alive[idx as usize] = false;

        self.free_list.push(idx);
        self.traversal_dirty = true;
        self.pending_removed.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        id.idx < self.len
            && self.generation[id.idx as usize] == id.generation
            && self.alive[id.idx as usize]
    }

    // -- Stage API --

    /// Designates `root` as the stage, or clears the stage with `None`.
    ///
    /// Every node of the old stage's subtree leaves the stage (running its
    /// teardown); every node under the new stage joins it.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or `root` has a parent.
    pub fn set_stage(&mut self, root: Option<NodeId>) {
        if let Some(root) = root {
            self.validate(root);
            assert!(
                self.parent[root.idx as usize] == INVALID,
                "stage must be a root node"
            );
            if self.stage == root.idx {
                return;
            }
        }
        if self.stage != INVALID {
            let old = self.stage;
            self.stage = INVALID;
            self.remove_subtree_from_stage(old);
        }
        if let Some(root) = root {
            self.stage = root.idx;
            self.add_subtree_to_stage(root.idx);
        }
    }

    /// The current stage root, if any.
    #[must_use]
    pub fn stage(&self) -> Option<NodeId> {
        (self.stage != INVALID).then(|| self.id_at(self.stage))
    }

    /// Returns whether the node is part of the stage's subtree.
    #[must_use]
    pub fn is_on_stage(&self, id: NodeId) -> bool {
        self.validate(id);
        self.on_stage[id.idx as usize]
    }

    // -- Topology API --

    /// Adds `child` as the last (topmost) child of `parent`.
    ///
    /// Marks inherited channels for `child`'s subtree so world transforms,
    /// effective alpha and effective hidden state are recomputed under the
    /// new ancestry. If `parent` is on the stage, the subtree joins it.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if `child` already has a parent,
    /// is the stage, or is `parent` or one of its ancestors.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        self.assert_not_stage(c);
        self.assert_not_ancestor(c, p);

        self.link_last(p, c);
        self.attach_bookkeeping(p, c, false);
    }

    /// Inserts `child` before `sibling`, i.e. directly beneath it in draw
    /// order.
    ///
    /// # Panics
    ///
    /// Panics if handles are stale, `child` already has a parent or is the
    /// stage, `sibling` has no parent, or the insertion would create a
    /// cycle.
    pub fn insert_before(&mut self, child: NodeId, sibling: NodeId) {
        self.validate(child);
        self.validate(sibling);
        let c = child.idx;
        let s = sibling.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        let p = self.parent[s as usize];
        assert!(p != INVALID, "sibling has no parent");
        self.assert_not_stage(c);
        self.assert_not_ancestor(c, p);

        self.parent[c as usize] = p;
        self.next_sibling[c as usize] = s;
        self.prev_sibling[c as usize] = self.prev_sibling[s as usize];

        if self.prev_sibling[s as usize] != INVALID {
            self.next_sibling[self.prev_sibling[s as usize] as usize] = c;
        } else {
            // `sibling` was the first child.
            self.first_child[p as usize] = c;
        }
        self.prev_sibling[s as usize] = c;

        self.attach_bookkeeping(p, c, false);
    }

    /// Removes `child` from its current parent.
    ///
    /// The subtree's inherited properties are recomputed on the next update.
    /// If it was on the stage, every node in it runs its teardown.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has no parent.
    pub fn remove_from_parent(&mut self, child: NodeId) {
        self.validate(child);
        let c = child.idx;
        assert!(self.parent[c as usize] != INVALID, "node has no parent");

        let p = self.parent[c as usize];
        self.unlink_from_parent(c);
        self.detach_bookkeeping(p, c);

        if self.on_stage[c as usize] {
            self.remove_subtree_from_stage(c);
        }
    }

    /// Moves `child` to be the last child of `new_parent`.
    ///
    /// Stage membership follows the new ancestry: leaving the stage runs
    /// teardown, joining it marks the subtree as live.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, `child` is the stage, or the move
    /// would create a cycle.
    pub fn reparent(&mut self, child: NodeId, new_parent: NodeId) {
        self.validate(child);
        self.validate(new_parent);
        let c = child.idx;
        let p = new_parent.idx;
        self.assert_not_stage(c);
        self.assert_not_ancestor(c, p);

        let was_on_stage = self.on_stage[c as usize];
        if self.parent[c as usize] != INVALID {
            let old_p = self.parent[c as usize];
            self.unlink_from_parent(c);
            self.detach_bookkeeping(old_p, c);
        }

        self.link_last(p, c);
        let joins_stage = self.on_stage[p as usize];
        if was_on_stage && !joins_stage {
            self.remove_subtree_from_stage(c);
        }
        self.attach_bookkeeping(p, c, was_on_stage);
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_at(p))
    }

    /// Returns an iterator over the direct children of a node, back to
    /// front.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the live nodes without a parent, in slot order.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        self.root_indices().into_iter().map(|idx| self.id_at(idx)).collect()
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns what kind of node this is.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.validate(id);
        self.content[id.idx as usize].kind()
    }

    /// Returns the local transform of a node.
    #[must_use]
    pub fn local_transform(&self, id: NodeId) -> Matrix {
        self.validate(id);
        self.local_transform[id.idx as usize]
    }

    /// Returns the local alpha of a node.
    #[must_use]
    pub fn alpha(&self, id: NodeId) -> f32 {
        self.validate(id);
        self.local_alpha[id.idx as usize]
    }

    /// Returns the clip shape of a node.
    #[must_use]
    pub fn clip(&self, id: NodeId) -> Option<ClipShape> {
        self.validate(id);
        self.clip[id.idx as usize]
    }

    /// Returns the flags of a node.
    #[must_use]
    pub fn flags(&self, id: NodeId) -> NodeFlags {
        self.validate(id);
        self.flags[id.idx as usize]
    }

    /// Returns the cached world transform of a node.
    ///
    /// Only current after [`update_transforms`](Self::update_transforms).
    #[must_use]
    pub fn world_transform(&self, id: NodeId) -> Matrix {
        self.validate(id);
        self.world_transform[id.idx as usize]
    }

    /// Returns the computed effective alpha (product of ancestor alphas).
    ///
    /// Only current after [`update_transforms`](Self::update_transforms).
    #[must_use]
    pub fn effective_alpha(&self, id: NodeId) -> f32 {
        self.validate(id);
        self.effective_alpha[id.idx as usize]
    }

    /// Returns whether the node is hidden by its own flag or an ancestor's.
    ///
    /// Only current after [`update_transforms`](Self::update_transforms).
    #[must_use]
    pub fn effective_hidden(&self, id: NodeId) -> bool {
        self.validate(id);
        self.effective_hidden[id.idx as usize]
    }

    // -- Shape API --

    /// The shape's drawing surface.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not a shape.
    #[must_use]
    pub fn graphics(&self, id: NodeId) -> &Graphics {
        self.validate(id);
        &self.shape_at(id.idx).graphics
    }

    /// The shape's drawing surface, for issuing drawing commands.
    ///
    /// Marks the shape's content and offset dirty, so the next update
    /// re-derives its [`graphics_offset_matrix`](Self::graphics_offset_matrix).
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not a shape.
    pub fn graphics_mut(&mut self, id: NodeId) -> &mut Graphics {
        self.validate(id);
        let NodeContent::Shape(shape) = &mut self.content[id.idx as usize] else {
            panic!("not a shape: {id:?}");
        };
        self.dirty.mark(id.idx, dirty::CONTENT);
        self.dirty.mark(id.idx, dirty::GRAPHICS);
        &mut shape.graphics
    }

    /// The transform to draw the shape's render node with: its world
    /// transform with the render-node offset applied first.
    ///
    /// Only current after [`update_transforms`](Self::update_transforms).
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not a shape.
    #[must_use]
    pub fn graphics_offset_matrix(&self, id: NodeId) -> Matrix {
        self.validate(id);
        self.shape_at(id.idx).graphics_offset_matrix
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets the local transform of a node.
    ///
    /// Marks the TRANSFORM channel with eager propagation to descendants.
    pub fn set_transform(&mut self, id: NodeId, transform: Matrix) {
        self.validate(id);
        self.local_transform[id.idx as usize] = transform;
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Sets the local transform from position, scale, rotation, skew and
    /// anchor.
    pub fn set_transform_params(&mut self, id: NodeId, params: &TransformParams) {
        self.set_transform(id, Matrix::from_display_params(params));
    }

    /// Sets the local alpha of a node.
    ///
    /// Marks the ALPHA channel with eager propagation to descendants.
    pub fn set_alpha(&mut self, id: NodeId, alpha: f32) {
        self.validate(id);
        self.local_alpha[id.idx as usize] = alpha;
        self.dirty.mark_with(id.idx, dirty::ALPHA, &EagerPolicy);
    }

    /// Sets the clip shape of a node.
    pub fn set_clip(&mut self, id: NodeId, clip: Option<ClipShape>) {
        self.validate(id);
        self.clip[id.idx as usize] = clip;
        self.dirty.mark(id.idx, dirty::CLIP);
    }

    /// Sets the flags of a node.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        self.validate(id);
        self.flags[id.idx as usize] = flags;
        // Hidden state is recomputed alongside world transforms.
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    // -- Raw-index accessors for presenters --
    //
    // These take raw slot indices (as found in `FrameChanges` or
    // `traversal_order()`) and skip generation validation.

    /// Returns the handle for the node at raw slot `idx`.
    #[must_use]
    pub fn id_at(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Returns the node kind at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn kind_at(&self, idx: u32) -> NodeKind {
        self.check_slot(idx);
        self.content[idx as usize].kind()
    }

    /// Returns the cached world transform at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn world_transform_at(&self, idx: u32) -> Matrix {
        self.check_slot(idx);
        self.world_transform[idx as usize]
    }

    /// Returns the offset-folded draw transform at raw slot `idx`, or
    /// `None` for containers.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn graphics_offset_matrix_at(&self, idx: u32) -> Option<Matrix> {
        self.check_slot(idx);
        match &self.content[idx as usize] {
            NodeContent::Shape(shape) => Some(shape.graphics_offset_matrix),
            NodeContent::Container => None,
        }
    }

    /// Returns the render node at raw slot `idx`, or `None` for containers.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn render_node_at(&self, idx: u32) -> Option<&RenderNode> {
        self.check_slot(idx);
        match &self.content[idx as usize] {
            NodeContent::Shape(shape) => Some(shape.graphics.render_node()),
            NodeContent::Container => None,
        }
    }

    /// Returns the backend resource attached at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn resource_at(&self, idx: u32) -> Option<ResourceKey> {
        self.check_slot(idx);
        match &self.content[idx as usize] {
            NodeContent::Shape(shape) => shape.graphics.resource(),
            NodeContent::Container => None,
        }
    }

    /// Returns the effective alpha at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn effective_alpha_at(&self, idx: u32) -> f32 {
        self.check_slot(idx);
        self.effective_alpha[idx as usize]
    }

    /// Returns whether the node at raw slot `idx` is effectively hidden.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn effective_hidden_at(&self, idx: u32) -> bool {
        self.check_slot(idx);
        self.effective_hidden[idx as usize]
    }

    /// Returns the clip shape at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn clip_at(&self, idx: u32) -> Option<ClipShape> {
        self.check_slot(idx);
        self.clip[idx as usize]
    }

    /// Returns the parent slot of raw slot `idx`, if any.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn parent_at(&self, idx: u32) -> Option<u32> {
        self.check_slot(idx);
        let p = self.parent[idx as usize];
        (p != INVALID).then_some(p)
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            self.is_alive(id),
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    fn check_slot(&self, idx: u32) {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
    }

    pub(crate) fn shape_at(&self, idx: u32) -> &ShapeData {
        match &self.content[idx as usize] {
            NodeContent::Shape(shape) => shape,
            NodeContent::Container => panic!("not a shape: {:?}", self.id_at(idx)),
        }
    }

    pub(crate) fn root_indices(&self) -> Vec<u32> {
        (0..self.len)
            .filter(|&idx| self.alive[idx as usize] && self.parent[idx as usize] == INVALID)
            .collect()
    }

    /// Slot indices of the subtree rooted at `idx`, in pre-order.
    pub(crate) fn subtree(&self, idx: u32) -> Vec<u32> {
        let mut out = Vec::new();
        let mut stack = alloc::vec![idx];
        while let Some(i) = stack.pop() {
            out.push(i);
            // Push in reverse so the first child is visited first.
            let mut child = self.last_child(i);
            while child != INVALID {
                stack.push(child);
                child = self.prev_sibling[child as usize];
            }
        }
        out
    }

    pub(crate) fn last_child(&self, idx: u32) -> u32 {
        let mut last = self.first_child[idx as usize];
        if last == INVALID {
            return INVALID;
        }
        while self.next_sibling[last as usize] != INVALID {
            last = self.next_sibling[last as usize];
        }
        last
    }

    fn assert_not_stage(&self, idx: u32) {
        assert!(idx != self.stage, "stage must be a root node");
    }

    /// Panics if `node` is `of` or one of its ancestors.
    fn assert_not_ancestor(&self, node: u32, of: u32) {
        let mut cur = of;
        while cur != INVALID {
            assert!(cur != node, "cannot attach a node beneath itself");
            cur = self.parent[cur as usize];
        }
    }

    /// Appends `c` to the end of `p`'s child list.
    fn link_last(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        let last = self.last_child(p);
        if last == INVALID {
            self.first_child[p as usize] = c;
        } else {
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }
    }

    /// Dirty edges, invalidation and stage entry after `c` was linked under
    /// `p`.
    fn attach_bookkeeping(&mut self, p: u32, c: u32, already_on_stage: bool) {
        // Child depends on parent for inherited channels.
        let _ = self.dirty.add_dependency(c, p, dirty::TRANSFORM);
        let _ = self.dirty.add_dependency(c, p, dirty::ALPHA);

        self.mark_subtree_inherited_dirty(c);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);

        if self.on_stage[p as usize] && !already_on_stage {
            self.add_subtree_to_stage(c);
        }
    }

    fn detach_bookkeeping(&mut self, p: u32, c: u32) {
        self.dirty.remove_dependency(c, p, dirty::TRANSFORM);
        self.dirty.remove_dependency(c, p, dirty::ALPHA);

        self.mark_subtree_inherited_dirty(c);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Removes `idx` from its parent's child list without touching dirty
    /// state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    /// Marks the subtree rooted at `idx` dirty for inherited channels.
    fn mark_subtree_inherited_dirty(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::TRANSFORM, &EagerPolicy);
        self.dirty.mark_with(idx, dirty::ALPHA, &EagerPolicy);
    }

    fn add_subtree_to_stage(&mut self, idx: u32) {
        for i in self.subtree(idx) {
            self.on_stage[i as usize] = true;
        }
    }

    /// Stage teardown for every node under `idx`: the node leaves the stage
    /// first, then a shape's graphics releases its backend resource.
    fn remove_subtree_from_stage(&mut self, idx: u32) {
        for i in self.subtree(idx) {
            self.on_stage[i as usize] = false;
            if let NodeContent::Shape(shape) = &mut self.content[i as usize] {
                if let Some(key) = shape.graphics.on_remove_from_stage() {
                    self.pending_released.push(key);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn create_and_destroy() {
        let mut list = DisplayList::new();
        let id = list.create_container();
        assert!(list.is_alive(id));
        assert_eq!(list.kind(id), NodeKind::Container);
        list.destroy_node(id);
        assert!(!list.is_alive(id));
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut list = DisplayList::new();
        let id1 = list.create_container();
        list.destroy_node(id1);
        let id2 = list.create_shape();
        assert!(!list.is_alive(id1));
        assert!(list.is_alive(id2));
        assert_eq!(id1.idx, id2.idx);
        assert_ne!(id1.generation, id2.generation);
    }

    #[test]
    fn shape_graphics_is_bound_and_empty() {
        let mut list = DisplayList::new();
        let shape = list.create_shape();
        assert_eq!(list.kind(shape), NodeKind::Shape);
        let g = list.graphics(shape);
        assert_eq!(g.target(), Some(shape));
        assert!(g.render_node().is_empty());
        assert_eq!(g.offset(), kurbo::Vec2::ZERO);
    }

    #[test]
    fn reused_shape_slot_rebinds_target() {
        let mut list = DisplayList::new();
        let old = list.create_shape();
        list.destroy_node(old);
        let new = list.create_shape();
        assert_eq!(list.graphics(new).target(), Some(new));
    }

    #[test]
    fn add_child_and_query() {
        let mut list = DisplayList::new();
        let parent = list.create_container();
        let child1 = list.create_shape();
        let child2 = list.create_container();

        list.add_child(parent, child1);
        list.add_child(parent, child2);

        assert_eq!(list.parent(child1), Some(parent));
        assert_eq!(list.parent(child2), Some(parent));

        let kids: Vec<_> = list.children(parent).collect();
        assert_eq!(kids, vec![child1, child2]);
    }

    #[test]
    fn remove_from_parent_works() {
        let mut list = DisplayList::new();
        let parent = list.create_container();
        let child = list.create_container();

        list.add_child(parent, child);
        list.remove_from_parent(child);
        assert_eq!(list.parent(child), None);
        assert!(list.children(parent).next().is_none());
    }

    #[test]
    fn insert_before_works() {
        let mut list = DisplayList::new();
        let parent = list.create_container();
        let a = list.create_container();
        let b = list.create_container();
        let c = list.create_container();

        list.add_child(parent, a);
        list.add_child(parent, c);
        list.insert_before(b, c);

        let kids: Vec<_> = list.children(parent).collect();
        assert_eq!(kids, vec![a, b, c]);

        let d = list.create_container();
        list.insert_before(d, a);
        assert_eq!(list.children(parent).next(), Some(d));
    }

    #[test]
    fn reparent_works() {
        let mut list = DisplayList::new();
        let p1 = list.create_container();
        let p2 = list.create_container();
        let child = list.create_container();

        list.add_child(p1, child);
        list.reparent(child, p2);
        assert_eq!(list.parent(child), Some(p2));
        assert!(list.children(p1).next().is_none());
    }

    #[test]
    fn roots_returns_parentless_nodes() {
        let mut list = DisplayList::new();
        let a = list.create_container();
        let b = list.create_container();
        let c = list.create_container();
        list.add_child(a, c);

        let roots = list.roots();
        assert_eq!(roots, vec![a, b]);
    }

    #[test]
    fn stage_membership_follows_topology() {
        let mut list = DisplayList::new();
        let stage = list.create_container();
        let group = list.create_container();
        let shape = list.create_shape();
        list.add_child(group, shape);
        list.set_stage(Some(stage));

        assert!(list.is_on_stage(stage));
        assert!(!list.is_on_stage(shape));

        list.add_child(stage, group);
        assert!(list.is_on_stage(group));
        assert!(list.is_on_stage(shape));

        list.remove_from_parent(group);
        assert!(!list.is_on_stage(group));
        assert!(!list.is_on_stage(shape));
    }

    #[test]
    fn leaving_stage_releases_graphics_resources() {
        let mut list = DisplayList::new();
        let stage = list.create_container();
        let group = list.create_container();
        let a = list.create_shape();
        let b = list.create_shape();
        list.set_stage(Some(stage));
        list.add_child(stage, group);
        list.add_child(group, a);
        list.add_child(group, b);
        list.graphics_mut(a).attach_resource(ResourceKey(10));
        list.graphics_mut(b).attach_resource(ResourceKey(11));
        let _ = list.update_transforms();

        list.remove_from_parent(group);
        let changes = list.update_transforms();
        assert_eq!(changes.released, vec![ResourceKey(10), ResourceKey(11)]);
        assert_eq!(list.graphics(a).resource(), None);
        assert_eq!(list.graphics(b).resource(), None);
    }

    #[test]
    fn reparent_between_stage_and_offstage() {
        let mut list = DisplayList::new();
        let stage = list.create_container();
        let offstage = list.create_container();
        let shape = list.create_shape();
        list.set_stage(Some(stage));
        list.add_child(stage, shape);
        list.graphics_mut(shape).attach_resource(ResourceKey(1));

        // Moving within the stage keeps resources.
        let inner = list.create_container();
        list.add_child(stage, inner);
        list.reparent(shape, inner);
        assert!(list.is_on_stage(shape));
        assert_eq!(list.graphics(shape).resource(), Some(ResourceKey(1)));

        list.reparent(shape, offstage);
        assert!(!list.is_on_stage(shape));
        assert!(list.pending_released.contains(&ResourceKey(1)));
    }

    #[test]
    fn destroy_releases_resource_even_offstage() {
        let mut list = DisplayList::new();
        let shape = list.create_shape();
        list.graphics_mut(shape).attach_resource(ResourceKey(5));
        list.destroy_node(shape);
        let changes = list.update_transforms();
        assert_eq!(changes.released, vec![ResourceKey(5)]);
    }

    #[test]
    fn clearing_stage_tears_down() {
        let mut list = DisplayList::new();
        let stage = list.create_container();
        let shape = list.create_shape();
        list.add_child(stage, shape);
        list.set_stage(Some(stage));
        assert!(list.is_on_stage(shape));
        list.set_stage(None);
        assert_eq!(list.stage(), None);
        assert!(!list.is_on_stage(shape));
    }

    #[test]
    #[should_panic(expected = "stage must be a root node")]
    fn stage_must_be_root() {
        let mut list = DisplayList::new();
        let root = list.create_container();
        let child = list.create_container();
        list.add_child(root, child);
        list.set_stage(Some(child));
    }

    #[test]
    #[should_panic(expected = "stage must be a root node")]
    fn stage_cannot_become_a_child() {
        let mut list = DisplayList::new();
        let stage = list.create_container();
        let other = list.create_container();
        list.set_stage(Some(stage));
        list.add_child(other, stage);
    }

    #[test]
    #[should_panic(expected = "stage must be a root node")]
    fn stage_cannot_be_reparented() {
        let mut list = DisplayList::new();
        let stage = list.create_container();
        let other = list.create_container();
        list.set_stage(Some(stage));
        list.reparent(stage, other);
    }

    #[test]
    #[should_panic(expected = "stage must be a root node")]
    fn stage_cannot_be_inserted_before_a_sibling() {
        let mut list = DisplayList::new();
        let stage = list.create_container();
        let other = list.create_container();
        let sibling = list.create_container();
        list.add_child(other, sibling);
        list.set_stage(Some(stage));
        list.insert_before(stage, sibling);
    }

    #[test]
    #[should_panic(expected = "cannot destroy node with children")]
    fn destroy_with_children_panics() {
        let mut list = DisplayList::new();
        let parent = list.create_container();
        let child = list.create_container();
        list.add_child(parent, child);
        list.destroy_node(parent);
    }

    #[test]
    #[should_panic(expected = "cannot attach a node beneath itself")]
    fn reparent_into_own_subtree_panics() {
        let mut list = DisplayList::new();
        let a = list.create_container();
        let b = list.create_container();
        list.add_child(a, b);
        list.reparent(a, b);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_get_transform() {
        let mut list = DisplayList::new();
        let id = list.create_container();
        list.destroy_node(id);
        let _ = list.world_transform(id);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_set_transform() {
        let mut list = DisplayList::new();
        let id = list.create_container();
        list.destroy_node(id);
        list.set_transform(id, Matrix::IDENTITY);
    }

    #[test]
    #[should_panic(expected = "not a shape")]
    fn graphics_of_container_panics() {
        let mut list = DisplayList::new();
        let id = list.create_container();
        let _ = list.graphics_mut(id);
    }

    #[test]
    fn graphics_of_container_leaves_dirty_state_untouched() {
        extern crate std;

        let mut list = DisplayList::new();
        let id = list.create_container();
        let _ = list.update_transforms();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = list.graphics_mut(id);
        }));
        assert!(result.is_err(), "graphics_mut on a container must panic");
        let changes = list.update_transforms();
        assert!(changes.content.is_empty());
        assert!(changes.is_empty());
    }

    #[test]
    fn set_alpha_marks_dirty() {
        let mut list = DisplayList::new();
        let id = list.create_container();
        let _ = list.update_transforms();

        list.set_alpha(id, 0.5);
        let changes = list.update_transforms();
        assert!(changes.alphas.contains(&id.idx));
    }

    #[test]
    fn set_clip_marks_dirty() {
        let mut list = DisplayList::new();
        let id = list.create_container();
        let _ = list.update_transforms();

        list.set_clip(
            id,
            Some(ClipShape::Rect(kurbo::Rect::new(0.0, 0.0, 100.0, 100.0))),
        );
        let changes = list.update_transforms();
        assert!(changes.clips.contains(&id.idx));
    }

    #[test]
    fn graphics_mut_marks_content_dirty() {
        let mut list = DisplayList::new();
        let id = list.create_shape();
        let _ = list.update_transforms();

        list.graphics_mut(id).begin_fill(0, 1.0);
        let changes = list.update_transforms();
        assert!(changes.content.contains(&id.idx));
    }

    #[test]
    fn set_flags_marks_transform_channel() {
        let mut list = DisplayList::new();
        let id = list.create_container();
        let _ = list.update_transforms();

        list.set_flags(
            id,
            NodeFlags {
                hidden: true,
                ..NodeFlags::default()
            },
        );
        let changes = list.update_transforms();
        assert!(changes.transforms.contains(&id.idx));
    }
}
