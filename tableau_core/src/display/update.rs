// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The update pass and change tracking.
//!
//! An update follows a drain-recompute pattern for each dirty channel:
//!
//! 1. **TRANSFORM**: drain dirty indices, order them by traversal position,
//!    recompute each node's `world_transform` as `parent_world * local` and
//!    `effective_hidden` as `parent_effective_hidden || flags.hidden`, then
//!    run the per-kind hook. Shapes fold their render-node offset into a
//!    separate draw transform.
//! 2. **GRAPHICS**: shapes whose offset or drawing changed re-run only the
//!    hook against their current world transform.
//! 3. **ALPHA**: recompute `effective_alpha` as `parent_effective * local`.
//! 4. **CLIP** / **CONTENT**: drain only; presenters read current values.
//! 5. **TOPOLOGY**: drain and discard (the traversal order was already
//!    rebuilt at the start of the pass if needed).
//!
//! [`FrameChanges`] uses raw slot indices (`u32`) so presenters can index
//! straight into the list's arrays via the `*_at()` accessors (e.g.
//! [`world_transform_at`](super::DisplayList::world_transform_at)).

use alloc::vec::Vec;

use super::id::INVALID;
use super::store::{DisplayList, NodeContent};
use crate::dirty;
use crate::graphics::RenderNode;
use crate::matrix::{Matrix, MatrixPool};
use crate::resource::ResourceKey;
use crate::trace::{PhaseBeginEvent, PhaseEndEvent, PhaseKind, Tracer, UpdateEvent};

/// The set of changes produced by a single
/// [`DisplayList::update_transforms`] call.
///
/// Each index field contains the raw slot indices of nodes that changed in
/// the corresponding category. Presenters use these to apply incremental
/// updates.
#[derive(Clone, Debug, Default)]
pub struct FrameChanges {
    /// Nodes whose world transform was recomputed, parents before children.
    pub transforms: Vec<u32>,
    /// Shapes whose offset-folded draw transform was re-derived.
    pub graphics: Vec<u32>,
    /// Nodes whose effective alpha was recomputed.
    pub alphas: Vec<u32>,
    /// Nodes whose clip shape changed.
    pub clips: Vec<u32>,
    /// Shapes whose drawing changed.
    pub content: Vec<u32>,
    /// Nodes that transitioned from visible to effectively hidden.
    pub hidden: Vec<u32>,
    /// Nodes that transitioned from effectively hidden to visible.
    pub unhidden: Vec<u32>,
    /// Nodes created since the last update.
    pub added: Vec<u32>,
    /// Nodes destroyed since the last update.
    pub removed: Vec<u32>,
    /// Backend resources detached by stage teardown or destruction.
    pub released: Vec<ResourceKey>,
    /// Whether the tree topology changed (traversal order was rebuilt).
    pub topology_changed: bool,
}

impl FrameChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.transforms.clear();
        self.graphics.clear();
        self.alphas.clear();
        self.clips.clear();
        self.content.clear();
        self.hidden.clear();
        self.unhidden.clear();
        self.added.clear();
        self.removed.clear();
        self.released.clear();
        self.topology_changed = false;
    }

    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
            && self.graphics.is_empty()
            && self.alphas.is_empty()
            && self.clips.is_empty()
            && self.content.is_empty()
            && self.hidden.is_empty()
            && self.unhidden.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && self.released.is_empty()
            && !self.topology_changed
    }
}

impl DisplayList {
    /// Recomputes dirty world transforms, draw transforms and effective
    /// alphas, and returns the set of changes.
    ///
    /// Every recomputed node sees its parent's up-to-date world transform:
    /// nodes are processed in depth-first pre-order.
    pub fn update_transforms(&mut self) -> FrameChanges {
        let mut changes = FrameChanges::default();
        self.update_transforms_into(&mut changes);
        changes
    }

    /// Like [`update_transforms`](Self::update_transforms), but reuses a
    /// caller-provided buffer to avoid allocation.
    pub fn update_transforms_into(&mut self, changes: &mut FrameChanges) {
        self.update_transforms_traced(changes, &mut Tracer::none());
    }

    /// Like [`update_transforms_into`](Self::update_transforms_into),
    /// reporting the pass to `tracer`.
    pub fn update_transforms_traced(&mut self, changes: &mut FrameChanges, tracer: &mut Tracer<'_>) {
        changes.clear();
        self.pass_index += 1;
        let pass_index = self.pass_index;
        tracer.phase_begin(&PhaseBeginEvent {
            pass_index,
            phase: PhaseKind::Update,
        });

        if self.traversal_dirty {
            self.rebuild_traversal_order();
            changes.topology_changed = true;
            self.traversal_dirty = false;
        }

        // TRANSFORM: collect, order top-down, then recompute.
        let mut dirty_transforms: Vec<u32> = self
            .dirty
            .drain(dirty::TRANSFORM)
            .affected()
            .deterministic()
            .run()
            .filter(|&idx| self.alive[idx as usize])
            .collect();
        dirty_transforms.sort_by_key(|&idx| self.traversal_position[idx as usize]);

        #[cfg(debug_assertions)]
        let mut pending = {
            let mut pending = alloc::vec![false; self.len as usize];
            for &idx in &dirty_transforms {
                pending[idx as usize] = true;
            }
            pending
        };

        for &idx in &dirty_transforms {
            let i = idx as usize;
            let parent_idx = self.parent[i];

            #[cfg(debug_assertions)]
            {
                debug_assert!(
                    parent_idx == INVALID || !pending[parent_idx as usize],
                    "node {idx} updated before its parent {parent_idx}"
                );
                pending[i] = false;
            }

            let parent_world = if parent_idx != INVALID {
                self.world_transform[parent_idx as usize]
            } else {
                Matrix::IDENTITY
            };
            self.world_transform[i] = parent_world * self.local_transform[i];

            let parent_hidden = parent_idx != INVALID && self.effective_hidden[parent_idx as usize];
            let new_hidden = parent_hidden || self.flags[i].hidden;
            if new_hidden != self.effective_hidden[i] {
                if new_hidden {
                    changes.hidden.push(idx);
                } else {
                    changes.unhidden.push(idx);
                }
                self.effective_hidden[i] = new_hidden;
            }

            if self.refresh_graphics_offset(idx) {
                changes.graphics.push(idx);
            }
        }
        changes.transforms = dirty_transforms;

        // GRAPHICS: offset or drawing changed without a transform change.
        let dirty_graphics: Vec<u32> = self
            .dirty
            .drain(dirty::GRAPHICS)
            .deterministic()
            .run()
            .filter(|&idx| self.alive[idx as usize])
            .collect();
        for idx in dirty_graphics {
            if self.folded_pass[idx as usize] == pass_index {
                continue;
            }
            if self.refresh_graphics_offset(idx) {
                changes.graphics.push(idx);
            }
        }

        // ALPHA.
        let mut dirty_alphas: Vec<u32> = self
            .dirty
            .drain(dirty::ALPHA)
            .affected()
            .deterministic()
            .run()
            .filter(|&idx| self.alive[idx as usize])
            .collect();
        dirty_alphas.sort_by_key(|&idx| self.traversal_position[idx as usize]);
        for &idx in &dirty_alphas {
            let parent_idx = self.parent[idx as usize];
            let parent_alpha = if parent_idx != INVALID {
                self.effective_alpha[parent_idx as usize]
            } else {
                1.0
            };
            self.effective_alpha[idx as usize] = parent_alpha * self.local_alpha[idx as usize];
        }
        changes.alphas = dirty_alphas;

        // CLIP and CONTENT: no recomputation, just collect.
        changes.clips = self
            .dirty
            .drain(dirty::CLIP)
            .deterministic()
            .run()
            .filter(|&idx| self.alive[idx as usize])
            .collect();
        changes.content = self
            .dirty
            .drain(dirty::CONTENT)
            .deterministic()
            .run()
            .filter(|&idx| self.alive[idx as usize])
            .collect();

        // TOPOLOGY: structural, already handled by the traversal rebuild.
        let _: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
        core::mem::swap(&mut self.pending_released, &mut changes.released);

        #[cfg(feature = "trace-rich")]
        if tracer.is_active() {
            let records = node_change_records(changes);
            tracer.node_changes(pass_index, &records);
        }

        tracer.update(&UpdateEvent {
            pass_index,
            transforms: changes.transforms.len(),
            graphics: changes.graphics.len(),
            alphas: changes.alphas.len(),
            topology_changed: changes.topology_changed,
        });
        tracer.phase_end(&PhaseEndEvent {
            pass_index,
            phase: PhaseKind::Update,
        });
    }

    /// Returns the current traversal order (depth-first pre-order over all
    /// roots, in slot order).
    ///
    /// Only valid after [`update_transforms`](Self::update_transforms) has
    /// been called at least once.
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    /// Number of completed update passes.
    #[must_use]
    pub fn pass_index(&self) -> u64 {
        self.pass_index
    }

    /// Re-derives a shape's draw transform from its world transform.
    /// Returns `false` for containers.
    fn refresh_graphics_offset(&mut self, idx: u32) -> bool {
        let world = self.world_transform[idx as usize];
        match &mut self.content[idx as usize] {
            NodeContent::Shape(shape) => {
                shape.graphics_offset_matrix =
                    fold_offset(&world, shape.graphics.render_node(), &mut self.matrix_pool);
                self.folded_pass[idx as usize] = self.pass_index;
                true
            }
            NodeContent::Container => false,
        }
    }

    /// Rebuilds the depth-first pre-order traversal of all live nodes.
    fn rebuild_traversal_order(&mut self) {
        self.traversal_order.clear();
        self.traversal_position.fill(INVALID);
        for idx in 0..self.len {
            if self.alive[idx as usize] && self.parent[idx as usize] == INVALID {
                self.dfs_collect(idx);
            }
        }
        for (pos, &idx) in (0_u32..).zip(&self.traversal_order) {
            self.traversal_position[idx as usize] = pos;
        }
    }

    /// Depth-first pre-order collection starting from `idx`.
    fn dfs_collect(&mut self, idx: u32) {
        self.traversal_order.push(idx);
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.dfs_collect(child);
            child = self.next_sibling[child as usize];
        }
    }
}

/// Returns `world` with the render node's offset applied first.
///
/// The world matrix is copied, never modified. A zero offset leaves the
/// copy untouched; otherwise the translation is built in a pooled scratch
/// matrix that goes back to the pool before returning.
fn fold_offset(world: &Matrix, node: &RenderNode, pool: &mut MatrixPool) -> Matrix {
    let mut folded = *world;
    let (x, y) = (node.x(), node.y());
    if x != 0.0 || y != 0.0 {
        let scratch = pool.create();
        pool.get_mut(&scratch).set_to(1.0, 0.0, 0.0, 1.0, x, y);
        folded.prepend(pool.get(&scratch));
        pool.release(scratch);
    }
    folded
}

#[cfg(feature = "trace-rich")]
fn node_change_records(changes: &FrameChanges) -> Vec<crate::trace::NodeChange> {
    use crate::trace::{NodeChange, NodeField};

    let fields: [(&[u32], NodeField); 5] = [
        (&changes.transforms, NodeField::Transform),
        (&changes.graphics, NodeField::Graphics),
        (&changes.alphas, NodeField::Alpha),
        (&changes.clips, NodeField::Clip),
        (&changes.content, NodeField::Content),
    ];
    fields
        .iter()
        .flat_map(|&(indices, field)| {
            indices.iter().map(move |&node_index| NodeChange { node_index, field })
        })
        .collect()
}
