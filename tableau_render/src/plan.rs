// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render plan: an ordered sequence of draw items for one frame.

use alloc::vec::Vec;

use tableau_core::display::{DisplayList, NodeId, NodeKind};
use tableau_core::matrix::Matrix;
use tableau_core::rect::Rectangle;
use tableau_core::resource::ResourceKey;
use tableau_core::trace::{PhaseBeginEvent, PhaseEndEvent, PhaseKind, Tracer};

/// A single draw command in the render plan.
///
/// Items are produced in back-to-front order, matching the display tree's
/// traversal order.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderItem {
    /// The shape this item originates from.
    pub node: NodeId,
    /// Transform to draw the shape's render node with: its world transform
    /// with the render-node offset applied first.
    pub transform: Matrix,
    /// Effective alpha, accumulated from ancestors.
    pub alpha: f32,
    /// Stage-space bounds of every ancestor clip, intersected. `None` when
    /// no ancestor clips.
    pub clip: Option<Rectangle>,
    /// Backend resource attached to the shape's graphics, if any.
    pub resource: Option<ResourceKey>,
}

/// An ordered list of draw commands for a single frame.
///
/// Only visible shapes with content are listed. With a stage set, only the
/// stage's subtree is drawn; otherwise every root is.
#[derive(Clone, Debug, Default)]
pub struct RenderPlan {
    /// Draw items in back-to-front order.
    pub items: Vec<RenderItem>,
    clip_scratch: Vec<Option<Rectangle>>,
}

impl RenderPlan {
    /// Creates an empty render plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the plan for reuse.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Builds a plan from the state left by the last
    /// [`update_transforms`](DisplayList::update_transforms).
    #[must_use]
    pub fn build(list: &DisplayList) -> Self {
        let mut plan = Self::new();
        plan.rebuild(list, &mut Tracer::none());
        plan
    }

    /// Rebuilds this plan in place, reporting the pass to `tracer`.
    pub fn rebuild(&mut self, list: &DisplayList, tracer: &mut Tracer<'_>) {
        tracer.phase_begin(&PhaseBeginEvent {
            pass_index: list.pass_index(),
            phase: PhaseKind::Plan,
        });
        self.clear();

        let order = list.traversal_order();
        let slots = order.iter().max().map_or(0, |&max| max as usize + 1);
        self.clip_scratch.clear();
        self.clip_scratch.resize(slots, None);

        let stage = list.stage();
        for &idx in order {
            // Clip accumulation runs parent-first, so the parent's entry is
            // already filled.
            let inherited = list
                .parent_at(idx)
                .and_then(|p| self.clip_scratch[p as usize]);
            let own = list
                .clip_at(idx)
                .map(|clip| clip.bounds().transformed(&list.world_transform_at(idx)));
            let clip = match (inherited, own) {
                (Some(mut a), Some(b)) => {
                    a.intersect(&b);
                    Some(a)
                }
                (a, b) => a.or(b),
            };
            self.clip_scratch[idx as usize] = clip;

            if list.kind_at(idx) != NodeKind::Shape || list.effective_hidden_at(idx) {
                continue;
            }
            let node = list.id_at(idx);
            if stage.is_some() && !list.is_on_stage(node) {
                continue;
            }
            let alpha = list.effective_alpha_at(idx);
            if alpha <= 0.0 {
                continue;
            }
            if list.render_node_at(idx).is_none_or(|n| n.is_empty()) {
                continue;
            }
            let Some(transform) = list.graphics_offset_matrix_at(idx) else {
                continue;
            };
            self.items.push(RenderItem {
                node,
                transform,
                alpha,
                clip,
                resource: list.resource_at(idx),
            });
        }

        tracer.phase_end(&PhaseEndEvent {
            pass_index: list.pass_index(),
            phase: PhaseKind::Plan,
        });
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use tableau_core::display::{ClipShape, NodeFlags};
    use tableau_core::kurbo::Rect;

    fn filled(list: &mut DisplayList) -> NodeId {
        let id = list.create_shape();
        let g = list.graphics_mut(id);
        g.begin_fill(0xff_ff_ff, 1.0);
        g.draw_rect(0.0, 0.0, 10.0, 10.0);
        g.end_fill();
        id
    }

    fn nodes(plan: &RenderPlan) -> Vec<NodeId> {
        plan.items.iter().map(|item| item.node).collect()
    }

    #[test]
    fn items_follow_draw_order() {
        let mut list = DisplayList::new();
        let root = list.create_container();
        let group = list.create_container();
        let a = filled(&mut list);
        let b = filled(&mut list);
        let c = filled(&mut list);
        list.add_child(root, group);
        list.add_child(group, a);
        list.add_child(group, b);
        list.add_child(root, c);
        let _ = list.update_transforms();

        let plan = RenderPlan::build(&list);
        assert_eq!(nodes(&plan), [a, b, c]);
    }

    #[test]
    fn skips_empty_hidden_and_transparent_shapes() {
        let mut list = DisplayList::new();
        let root = list.create_container();
        let empty = list.create_shape();
        let hidden = filled(&mut list);
        let transparent = filled(&mut list);
        let visible = filled(&mut list);
        for id in [empty, hidden, transparent, visible] {
            list.add_child(root, id);
        }
        list.set_flags(
            hidden,
            NodeFlags {
                hidden: true,
                ..NodeFlags::default()
            },
        );
        list.set_alpha(transparent, 0.0);
        let _ = list.update_transforms();

        let plan = RenderPlan::build(&list);
        assert_eq!(nodes(&plan), [visible]);
    }

    #[test]
    fn item_carries_offset_transform_alpha_and_resource() {
        let mut list = DisplayList::new();
        let root = list.create_container();
        let shape = filled(&mut list);
        list.add_child(root, shape);
        list.set_transform(root, Matrix::from_translation(10.0, 20.0));
        list.set_alpha(root, 0.5);
        let g = list.graphics_mut(shape);
        g.set_offset(5.0, 3.0);
        g.attach_resource(ResourceKey(9));
        let _ = list.update_transforms();

        let plan = RenderPlan::build(&list);
        let item = &plan.items[0];
        assert_eq!(item.transform, Matrix::from_translation(15.0, 23.0));
        assert!((item.alpha - 0.5).abs() < 1e-6);
        assert_eq!(item.resource, Some(ResourceKey(9)));
        assert_eq!(item.clip, None);
    }

    #[test]
    fn clips_accumulate_in_stage_space() {
        let mut list = DisplayList::new();
        let outer = list.create_container();
        let inner = list.create_container();
        let shape = filled(&mut list);
        list.add_child(outer, inner);
        list.add_child(inner, shape);
        list.set_clip(
            outer,
            Some(ClipShape::Rect(Rect::new(0.0, 0.0, 100.0, 100.0))),
        );
        list.set_transform(inner, Matrix::from_translation(50.0, 50.0));
        list.set_clip(
            inner,
            Some(ClipShape::Rect(Rect::new(0.0, 0.0, 100.0, 20.0))),
        );
        let _ = list.update_transforms();

        let plan = RenderPlan::build(&list);
        assert_eq!(
            plan.items[0].clip,
            Some(Rectangle::new(50.0, 50.0, 50.0, 20.0))
        );
    }

    #[test]
    fn stage_limits_plan() {
        let mut list = DisplayList::new();
        let stage = list.create_container();
        let on = filled(&mut list);
        let _off = filled(&mut list);
        list.add_child(stage, on);
        list.set_stage(Some(stage));
        let _ = list.update_transforms();

        let plan = RenderPlan::build(&list);
        assert_eq!(nodes(&plan), [on]);
    }
}
