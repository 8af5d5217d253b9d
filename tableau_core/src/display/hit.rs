// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer hit testing.
//!
//! Hit tests read the world transforms cached by the last
//! [`update_transforms`](DisplayList::update_transforms) call. Stage
//! coordinates are mapped into each node's local space through the inverse
//! of its world transform; a node whose world transform is singular cannot
//! be hit.

use kurbo::Point;

use super::id::{INVALID, NodeId};
use super::store::{DisplayList, NodeContent};
use crate::rect::Rectangle;
use crate::trace::{HitTestEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, Tracer};

impl DisplayList {
    /// Returns the topmost node under the stage point, if any.
    ///
    /// With a stage set, only the stage's subtree is tested. Otherwise every
    /// root is tested, later roots first.
    #[must_use]
    pub fn hit_test(&self, stage_x: f64, stage_y: f64) -> Option<NodeId> {
        self.hit_test_traced(stage_x, stage_y, &mut Tracer::none())
    }

    /// Like [`hit_test`](Self::hit_test), reporting the query to `tracer`.
    pub fn hit_test_traced(
        &self,
        stage_x: f64,
        stage_y: f64,
        tracer: &mut Tracer<'_>,
    ) -> Option<NodeId> {
        tracer.phase_begin(&PhaseBeginEvent {
            pass_index: self.pass_index,
            phase: PhaseKind::HitTest,
        });
        let point = Point::new(stage_x, stage_y);
        let mut visited = 0;
        let hit = if self.stage != INVALID {
            self.hit_idx(self.stage, point, &mut visited)
        } else {
            self.root_indices()
                .into_iter()
                .rev()
                .find_map(|root| self.hit_idx(root, point, &mut visited))
        };
        let result = hit.map(|idx| self.id_at(idx));
        tracer.hit_test(&HitTestEvent {
            stage_x,
            stage_y,
            result,
            visited,
        });
        tracer.phase_end(&PhaseEndEvent {
            pass_index: self.pass_index,
            phase: PhaseKind::HitTest,
        });
        result
    }

    /// Hit tests the subtree rooted at `id` only.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn hit_test_node(&self, id: NodeId, stage_x: f64, stage_y: f64) -> Option<NodeId> {
        self.validate(id);
        let mut visited = 0;
        self.hit_idx(id.idx, Point::new(stage_x, stage_y), &mut visited)
            .map(|idx| self.id_at(idx))
    }

    fn hit_idx(&self, idx: u32, stage: Point, visited: &mut usize) -> Option<u32> {
        *visited += 1;
        let i = idx as usize;
        let flags = self.flags[i];
        if flags.hidden {
            return None;
        }
        let local = self.world_transform[i].invert()?.transform_point(stage);
        if let Some(clip) = &self.clip[i] {
            if !clip.contains(local) {
                return None;
            }
        }

        // Topmost child first.
        let mut child = self.last_child(idx);
        while child != INVALID {
            if let Some(hit) = self.hit_idx(child, stage, visited) {
                return Some(if flags.touch_children { hit } else { idx });
            }
            child = self.prev_sibling[child as usize];
        }

        if !flags.touch_enabled {
            return None;
        }
        let mut bounds = Rectangle::EMPTY;
        self.measure_content_bounds_at(idx, &mut bounds);
        if bounds.is_empty() || !bounds.contains(local) {
            return None;
        }
        match &self.content[i] {
            NodeContent::Container => Some(idx),
            NodeContent::Shape(shape) => shape.graphics.hit_test(local).map(NodeId::index),
        }
    }
}
