// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Content and subtree bounds.

use super::id::{INVALID, NodeId};
use super::store::{DisplayList, NodeContent};
use crate::rect::Rectangle;

impl DisplayList {
    /// Writes the node's own content bounds, in local space, into `bounds`.
    ///
    /// Containers have no content of their own and always produce
    /// [`Rectangle::EMPTY`]; shapes measure their [`Graphics`](crate::graphics::Graphics).
    pub fn measure_content_bounds(&self, id: NodeId, bounds: &mut Rectangle) {
        self.validate(id);
        self.measure_content_bounds_at(id.idx, bounds);
    }

    /// Bounds of the node's content and all visible descendants, in its
    /// local space, limited to its clip.
    ///
    /// Each child contributes its own bounds mapped through the child's
    /// local transform, so no update pass is needed.
    #[must_use]
    pub fn bounds(&self, id: NodeId) -> Rectangle {
        self.validate(id);
        self.bounds_at(id.idx)
    }

    /// [`bounds`](Self::bounds) mapped through the cached world transform.
    ///
    /// Only current after [`update_transforms`](Self::update_transforms).
    #[must_use]
    pub fn world_bounds(&self, id: NodeId) -> Rectangle {
        self.validate(id);
        self.bounds_at(id.idx)
            .transformed(&self.world_transform[id.idx as usize])
    }

    /// Content bounds at raw slot `idx` in stage space, or empty for
    /// containers.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    #[must_use]
    pub fn content_world_bounds_at(&self, idx: u32) -> Rectangle {
        let mut bounds = Rectangle::EMPTY;
        self.measure_content_bounds_at(idx, &mut bounds);
        bounds.transformed(&self.world_transform[idx as usize])
    }

    pub(crate) fn measure_content_bounds_at(&self, idx: u32, bounds: &mut Rectangle) {
        match &self.content[idx as usize] {
            NodeContent::Shape(shape) => shape.graphics.measure_content_bounds(bounds),
            NodeContent::Container => bounds.set_empty(),
        }
    }

    fn bounds_at(&self, idx: u32) -> Rectangle {
        let mut bounds = Rectangle::EMPTY;
        self.measure_content_bounds_at(idx, &mut bounds);

        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            if !self.flags[child as usize].hidden {
                let child_bounds = self
                    .bounds_at(child)
                    .transformed(&self.local_transform[child as usize]);
                bounds.union_with(&child_bounds);
            }
            child = self.next_sibling[child as usize];
        }

        if let Some(clip) = &self.clip[idx as usize] {
            bounds.intersect(&clip.bounds());
        }
        bounds
    }
}
