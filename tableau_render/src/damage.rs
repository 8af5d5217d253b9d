// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spatial damage tracking for partial re-rendering.

use alloc::vec::Vec;

use tableau_core::display::{DisplayList, FrameChanges, NodeKind};
use tableau_core::rect::Rectangle;

/// A region of the stage that needs re-rendering.
///
/// Backends can use this to minimize work by only redrawing areas that
/// changed since the last frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DamageRegion {
    /// The entire stage needs redrawing.
    #[default]
    Full,
    /// A list of stage-space rectangles that need redrawing.
    Rects(Vec<Rectangle>),
    /// Nothing changed; the previous frame can be reused.
    None,
}

impl DamageRegion {
    /// Damage covering the current stage bounds of every shape touched by
    /// `changes`.
    ///
    /// Topology and clip changes produce [`Full`](Self::Full): their effect
    /// on what is visible is not local to the changed nodes. The area a
    /// shape covered before it moved is not included; use
    /// [`DamageTracker`] for that.
    #[must_use]
    pub fn from_changes(list: &DisplayList, changes: &FrameChanges) -> Self {
        if changes.topology_changed || !changes.clips.is_empty() {
            return Self::Full;
        }
        let mut region = Self::None;
        for idx in changed_shapes(list, changes) {
            region.add_rect(visible_bounds(list, idx));
        }
        region
    }

    /// Returns `true` if no region needs redrawing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Adds a rectangle to the region. Empty rectangles are ignored.
    pub fn add_rect(&mut self, rect: Rectangle) {
        if rect.is_empty() {
            return;
        }
        match self {
            Self::Full => {}
            Self::Rects(rects) => rects.push(rect),
            Self::None => *self = Self::Rects(alloc::vec![rect]),
        }
    }

    /// Merges another damage region into this one.
    pub fn merge(&mut self, other: &Self) {
        match (&*self, other) {
            (Self::Full, _) | (_, Self::Full) => *self = Self::Full,
            (Self::None, _) => *self = other.clone(),
            (_, Self::None) => {}
            (Self::Rects(a), Self::Rects(b)) => {
                let mut merged = a.clone();
                merged.extend_from_slice(b);
                *self = Self::Rects(merged);
            }
        }
    }

    /// Single rectangle covering the whole region, or `None` for
    /// [`Full`](Self::Full) and [`None`](Self::None).
    #[must_use]
    pub fn bounds(&self) -> Option<Rectangle> {
        match self {
            Self::Rects(rects) => {
                let mut out = Rectangle::EMPTY;
                for r in rects {
                    out.union_with(r);
                }
                Some(out)
            }
            Self::Full | Self::None => None,
        }
    }
}

/// Remembers each shape's stage bounds between frames so that damage
/// covers both where a shape was and where it is now.
#[derive(Clone, Debug, Default)]
pub struct DamageTracker {
    previous: Vec<Rectangle>,
}

impl DamageTracker {
    /// Creates a tracker with no history. The first frame is always
    /// [`DamageRegion::Full`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the damage for one update pass and records the new bounds.
    pub fn track(&mut self, list: &DisplayList, changes: &FrameChanges) -> DamageRegion {
        if changes.topology_changed || !changes.clips.is_empty() {
            self.snapshot(list);
            return DamageRegion::Full;
        }
        let mut region = DamageRegion::None;
        for idx in changed_shapes(list, changes) {
            let old = self.previous_at(idx);
            let new = visible_bounds(list, idx);
            region.add_rect(old);
            if new != old {
                region.add_rect(new);
            }
            *self.slot(idx) = new;
        }
        region
    }

    /// Forgets all history, so the next frame is fully damaged.
    pub fn reset(&mut self) {
        self.previous.clear();
    }

    fn snapshot(&mut self, list: &DisplayList) {
        self.previous.clear();
        for &idx in list.traversal_order() {
            if list.kind_at(idx) == NodeKind::Shape {
                *self.slot(idx) = visible_bounds(list, idx);
            }
        }
    }

    fn previous_at(&self, idx: u32) -> Rectangle {
        self.previous
            .get(idx as usize)
            .copied()
            .unwrap_or(Rectangle::EMPTY)
    }

    fn slot(&mut self, idx: u32) -> &mut Rectangle {
        let i = idx as usize;
        if i >= self.previous.len() {
            self.previous.resize(i + 1, Rectangle::EMPTY);
        }
        &mut self.previous[i]
    }
}

/// Shape slots touched by any per-node change list, sorted and deduplicated.
fn changed_shapes(list: &DisplayList, changes: &FrameChanges) -> Vec<u32> {
    let mut out: Vec<u32> = changes
        .transforms
        .iter()
        .chain(&changes.graphics)
        .chain(&changes.alphas)
        .chain(&changes.content)
        .chain(&changes.hidden)
        .chain(&changes.unhidden)
        .copied()
        .filter(|&idx| list.kind_at(idx) == NodeKind::Shape)
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

fn visible_bounds(list: &DisplayList, idx: u32) -> Rectangle {
    if list.effective_hidden_at(idx) {
        Rectangle::EMPTY
    } else {
        list.content_world_bounds_at(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tableau_core::display::{ClipShape, NodeFlags, NodeId};
    use tableau_core::kurbo::Rect;
    use tableau_core::matrix::Matrix;

    fn filled(list: &mut DisplayList) -> NodeId {
        let id = list.create_shape();
        let g = list.graphics_mut(id);
        g.begin_fill(0, 1.0);
        g.draw_rect(0.0, 0.0, 10.0, 10.0);
        g.end_fill();
        id
    }

    #[test]
    fn merge_rules() {
        let mut region = DamageRegion::None;
        region.merge(&DamageRegion::Rects(alloc::vec![Rectangle::new(
            0.0, 0.0, 1.0, 1.0
        )]));
        assert!(matches!(&region, DamageRegion::Rects(r) if r.len() == 1));
        region.merge(&DamageRegion::None);
        assert!(matches!(&region, DamageRegion::Rects(r) if r.len() == 1));
        region.merge(&DamageRegion::Full);
        assert_eq!(region, DamageRegion::Full);
        assert!(!region.is_empty());
    }

    #[test]
    fn topology_change_is_full() {
        let mut list = DisplayList::new();
        let _ = filled(&mut list);
        let changes = list.update_transforms();
        assert_eq!(
            DamageRegion::from_changes(&list, &changes),
            DamageRegion::Full
        );
    }

    #[test]
    fn no_change_is_empty() {
        let mut list = DisplayList::new();
        let _ = filled(&mut list);
        let _ = list.update_transforms();
        let changes = list.update_transforms();
        assert!(DamageRegion::from_changes(&list, &changes).is_empty());
    }

    #[test]
    fn from_changes_covers_new_bounds() {
        let mut list = DisplayList::new();
        let root = list.create_container();
        let moved = filled(&mut list);
        let still = filled(&mut list);
        list.add_child(root, moved);
        list.add_child(root, still);
        let _ = list.update_transforms();

        list.set_transform(moved, Matrix::from_translation(100.0, 0.0));
        let changes = list.update_transforms();
        let region = DamageRegion::from_changes(&list, &changes);
        assert_eq!(
            region,
            DamageRegion::Rects(alloc::vec![Rectangle::new(100.0, 0.0, 10.0, 10.0)])
        );
    }

    #[test]
    fn tracker_unions_old_and_new() {
        let mut list = DisplayList::new();
        let shape = filled(&mut list);
        let mut tracker = DamageTracker::new();

        let changes = list.update_transforms();
        assert_eq!(tracker.track(&list, &changes), DamageRegion::Full);

        list.set_transform(shape, Matrix::from_translation(50.0, 0.0));
        let changes = list.update_transforms();
        let region = tracker.track(&list, &changes);
        assert_eq!(
            region,
            DamageRegion::Rects(alloc::vec![
                Rectangle::new(0.0, 0.0, 10.0, 10.0),
                Rectangle::new(50.0, 0.0, 10.0, 10.0),
            ])
        );
        assert_eq!(region.bounds(), Some(Rectangle::new(0.0, 0.0, 60.0, 10.0)));
    }

    #[test]
    fn tracker_hiding_damages_old_area_only() {
        let mut list = DisplayList::new();
        let shape = filled(&mut list);
        let mut tracker = DamageTracker::new();
        let changes = list.update_transforms();
        let _ = tracker.track(&list, &changes);

        list.set_flags(
            shape,
            NodeFlags {
                hidden: true,
                ..NodeFlags::default()
            },
        );
        let changes = list.update_transforms();
        assert_eq!(
            tracker.track(&list, &changes),
            DamageRegion::Rects(alloc::vec![Rectangle::new(0.0, 0.0, 10.0, 10.0)])
        );
    }

    #[test]
    fn clip_change_is_full() {
        let mut list = DisplayList::new();
        let shape = filled(&mut list);
        let mut tracker = DamageTracker::new();
        let changes = list.update_transforms();
        let _ = tracker.track(&list, &changes);

        list.set_clip(shape, Some(ClipShape::Rect(Rect::new(0.0, 0.0, 5.0, 5.0))));
        let changes = list.update_transforms();
        assert_eq!(tracker.track(&list, &changes), DamageRegion::Full);
    }
}
