// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clip shapes.

use kurbo::{Point, Shape as _};

use crate::rect::Rectangle;

/// A shape that clips a node's content and descendants, in the node's
/// local coordinates. Points outside it never hit the node's subtree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClipShape {
    /// An axis-aligned rectangle.
    Rect(kurbo::Rect),
    /// A rectangle with rounded corners.
    RoundedRect(kurbo::RoundedRect),
}

impl ClipShape {
    /// Returns `true` if the local point lies inside the clip.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        match self {
            Self::Rect(r) => r.contains(p),
            Self::RoundedRect(r) => r.contains(p),
        }
    }

    /// Axis-aligned bounds of the clip.
    #[must_use]
    pub fn bounds(&self) -> Rectangle {
        match self {
            Self::Rect(r) => Rectangle::from(*r),
            Self::RoundedRect(r) => Rectangle::from(r.bounding_box()),
        }
    }
}
