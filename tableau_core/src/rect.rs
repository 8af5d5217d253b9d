// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned bounds.

use kurbo::{Point, Rect};

use crate::matrix::Matrix;

/// An axis-aligned rectangle stored as origin plus size.
///
/// Bounds queries write into a caller-provided `Rectangle` in place. A
/// rectangle with non-positive width or height is empty.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rectangle {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Rectangle {
    /// The empty rectangle at the origin.
    pub const EMPTY: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates a rectangle from origin and size.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Assigns all four fields.
    #[inline]
    pub fn set_to(&mut self, x: f64, y: f64, width: f64, height: f64) {
        *self = Self::new(x, y, width, height);
    }

    /// Resets to [`EMPTY`](Self::EMPTY).
    #[inline]
    pub fn set_empty(&mut self) {
        *self = Self::EMPTY;
    }

    /// Returns `true` if the rectangle encloses no area.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Right edge.
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Returns `true` if the point lies inside or on the edge.
    #[inline]
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Grows this rectangle to cover `other`. Empty rectangles are ignored
    /// on either side.
    pub fn union_with(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = *other;
            return;
        }
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        self.set_to(x0, y0, x1 - x0, y1 - y0);
    }

    /// Shrinks this rectangle to its overlap with `other`. Disjoint
    /// rectangles produce [`EMPTY`](Self::EMPTY).
    pub fn intersect(&mut self, other: &Self) {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            self.set_empty();
        } else {
            self.set_to(x0, y0, x1 - x0, y1 - y0);
        }
    }

    /// Returns the axis-aligned bounding box of this rectangle mapped
    /// through `m`. Empty input stays empty.
    #[must_use]
    pub fn transformed(&self, m: &Matrix) -> Self {
        if self.is_empty() {
            return Self::EMPTY;
        }
        let corners = [
            m.transform_point(Point::new(self.x, self.y)),
            m.transform_point(Point::new(self.right(), self.y)),
            m.transform_point(Point::new(self.x, self.bottom())),
            m.transform_point(Point::new(self.right(), self.bottom())),
        ];
        let mut x0 = corners[0].x;
        let mut y0 = corners[0].y;
        let mut x1 = x0;
        let mut y1 = y0;
        for c in &corners[1..] {
            x0 = x0.min(c.x);
            y0 = y0.min(c.y);
            x1 = x1.max(c.x);
            y1 = y1.max(c.y);
        }
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Converts to a [`kurbo::Rect`].
    #[inline]
    #[must_use]
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.right(), self.bottom())
    }
}

impl From<Rect> for Rectangle {
    fn from(r: Rect) -> Self {
        let r = r.abs();
        Self::new(r.x0, r.y0, r.width(), r.height())
    }
}
