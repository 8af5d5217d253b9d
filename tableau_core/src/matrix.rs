// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 2×3 affine matrix and a pool of scratch matrices.
//!
//! [`Matrix`] maps a point `(x, y)` to
//! `(a·x + c·y + tx, b·x + d·y + ty)`. Multiplication follows the usual
//! column-vector convention: `outer * inner` applies `inner` first and
//! `outer` second, so a node's world transform is `parent_world * local`.
//!
//! [`MatrixPool`] hands out scratch matrices for hot per-frame computations
//! through [`PooledMatrix`] handles. A handle is consumed by
//! [`release`](MatrixPool::release), so it cannot be used after it has been
//! returned.

use alloc::vec::Vec;
use core::fmt;
use core::ops::Mul;

use kurbo::{Affine, Point};
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// A 2-D affine transform with components `(a, b, c, d, tx, ty)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix {
    /// Horizontal scale / rotation component.
    pub a: f64,
    /// Vertical skew / rotation component.
    pub b: f64,
    /// Horizontal skew / rotation component.
    pub c: f64,
    /// Vertical scale / rotation component.
    pub d: f64,
    /// Horizontal translation.
    pub tx: f64,
    /// Vertical translation.
    pub ty: f64,
}

/// Display parameters that produce a local transform.
///
/// Angles are in radians. The anchor is expressed in the node's own
/// coordinate space and is the point that ends up at `(x, y)` in the
/// parent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformParams {
    /// Horizontal position in the parent.
    pub x: f64,
    /// Vertical position in the parent.
    pub y: f64,
    /// Horizontal scale factor.
    pub scale_x: f64,
    /// Vertical scale factor.
    pub scale_y: f64,
    /// Rotation, added to both skew angles.
    pub rotation: f64,
    /// Skew of the vertical axis.
    pub skew_x: f64,
    /// Skew of the horizontal axis.
    pub skew_y: f64,
    /// Horizontal anchor offset.
    pub anchor_x: f64,
    /// Vertical anchor offset.
    pub anchor_y: f64,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            skew_x: 0.0,
            skew_y: 0.0,
            anchor_x: 0.0,
            anchor_y: 0.0,
        }
    }
}

impl Matrix {
    /// The identity matrix `(1, 0, 0, 1, 0, 0)`.
    pub const IDENTITY: Self = Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    /// Creates a matrix from its six components.
    #[inline]
    #[must_use]
    pub const fn new(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    /// Creates a pure translation.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, x, y)
    }

    /// Creates a non-uniform scale.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Creates a rotation around the origin (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation(radians: f64) -> Self {
        let (s, c) = sin_cos(radians);
        Self::new(c, s, -s, c, 0.0, 0.0)
    }

    /// Builds a local transform from display parameters.
    ///
    /// Scale is applied first, then skew/rotation, then the anchor is moved
    /// to `(x, y)`.
    #[must_use]
    pub fn from_display_params(p: &TransformParams) -> Self {
        let skew_x = p.skew_x + p.rotation;
        let skew_y = p.skew_y + p.rotation;
        let mut m = if skew_x == 0.0 && skew_y == 0.0 {
            Self::from_scale(p.scale_x, p.scale_y)
        } else {
            let (sx_sin, sx_cos) = sin_cos(skew_x);
            let (a, b) = if skew_x == skew_y {
                (sx_cos * p.scale_x, sx_sin * p.scale_x)
            } else {
                let (sy_sin, sy_cos) = sin_cos(skew_y);
                (sy_cos * p.scale_x, sy_sin * p.scale_x)
            };
            Self::new(a, b, -sx_sin * p.scale_y, sx_cos * p.scale_y, 0.0, 0.0)
        };
        m.tx = p.x - (p.anchor_x * m.a + p.anchor_y * m.c);
        m.ty = p.y - (p.anchor_x * m.b + p.anchor_y * m.d);
        m
    }

    /// Resets this matrix to the identity.
    #[inline]
    pub fn identity(&mut self) {
        *self = Self::IDENTITY;
    }

    /// Assigns all six components.
    #[inline]
    pub fn set_to(&mut self, a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) {
        *self = Self::new(a, b, c, d, tx, ty);
    }

    /// Composes `first` underneath this matrix in place.
    ///
    /// Afterwards `self` maps a point through `first`, then through the old
    /// `self`. This is `*self = *self * *first`; the translation of `first`
    /// is expressed in the coordinate space `self` maps from.
    #[inline]
    pub fn prepend(&mut self, first: &Self) {
        let (a1, b1, c1, d1) = (self.a, self.b, self.c, self.d);
        if first.a != 1.0 || first.b != 0.0 || first.c != 0.0 || first.d != 1.0 {
            self.a = first.a * a1 + first.b * c1;
            self.b = first.a * b1 + first.b * d1;
            self.c = first.c * a1 + first.d * c1;
            self.d = first.c * b1 + first.d * d1;
        }
        self.tx += first.tx * a1 + first.ty * c1;
        self.ty += first.tx * b1 + first.ty * d1;
    }

    /// Returns the inverse, or `None` if the matrix is singular or not
    /// finite.
    #[must_use]
    pub fn invert(&self) -> Option<Self> {
        let det = self.a * self.d - self.b * self.c;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        Some(Self {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            tx: (self.c * self.ty - self.d * self.tx) * inv,
            ty: (self.b * self.tx - self.a * self.ty) * inv,
        })
    }

    /// Maps a point through this matrix.
    #[inline]
    #[must_use]
    pub fn transform_point(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    /// Returns `true` if this is exactly the identity.
    #[inline]
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Is every component [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.a.is_finite()
            && self.b.is_finite()
            && self.c.is_finite()
            && self.d.is_finite()
            && self.tx.is_finite()
            && self.ty.is_finite()
    }

    /// Returns the components as `[a, b, c, d, tx, ty]`.
    #[inline]
    #[must_use]
    pub const fn to_array(self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.tx, self.ty]
    }

    /// Converts to a [`kurbo::Affine`].
    #[inline]
    #[must_use]
    pub const fn to_affine(self) -> Affine {
        Affine::new(self.to_array())
    }
}

impl Default for Matrix {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Affine> for Matrix {
    fn from(affine: Affine) -> Self {
        let [a, b, c, d, tx, ty] = affine.as_coeffs();
        Self { a, b, c, d, tx, ty }
    }
}

impl Mul for Matrix {
    type Output = Self;

    /// `self` is the outer map, `rhs` is applied first.
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self {
            a: rhs.a * self.a + rhs.b * self.c,
            b: rhs.a * self.b + rhs.b * self.d,
            c: rhs.c * self.a + rhs.d * self.c,
            d: rhs.c * self.b + rhs.d * self.d,
            tx: rhs.tx * self.a + rhs.ty * self.c + self.tx,
            ty: rhs.tx * self.b + rhs.ty * self.d + self.ty,
        }
    }
}

#[inline]
fn sin_cos(radians: f64) -> (f64, f64) {
    #[cfg(feature = "std")]
    let sc = radians.sin_cos();
    #[cfg(not(feature = "std"))]
    let sc = (radians.sin(), radians.cos());
    sc
}

// ---------------------------------------------------------------------------
// Pool
// ---------------------------------------------------------------------------

/// A handle to a scratch matrix borrowed from a [`MatrixPool`].
///
/// Handles are neither `Clone` nor `Copy`: [`MatrixPool::release`] takes the
/// handle by value, so a released matrix cannot be reached again through
/// the same handle.
#[derive(PartialEq, Eq, Hash)]
pub struct PooledMatrix {
    idx: u32,
    generation: u32,
}

impl PooledMatrix {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.idx
    }
}

impl fmt::Debug for PooledMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PooledMatrix({}@gen{})", self.idx, self.generation)
    }
}

/// Free-list arena of scratch matrices.
///
/// Release policy: every slot is reset to [`Matrix::IDENTITY`] when it is
/// released, and [`create`](Self::create) always hands out an identity
/// matrix. Nothing written through one handle is observable through a later
/// one.
#[derive(Debug, Default)]
pub struct MatrixPool {
    slots: Vec<Matrix>,
    generation: Vec<u32>,
    live: Vec<bool>,
    free_list: Vec<u32>,
    len: u32,
}

impl MatrixPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrows a scratch matrix, initialized to the identity.
    pub fn create(&mut self) -> PooledMatrix {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.live[idx as usize] = true;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.slots.push(Matrix::IDENTITY);
            self.generation.push(0);
            self.live.push(true);
            idx
        };
        PooledMatrix {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Returns a scratch matrix to the pool, resetting it to the identity.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not belong to a live slot of this pool.
    pub fn release(&mut self, m: PooledMatrix) {
        self.validate(&m);
        let idx = m.idx as usize;
        self.slots[idx] = Matrix::IDENTITY;
        self.generation[idx] = self.generation[idx].wrapping_add(1);
        self.live[idx] = false;
        self.free_list.push(m.idx);
    }

    /// Returns the matrix behind a handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not belong to a live slot of this pool.
    #[must_use]
    pub fn get(&self, m: &PooledMatrix) -> &Matrix {
        self.validate(m);
        &self.slots[m.idx as usize]
    }

    /// Returns the matrix behind a handle for mutation.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not belong to a live slot of this pool.
    pub fn get_mut(&mut self, m: &PooledMatrix) -> &mut Matrix {
        self.validate(m);
        &mut self.slots[m.idx as usize]
    }

    /// Returns whether the handle refers to a live slot of this pool.
    #[must_use]
    pub fn is_live(&self, m: &PooledMatrix) -> bool {
        m.idx < self.len
            && self.live[m.idx as usize]
            && self.generation[m.idx as usize] == m.generation
    }

    /// Number of matrices currently borrowed.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    fn validate(&self, m: &PooledMatrix) {
        assert!(self.is_live(m), "stale PooledMatrix: {m:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn approx_eq(x: Matrix, y: Matrix) -> bool {
        x.to_array()
            .iter()
            .zip(y.to_array().iter())
            .all(|(p, q)| (p - q).abs() < EPS)
    }

    fn samples() -> [Matrix; 4] {
        [
            Matrix::new(2.0, 0.5, -0.25, 1.5, 3.0, -7.0),
            Matrix::from_rotation(0.7) * Matrix::from_scale(1.5, 0.5),
            Matrix::from_translation(-4.0, 12.5),
            Matrix::new(0.0, -1.0, 1.0, 0.0, 10.0, 20.0),
        ]
    }

    #[test]
    fn default_is_identity() {
        assert_eq!(Matrix::default(), Matrix::IDENTITY);
        let mut m = Matrix::new(3.0, 1.0, 4.0, 1.0, 5.0, 9.0);
        m.identity();
        assert!(m.is_identity());
    }

    #[test]
    fn multiply_follows_compose_rule() {
        let m1 = Matrix::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        let m2 = Matrix::new(7.0, 8.0, 9.0, 10.0, 11.0, 12.0);
        let r = m1 * m2;
        assert_eq!(r.a, m2.a * m1.a + m2.b * m1.c);
        assert_eq!(r.b, m2.a * m1.b + m2.b * m1.d);
        assert_eq!(r.c, m2.c * m1.a + m2.d * m1.c);
        assert_eq!(r.d, m2.c * m1.b + m2.d * m1.d);
        assert_eq!(r.tx, m2.tx * m1.a + m2.ty * m1.c + m1.tx);
        assert_eq!(r.ty, m2.tx * m1.b + m2.ty * m1.d + m1.ty);
    }

    #[test]
    fn multiply_applies_rhs_first() {
        let outer = Matrix::from_scale(2.0, 2.0);
        let inner = Matrix::from_translation(3.0, 4.0);
        let p = (outer * inner).transform_point(Point::new(1.0, 1.0));
        assert_eq!(p, Point::new(8.0, 10.0));
    }

    #[test]
    fn composition_is_associative() {
        for m1 in samples() {
            for m2 in samples() {
                for m3 in samples() {
                    assert!(
                        approx_eq((m1 * m2) * m3, m1 * (m2 * m3)),
                        "associativity failed for {m1:?} {m2:?} {m3:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn identity_is_neutral_on_both_sides() {
        for m in samples() {
            assert_eq!(Matrix::IDENTITY * m, m);
            assert_eq!(m * Matrix::IDENTITY, m);
        }
    }

    #[test]
    fn prepend_matches_multiplication() {
        for m in samples() {
            for first in samples() {
                let mut in_place = m;
                in_place.prepend(&first);
                assert!(approx_eq(in_place, m * first), "{m:?} <- {first:?}");
            }
        }
    }

    #[test]
    fn prepend_translation_uses_existing_linear_part() {
        let mut m = Matrix::new(2.0, 0.0, 0.0, 3.0, 10.0, 20.0);
        m.prepend(&Matrix::from_translation(5.0, 3.0));
        assert_eq!(m, Matrix::new(2.0, 0.0, 0.0, 3.0, 20.0, 29.0));
    }

    #[test]
    fn invert_round_trips() {
        for m in samples() {
            let inv = m.invert().expect("sample matrices are invertible");
            assert!(approx_eq(m * inv, Matrix::IDENTITY));
            assert!(approx_eq(inv * m, Matrix::IDENTITY));
        }
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        assert!(Matrix::from_scale(0.0, 1.0).invert().is_none());
        assert!(Matrix::new(f64::NAN, 0.0, 0.0, 1.0, 0.0, 0.0).invert().is_none());
    }

    #[test]
    fn display_params_default_is_identity() {
        assert_eq!(
            Matrix::from_display_params(&TransformParams::default()),
            Matrix::IDENTITY
        );
    }

    #[test]
    fn display_params_anchor_lands_on_position() {
        let params = TransformParams {
            x: 100.0,
            y: 50.0,
            scale_x: 2.0,
            scale_y: 2.0,
            rotation: core::f64::consts::FRAC_PI_2,
            anchor_x: 5.0,
            anchor_y: 5.0,
            ..TransformParams::default()
        };
        let m = Matrix::from_display_params(&params);
        let p = m.transform_point(Point::new(5.0, 5.0));
        assert!((p.x - 100.0).abs() < EPS && (p.y - 50.0).abs() < EPS, "{p:?}");
        // A quarter turn maps +x onto +y.
        let q = m.transform_point(Point::new(6.0, 5.0));
        assert!((q.x - 100.0).abs() < EPS && (q.y - 52.0).abs() < EPS, "{q:?}");
    }

    #[test]
    fn affine_round_trip() {
        let m = Matrix::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        assert_eq!(Matrix::from(m.to_affine()), m);
        let p = Point::new(2.0, -1.0);
        assert_eq!(m.to_affine() * p, m.transform_point(p));
    }

    #[test]
    fn pool_create_is_identity() {
        let mut pool = MatrixPool::new();
        let m = pool.create();
        assert!(pool.get(&m).is_identity());
        assert_eq!(pool.live_count(), 1);
        pool.release(m);
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn released_state_is_not_observable() {
        let mut pool = MatrixPool::new();
        let m = pool.create();
        let slot = m.index();
        pool.get_mut(&m).set_to(9.0, 8.0, 7.0, 6.0, 5.0, 4.0);
        pool.release(m);

        let reused = pool.create();
        assert_eq!(reused.index(), slot, "free slot should be reused");
        assert!(pool.get(&reused).is_identity());
        pool.release(reused);
    }

    #[test]
    fn pool_grows_while_borrowed() {
        let mut pool = MatrixPool::new();
        let a = pool.create();
        let b = pool.create();
        assert_ne!(a.index(), b.index());
        pool.release(b);
        pool.release(a);
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    #[should_panic(expected = "stale PooledMatrix")]
    fn foreign_handle_panics() {
        let mut pool = MatrixPool::new();
        let other = MatrixPool::new();
        let m = pool.create();
        let _ = other.get(&m);
    }
}
