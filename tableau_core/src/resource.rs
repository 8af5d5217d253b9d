// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Opaque keys for backend-managed drawing resources.

use core::fmt;

/// An opaque handle to a backend-managed resource (texture, tessellation
/// buffer, native path object, etc.).
///
/// Backends attach keys to a shape's [`Graphics`](crate::graphics::Graphics)
/// and get them back through [`FrameChanges::released`] once the shape
/// leaves the stage. Core never interprets the value.
///
/// [`FrameChanges::released`]: crate::display::FrameChanges::released
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceKey(pub u64);

impl fmt::Debug for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceKey({})", self.0)
    }
}
