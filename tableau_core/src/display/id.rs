// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display-object identity.

use core::fmt;

/// Sentinel value meaning "no node" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a display object in a [`DisplayList`](super::DisplayList).
///
/// Holds a slot index and a generation counter, so a handle kept past
/// [`destroy_node`](super::DisplayList::destroy_node) is detected instead of
/// silently addressing whatever reuses the slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    /// Slot index into the list's arrays.
    pub(crate) idx: u32,
    /// Generation counter; must match the list's generation for this slot.
    pub(crate) generation: u32,
}

impl NodeId {
    /// Returns the raw slot index (for diagnostics and `*_at` accessors).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}@gen{})", self.idx, self.generation)
    }
}
