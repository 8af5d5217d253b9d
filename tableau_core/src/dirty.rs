// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The display list uses multi-channel dirty tracking (via
//! [`understory_dirty`]) to propagate invalidation through the tree. Each
//! channel is an independent category of change.
//!
//! # Propagation semantics
//!
//! - **Propagating**: [`TRANSFORM`] and [`ALPHA`] use
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) with dependency edges
//!   from child to parent. Marking a node marks its whole subtree, because
//!   world transforms, effective alpha and effective hidden state are
//!   inherited. Hidden-flag changes ride on [`TRANSFORM`].
//!
//! - **Local-only**: [`CLIP`], [`CONTENT`] and [`GRAPHICS`] mark just the
//!   node. [`GRAPHICS`] re-derives a shape's offset matrix from its current
//!   world transform without touching ancestors or descendants.
//!
//! - **Structural**: [`TOPOLOGY`] is marked on add/remove/create/destroy
//!   and triggers a traversal-order rebuild.
//!
//! # Consumption
//!
//! Callers never query dirty state directly. Each
//! [`DisplayList::update_transforms`](crate::display::DisplayList::update_transforms)
//! drains every channel and reports the result as
//! [`FrameChanges`](crate::display::FrameChanges).

use understory_dirty::Channel;

/// Local transform or hidden flag changed; world transforms of the subtree
/// must be recomputed.
pub const TRANSFORM: Channel = Channel::new(0);

/// Alpha changed; effective alpha of the subtree must be recomputed.
pub const ALPHA: Channel = Channel::new(1);

/// Clip rectangle changed.
pub const CLIP: Channel = Channel::new(2);

/// Shape content changed (drawing commands were issued).
pub const CONTENT: Channel = Channel::new(3);

/// Tree topology changed.
pub const TOPOLOGY: Channel = Channel::new(4);

/// A shape's render-node offset may have changed; its offset matrix must be
/// re-derived.
pub const GRAPHICS: Channel = Channel::new(5);
