// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display tree data model.
//!
//! A *display object* is a node in a 2D scene graph. Each node has:
//!
//! - An identity ([`NodeId`]), a generational handle that becomes stale when
//!   the node is destroyed.
//! - A kind ([`NodeKind`]): a plain container, or a shape that owns a
//!   [`Graphics`](crate::graphics::Graphics) surface.
//! - Topology: parent, first-child and sibling links forming an ordered
//!   tree. Later children draw above earlier ones.
//! - **Local properties** set by the caller:
//!   [`transform`](DisplayList::set_transform), [`alpha`](DisplayList::set_alpha),
//!   [`clip`](DisplayList::set_clip) and [`flags`](DisplayList::set_flags).
//! - **Computed properties** produced by
//!   [`update_transforms`](DisplayList::update_transforms): `world_transform`
//!   (`parent_world * local`), `effective_alpha`, `effective_hidden`, and
//!   for shapes the
//!   [`graphics_offset_matrix`](DisplayList::graphics_offset_matrix).
//!
//! One root may be designated the *stage*. Nodes under it are live; a
//! subtree leaving the stage runs its teardown, which detaches backend
//! resources from every shape in it.
//!
//! # Dirty tracking
//!
//! Property mutations automatically mark the corresponding dirty channel
//! (see [`dirty`](crate::dirty)):
//!
//! - **TRANSFORM** / **ALPHA**: propagate to all descendants, since world
//!   transforms and effective alphas are inherited.
//! - **CLIP** / **CONTENT** / **GRAPHICS**: local-only; only the modified
//!   node is marked.
//! - **TOPOLOGY**: structural changes that trigger a traversal-order
//!   rebuild.

mod bounds;
mod clip;
mod hit;
mod id;
mod store;
mod traverse;
mod update;

pub use clip::ClipShape;
pub use id::{INVALID, NodeId};
pub use store::{DisplayList, NodeFlags, NodeKind};
pub use traverse::Children;
pub use update::FrameChanges;
