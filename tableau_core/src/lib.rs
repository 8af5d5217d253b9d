// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display-list core for a retained-mode 2D scene graph.
//!
//! `tableau_core` keeps a tree of display objects (containers and vector
//! shapes), computes their world transforms incrementally, and answers
//! pointer hit tests. It is `no_std` compatible (with `alloc`) and uses
//! struct-of-arrays storage with generational index handles.
//!
//! # Architecture
//!
//! ```text
//!   caller mutations (set_transform, graphics_mut, add_child, ...)
//!       │  mark dirty channels
//!       ▼
//!   DisplayList::update_transforms() ──► FrameChanges ──► Presenter::apply()
//!       │
//!       ▼
//!   world transforms, graphics offset matrices ──► DisplayList::hit_test()
//! ```
//!
//! **[`display`]**: struct-of-arrays display tree with generational
//! handles, the update pass, hit testing and bounds.
//!
//! **[`graphics`]**: the [`Graphics`](graphics::Graphics) drawing surface
//! owned by each shape and the [`RenderNode`](graphics::RenderNode) it
//! fills.
//!
//! **[`matrix`]**: 2×3 affine [`Matrix`](matrix::Matrix) and the
//! [`MatrixPool`](matrix::MatrixPool) of scratch matrices.
//!
//! **[`rect`]**: axis-aligned [`Rectangle`](rect::Rectangle).
//!
//! **[`dirty`]**: multi-channel dirty tracking via `understory_dirty`.
//!
//! **[`backend`]**: the [`Presenter`](backend::Presenter) trait that
//! rendering backends implement.
//!
//! **[`resource`]**: opaque keys for backend resources.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types,
//! with the zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-node
//!   change events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub use kurbo;

pub mod backend;
pub mod dirty;
pub mod display;
pub mod graphics;
pub mod matrix;
pub mod rect;
pub mod resource;
pub mod trace;
