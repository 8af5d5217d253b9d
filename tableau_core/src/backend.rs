// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for rendering integrations.
//!
//! `tableau_core` owns the data model, the update pass and hit testing.
//! Drawing is left to *backends*: a backend keeps whatever native objects it
//! needs (GPU tessellations, canvas paths, platform views) and mirrors the
//! display tree into them by implementing [`Presenter`].
//!
//! Backend resources tied to a shape are recorded on its
//! [`Graphics`](crate::graphics::Graphics) with
//! [`attach_resource`](crate::graphics::Graphics::attach_resource). When the
//! shape leaves the stage or is destroyed, the key is detached and handed
//! back through [`FrameChanges::released`] so the backend can free it.

use crate::display::{DisplayList, FrameChanges};

/// Applies the result of an update pass to a backend presentation tree.
///
/// # Frame loop pseudocode
///
/// A typical frame callback wires the pieces together like this:
///
/// ```rust,ignore
/// fn on_frame(time: f64) {
///     // Animate: update node properties.
///     list.set_transform_params(node, &animated_params(time));
///
///     // Update: drain dirty channels, recompute world properties.
///     let changes = list.update_transforms();
///
///     // Present: apply incremental changes to the native tree.
///     presenter.apply(&list, &changes);
/// }
/// ```
pub trait Presenter {
    /// Applies the given [`FrameChanges`] to the backing presentation tree,
    /// reading current property values from `list` as needed.
    fn apply(&mut self, list: &DisplayList, changes: &FrameChanges);
}
