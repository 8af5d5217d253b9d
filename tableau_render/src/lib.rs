// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render-plan definitions and damage tracking for tableau.
//!
//! This crate provides the intermediate representation between
//! [`tableau_core`]'s update pass and backend-specific drawing. It defines:
//!
//! - [`RenderItem`]: a single shape to draw, with its draw transform
//! - [`RenderPlan`]: an ordered list of render items for one frame
//! - [`DamageRegion`]: spatial damage for partial re-rendering
//! - [`DamageTracker`]: per-shape bounds history for old-and-new damage

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod damage;
mod plan;

pub use damage::{DamageRegion, DamageTracker};
pub use plan::{RenderItem, RenderPlan};
