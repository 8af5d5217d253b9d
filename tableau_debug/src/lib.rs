// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and JSON snapshots for tableau diagnostics.
//!
//! This crate provides development tooling on top of `tableau_core`:
//!
//! - [`pretty::PrettyPrintSink`]: a [`TraceSink`](tableau_core::trace::TraceSink)
//!   writing human-readable one-line-per-event output.
//! - [`snapshot::snapshot`]: the display tree as a `serde_json` value.

pub mod pretty;
pub mod snapshot;
