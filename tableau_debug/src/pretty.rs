// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use tableau_core::trace::{
    HitTestEvent, NodeChange, PhaseBeginEvent, PhaseEndEvent, PhaseKind, TraceSink, UpdateEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Update => "update",
        PhaseKind::HitTest => "hit",
        PhaseKind::Plan => "plan",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] pass={} {}",
            e.pass_index,
            phase_name(e.phase),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] pass={} {}",
            e.pass_index,
            phase_name(e.phase),
        );
    }

    fn on_update(&mut self, e: &UpdateEvent) {
        let topology = if e.topology_changed { " topology" } else { "" };
        let _ = writeln!(
            self.writer,
            "[update] pass={} transforms={} graphics={} alphas={}{topology}",
            e.pass_index, e.transforms, e.graphics, e.alphas,
        );
    }

    fn on_hit_test(&mut self, e: &HitTestEvent) {
        let _ = match e.result {
            Some(id) => writeln!(
                self.writer,
                "[hit] ({:.1}, {:.1}) -> {id:?} visited={}",
                e.stage_x, e.stage_y, e.visited,
            ),
            None => writeln!(
                self.writer,
                "[hit] ({:.1}, {:.1}) -> none visited={}",
                e.stage_x, e.stage_y, e.visited,
            ),
        };
    }

    fn on_node_changes(&mut self, pass_index: u64, changes: &[NodeChange]) {
        let _ = writeln!(
            self.writer,
            "[nodes] pass={pass_index} changes={}",
            changes.len(),
        );
    }
}
