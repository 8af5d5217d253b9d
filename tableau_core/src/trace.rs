// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the update and hit-test passes.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! the display list calls while it works. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates per-node [`NodeChange`] records
//!   and the corresponding `TraceSink` method.

use crate::display::NodeId;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which pass is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// World transform, alpha and offset recomputation.
    Update,
    /// Pointer hit testing.
    HitTest,
    /// Render plan construction.
    Plan,
}

/// Which property of a node changed.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeField {
    /// World transform.
    Transform,
    /// Effective alpha.
    Alpha,
    /// Clip shape.
    Clip,
    /// Drawn content.
    Content,
    /// Offset-folded graphics transform.
    Graphics,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Marks the beginning of a pass.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Update pass counter.
    pub pass_index: u64,
    /// Which pass is starting.
    pub phase: PhaseKind,
}

/// Marks the end of a pass.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Update pass counter.
    pub pass_index: u64,
    /// Which pass is ending.
    pub phase: PhaseKind,
}

/// Summary of one update pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateEvent {
    /// Update pass counter.
    pub pass_index: u64,
    /// Nodes whose world transform was recomputed.
    pub transforms: usize,
    /// Shapes whose graphics offset was folded into their draw transform.
    pub graphics: usize,
    /// Nodes whose effective alpha was recomputed.
    pub alphas: usize,
    /// Whether the traversal order was rebuilt.
    pub topology_changed: bool,
}

/// Result of one hit test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitTestEvent {
    /// Horizontal stage coordinate.
    pub stage_x: f64,
    /// Vertical stage coordinate.
    pub stage_y: f64,
    /// The node hit, if any.
    pub result: Option<NodeId>,
    /// Number of nodes visited.
    pub visited: usize,
}

/// A per-pass node change record.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeChange {
    /// Slot index of the node that changed.
    pub node_index: u32,
    /// Which field changed.
    pub field: NodeField,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the display list.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called at the beginning of a pass.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a pass.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called with the summary of an update pass.
    fn on_update(&mut self, e: &UpdateEvent) {
        _ = e;
    }

    /// Called with the result of a hit test.
    fn on_hit_test(&mut self, e: &HitTestEvent) {
        _ = e;
    }

    /// Called with per-pass node changes (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_node_changes(&mut self, pass_index: u64, changes: &[NodeChange]) {
        _ = (pass_index, changes);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`UpdateEvent`].
    #[inline]
    pub fn update(&mut self, e: &UpdateEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_update(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`HitTestEvent`].
    #[inline]
    pub fn hit_test(&mut self, e: &HitTestEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_hit_test(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits node changes (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn node_changes(&mut self, pass_index: u64, changes: &[NodeChange]) {
        if let Some(s) = &mut self.sink {
            s.on_node_changes(pass_index, changes);
        }
    }

    /// Returns `true` if events reach a sink.
    ///
    /// Lets callers skip building expensive payloads when nobody listens.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_phase_begin(&PhaseBeginEvent {
            pass_index: 0,
            phase: PhaseKind::Update,
        });
        sink.on_update(&UpdateEvent::default());
        sink.on_hit_test(&HitTestEvent {
            stage_x: 1.0,
            stage_y: 2.0,
            result: None,
            visited: 0,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        assert!(!tracer.is_active());
        tracer.phase_begin(&PhaseBeginEvent {
            pass_index: 1,
            phase: PhaseKind::HitTest,
        });
        tracer.update(&UpdateEvent::default());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            passes: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_update(&mut self, e: &UpdateEvent) {
                self.passes.push(e.pass_index);
            }
        }

        let mut sink = RecordingSink { passes: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        assert!(tracer.is_active());
        tracer.update(&UpdateEvent {
            pass_index: 42,
            ..UpdateEvent::default()
        });
        drop(tracer);
        assert_eq!(sink.passes, &[42]);
    }
}
