//! # Frame Sink
//!
//! Where the apply pass sends visual assignments. A renderer implements
//! [`FrameSink`]; the scheduler never draws anything itself.

use keyframe_core::{AnimatorHandle, VisualId};

/// Receives the visual each animator should now display.
pub trait FrameSink {
    /// Shows `visual` on the object behind `handle`.
    ///
    /// `None` means the definition has no frame at that index; the object
    /// should show nothing.
    fn assign_frame(&mut self, handle: AnimatorHandle, visual: Option<VisualId>);
}

/// Discards every assignment.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    #[inline]
    fn assign_frame(&mut self, _handle: AnimatorHandle, _visual: Option<VisualId>) {}
}

/// Keeps every assignment in arrival order.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    assignments: Vec<(AnimatorHandle, Option<VisualId>)>,
}

impl RecordingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All assignments so far.
    #[must_use]
    pub fn assignments(&self) -> &[(AnimatorHandle, Option<VisualId>)] {
        &self.assignments
    }

    /// Most recent visual assigned to `handle`.
    #[must_use]
    pub fn last_for(&self, handle: AnimatorHandle) -> Option<Option<VisualId>> {
        self.assignments
            .iter()
            .rev()
            .find(|(h, _)| *h == handle)
            .map(|(_, visual)| *visual)
    }

    /// Takes all assignments, leaving the sink empty.
    pub fn take(&mut self) -> Vec<(AnimatorHandle, Option<VisualId>)> {
        std::mem::take(&mut self.assignments)
    }
}

impl FrameSink for RecordingSink {
    fn assign_frame(&mut self, handle: AnimatorHandle, visual: Option<VisualId>) {
        self.assignments.push((handle, visual));
    }
}
