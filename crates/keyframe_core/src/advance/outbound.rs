//! # Outbound Notifications
//!
//! Change notifications produced by the advance pass.
//!
//! ```text
//! ┌─────────────┐      ┌─────────────┐      ┌─────────────┐
//! │  Advance    │─────>│  Outbound   │─────>│   Apply     │
//! │ (N workers) │      │  Channels   │      │ (1 thread)  │
//! └─────────────┘      └─────────────┘      └─────────────┘
//! ```
//!
//! Multiple producers, single consumer. Uses crossbeam channels so workers
//! never contend on a lock.

use crossbeam_channel::{unbounded, Receiver, Sender, TryIter};

use crate::handle::AnimatorHandle;

/// The frame of an animator changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameChanged {
    /// Slot of the animator in the state table.
    pub slot: u32,
    /// Generation of the record that produced the notification.
    pub generation: u32,
    /// The frame that is now current.
    pub frame: u16,
}

impl FrameChanged {
    /// Handle of the animator the notification was produced for.
    #[inline]
    #[must_use]
    pub const fn handle(&self) -> AnimatorHandle {
        AnimatorHandle::new(self.slot, self.generation)
    }
}

/// A timed event of an animator fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventFired {
    /// Slot of the animator in the state table.
    pub slot: u32,
    /// Generation of the record that produced the notification.
    pub generation: u32,
    /// Index of the event that fired.
    pub event: u16,
}

impl EventFired {
    /// Handle of the animator the notification was produced for.
    #[inline]
    #[must_use]
    pub const fn handle(&self) -> AnimatorHandle {
        AnimatorHandle::new(self.slot, self.generation)
    }
}

/// Owner of both notification queues.
///
/// Holds the receiving ends; hands out [`OutboundWriter`]s to producers.
pub struct Outbound {
    frames_tx: Sender<FrameChanged>,
    frames_rx: Receiver<FrameChanged>,
    events_tx: Sender<EventFired>,
    events_rx: Receiver<EventFired>,
}

impl Outbound {
    /// Creates empty, unbounded queues.
    #[must_use]
    pub fn new() -> Self {
        let (frames_tx, frames_rx) = unbounded();
        let (events_tx, events_rx) = unbounded();
        Self {
            frames_tx,
            frames_rx,
            events_tx,
            events_rx,
        }
    }

    /// Creates a producer handle (clone for multiple producers).
    #[must_use]
    pub fn writer(&self) -> OutboundWriter {
        OutboundWriter {
            frames: self.frames_tx.clone(),
            events: self.events_tx.clone(),
        }
    }

    /// Drains queued frame notifications in arrival order.
    pub fn drain_frames(&self) -> TryIter<'_, FrameChanged> {
        self.frames_rx.try_iter()
    }

    /// Drains queued event notifications in arrival order.
    pub fn drain_events(&self) -> TryIter<'_, EventFired> {
        self.events_rx.try_iter()
    }

    /// Number of notifications waiting in both queues.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.frames_rx.len() + self.events_rx.len()
    }
}

impl Default for Outbound {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer side of the outbound queues. `Send + Sync`, cheap to clone.
#[derive(Clone)]
pub struct OutboundWriter {
    frames: Sender<FrameChanged>,
    events: Sender<EventFired>,
}

impl OutboundWriter {
    /// Queues a frame notification.
    ///
    /// Returns `false` if the consumer is gone.
    #[inline]
    pub fn frame_changed(&self, notification: FrameChanged) -> bool {
        self.frames.send(notification).is_ok()
    }

    /// Queues an event notification.
    ///
    /// Returns `false` if the consumer is gone.
    #[inline]
    pub fn event_fired(&self, notification: EventFired) -> bool {
        self.events.send(notification).is_ok()
    }
}
