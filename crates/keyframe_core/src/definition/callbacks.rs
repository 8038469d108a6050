//! # Event Callback Table
//!
//! Listeners registered per event index, invoked explicitly by index.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::handle::AnimatorHandle;

/// A listener for a timed animation event.
///
/// Receives the handle of the animator whose timeline fired the event.
pub type EventCallback = Arc<dyn Fn(AnimatorHandle) + Send + Sync>;

/// Listener lists, one per event index.
///
/// Listeners may be added at any time, including from inside a callback:
/// invocation snapshots the list before calling out, so the lock is never
/// held across user code.
#[derive(Default)]
pub struct CallbackTable {
    slots: RwLock<Vec<Vec<EventCallback>>>,
}

impl CallbackTable {
    /// Creates a table with `event_count` empty listener lists.
    #[must_use]
    pub fn with_events(event_count: usize) -> Self {
        Self {
            slots: RwLock::new(vec![Vec::new(); event_count]),
        }
    }

    /// Returns the number of event slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    /// Returns `true` if the table has no event slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    /// Adds a listener to event `index`.
    ///
    /// Returns `false` if the index is out of range.
    pub fn subscribe(&self, index: usize, callback: EventCallback) -> bool {
        let mut slots = self.slots.write();
        match slots.get_mut(index) {
            Some(listeners) => {
                listeners.push(callback);
                true
            }
            None => false,
        }
    }

    /// Removes every listener from event `index`.
    ///
    /// Returns the number of listeners removed.
    pub fn clear(&self, index: usize) -> usize {
        let mut slots = self.slots.write();
        slots.get_mut(index).map_or(0, |listeners| {
            let removed = listeners.len();
            listeners.clear();
            removed
        })
    }

    /// Returns the number of listeners on event `index` (0 out of range).
    #[must_use]
    pub fn listener_count(&self, index: usize) -> usize {
        self.slots.read().get(index).map_or(0, Vec::len)
    }

    /// Calls every listener of event `index` in subscription order.
    ///
    /// Returns `false` if the index is out of range.
    pub fn invoke(&self, index: usize, handle: AnimatorHandle) -> bool {
        let snapshot = {
            let slots = self.slots.read();
            match slots.get(index) {
                Some(listeners) => listeners.clone(),
                None => return false,
            }
        };

        for callback in &snapshot {
            callback(handle);
        }
        true
    }
}

impl fmt::Debug for CallbackTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<usize> = self.slots.read().iter().map(Vec::len).collect();
        f.debug_struct("CallbackTable")
            .field("listeners", &counts)
            .finish()
    }
}
