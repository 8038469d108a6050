//! # Per-Record Step
//!
//! The animation state machine. A pure function of one record and the tick
//! timestamp: it never reads a definition, another record, or any shared
//! mutable object.
//!
//! The step only decides THAT a transition happened and which index is now
//! current. Refilling the deadline with the new frame's duration (or the gap
//! to the following event) is the apply pass's job, because that needs the
//! definition.
//!
//! At most one frame transition and one event are produced per tick. A long
//! tick leaves the deadline negative, so the following ticks keep stepping
//! until the timeline has caught up.

use crate::definition::AnimationStyle;
use crate::state::AnimatorState;

/// What a single step decided.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Step {
    /// New current frame, if the frame changed.
    pub frame: Option<u16>,
    /// Index of the event that fired, if one did.
    pub event: Option<u16>,
}

impl Step {
    /// Returns `true` if nothing happened.
    #[inline]
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.frame.is_none() && self.event.is_none()
    }
}

/// Advances one record to `now`.
///
/// 1. Non-live slots are skipped.
/// 2. First observation only records `now` (no huge bootstrap interval).
/// 3. Paused records are left untouched, `last_update` included. The first
///    tick after resume subtracts the whole interval since the last unpaused
///    tick.
/// 4. Both deadlines are decreased by the elapsed time, then the frame rule
///    and the event rule run independently.
///
/// # Panics
///
/// Panics if the record carries an unknown style code. That can only
/// happen through a programming error.
pub fn step(record: &mut AnimatorState, now: f64) -> Step {
    if !record.is_live() {
        return Step::default();
    }

    if !record.has_started() {
        record.last_update = now;
        return Step::default();
    }
    if record.is_paused() {
        return Step::default();
    }

    let Some(style) = record.style() else {
        panic!(
            "animator record carries unknown style code {} (generation {})",
            record.style, record.generation
        );
    };

    let elapsed = now - record.last_update;
    record.next_frame_deadline -= elapsed;
    record.next_event_deadline -= elapsed;

    let mut result = Step::default();
    if record.next_frame_deadline < 0.0 {
        result.frame = next_frame(record, style);
    }
    // Empty event lists keep the deadline at +inf, so this never fires for them.
    if record.next_event_deadline < 0.0 {
        result.event = fire_event(record, style);
    }

    record.last_update = now;
    result
}

/// Frame transition rule.
fn next_frame(record: &mut AnimatorState, style: AnimationStyle) -> Option<u16> {
    let current = record.current_frame;
    let next = match style {
        AnimationStyle::Loop => {
            if current >= record.max_frame {
                record.loop_start
            } else {
                current + 1
            }
        }
        AnimationStyle::YoYo => {
            // A one-frame bounce range has nowhere to go.
            if record.loop_start >= record.max_frame {
                return None;
            }
            if record.is_backwards() {
                if current <= record.loop_start {
                    record.set_backwards(false);
                    current + 1
                } else {
                    current - 1
                }
            } else if current >= record.max_frame {
                record.set_backwards(true);
                current - 1
            } else {
                current + 1
            }
        }
        AnimationStyle::OneShot => {
            if current >= record.max_frame {
                return None;
            }
            current + 1
        }
    };

    record.current_frame = next;
    Some(next)
}

/// Event transition rule. Returns the index of the event that fired.
fn fire_event(record: &mut AnimatorState, style: AnimationStyle) -> Option<u16> {
    let fired = record.next_event;
    match style {
        AnimationStyle::Loop | AnimationStyle::YoYo => {
            record.next_event = if fired >= record.max_event { 0 } else { fired + 1 };
        }
        AnimationStyle::OneShot => {
            if fired >= record.max_event {
                // Terminal: the last index is never emitted.
                record.next_event_deadline = f64::INFINITY;
                return None;
            }
            record.next_event = fired + 1;
        }
    }
    Some(fired)
}
