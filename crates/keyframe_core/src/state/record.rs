//! # Animator Runtime Record
//!
//! One plain-data record per live animator: the unit of parallel work.
//! Records carry no references, so the advance pass can run over a slice of
//! them with no access to definitions or any other shared object.

use bytemuck::{Pod, Zeroable};

use crate::definition::{AnimationDefinition, AnimationStyle};

/// `last_update` value of a record that has never been observed by a tick.
pub const NEVER_UPDATED: f64 = -1.0;

/// Runtime state of one animator.
///
/// Everything the advance pass needs from the definition (frame bounds,
/// loop start, event count, style) is denormalized in here at registration.
///
/// # Layout
///
/// `#[repr(C)]` with no padding: 40 bytes.
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct AnimatorState {
    /// Tick timestamp of the last observation, [`NEVER_UPDATED`] initially.
    pub last_update: f64,
    /// Seconds until the next frame transition.
    pub next_frame_deadline: f64,
    /// Seconds until the next event fires.
    pub next_event_deadline: f64,
    /// Generation of the handle that registered this record.
    pub generation: u32,
    /// Index of the frame currently shown.
    pub current_frame: u16,
    /// Highest frame index reachable by the frame rule.
    pub max_frame: u16,
    /// Frame a loop wraps to, or the lower bounce bound.
    pub loop_start: u16,
    /// Index of the next event to fire.
    pub next_event: u16,
    /// Index of the last event.
    pub max_event: u16,
    /// Raw [`AnimationStyle`] code.
    pub style: u8,
    /// `FLAG_*` bits.
    pub flags: u8,
}

impl AnimatorState {
    /// The slot holds a registered animator.
    pub const FLAG_LIVE: u8 = 1 << 0;
    /// The animator is paused.
    pub const FLAG_PAUSED: u8 = 1 << 1;
    /// YoYo is currently moving backwards.
    pub const FLAG_BACKWARDS: u8 = 1 << 2;

    /// An empty, non-live slot.
    pub const EMPTY: Self = Self {
        last_update: NEVER_UPDATED,
        next_frame_deadline: f64::INFINITY,
        next_event_deadline: f64::INFINITY,
        generation: 0,
        current_frame: 0,
        max_frame: 0,
        loop_start: 0,
        next_event: 0,
        max_event: 0,
        style: 0,
        flags: 0,
    };

    /// Builds a freshly registered record.
    ///
    /// - Frame deadline: duration of the start frame (`+inf` with no frames)
    /// - Event: first event at or after the start frame's start time, wrapping
    ///   to the next pass if none follows (`+inf` with no events)
    #[must_use]
    pub fn registered(generation: u32, definition: &AnimationDefinition, start_frame: u16) -> Self {
        let upper = definition.wrap_frame_index();
        let start = start_frame.min(definition.max_frame_index());
        let start_time = definition.frame_time_from_start(usize::from(start));

        let next_frame_deadline = if definition.frame_count() == 0 {
            f64::INFINITY
        } else {
            definition.frame_duration(usize::from(start))
        };

        let (next_event, next_event_deadline) = definition
            .next_event_at_or_after(start_time)
            .map_or((0, f64::INFINITY), |(index, time)| {
                (event_index(index), time - start_time)
            });

        Self {
            last_update: NEVER_UPDATED,
            next_frame_deadline,
            next_event_deadline,
            generation,
            current_frame: start,
            max_frame: upper,
            loop_start: definition.loop_start_frame().min(upper),
            next_event,
            max_event: definition.max_event_index(),
            style: definition.style().as_raw(),
            flags: Self::FLAG_LIVE,
        }
    }

    /// Re-targets the record at a new definition without restarting it.
    ///
    /// The in-flight frame timing is kept. The event timeline is realigned:
    /// the deadline becomes the time of the first event after the current
    /// frame in `definition`, minus the time left on the current frame.
    pub fn resync(&mut self, definition: &AnimationDefinition) {
        if self.current_frame > definition.max_frame_index() {
            self.current_frame = 0;
        }

        let upper = definition.wrap_frame_index();
        self.max_frame = upper;
        self.loop_start = definition.loop_start_frame().min(upper);
        self.max_event = definition.max_event_index();
        self.style = definition.style().as_raw();
        if definition.style() != AnimationStyle::YoYo {
            self.set_backwards(false);
        }

        if self.next_frame_deadline.is_infinite() && definition.frame_count() > 0 {
            self.next_frame_deadline = definition.frame_duration(usize::from(self.current_frame));
        }

        match definition.next_event_after_frame(usize::from(self.current_frame)) {
            Some((index, time)) => {
                self.next_event = event_index(index);
                self.next_event_deadline = time - self.next_frame_deadline;
            }
            None => {
                self.next_event = 0;
                self.next_event_deadline = f64::INFINITY;
            }
        }
    }

    /// Decoded style, `None` if the raw code is unknown.
    #[inline]
    #[must_use]
    pub const fn style(&self) -> Option<AnimationStyle> {
        AnimationStyle::from_raw(self.style)
    }

    /// Whether the slot holds a registered animator.
    #[inline]
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.flags & Self::FLAG_LIVE != 0
    }

    /// Whether the animator is paused.
    #[inline]
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.flags & Self::FLAG_PAUSED != 0
    }

    /// Whether a YoYo animator is moving backwards.
    #[inline]
    #[must_use]
    pub const fn is_backwards(&self) -> bool {
        self.flags & Self::FLAG_BACKWARDS != 0
    }

    /// Whether the record has been observed by at least one tick.
    #[inline]
    #[must_use]
    pub fn has_started(&self) -> bool {
        self.last_update >= 0.0
    }

    /// Sets or clears the paused flag.
    #[inline]
    pub fn set_paused(&mut self, paused: bool) {
        self.set_flag(Self::FLAG_PAUSED, paused);
    }

    /// Sets or clears the backwards flag.
    #[inline]
    pub fn set_backwards(&mut self, backwards: bool) {
        self.set_flag(Self::FLAG_BACKWARDS, backwards);
    }

    /// Marks the slot dead and paused. The generation is kept so late
    /// notifications can still be recognised as stale.
    #[inline]
    pub fn retire(&mut self) {
        self.set_flag(Self::FLAG_PAUSED, true);
        self.set_flag(Self::FLAG_LIVE, false);
    }

    #[inline]
    fn set_flag(&mut self, flag: u8, on: bool) {
        if on {
            self.flags |= flag;
        } else {
            self.flags &= !flag;
        }
    }
}

impl Default for AnimatorState {
    fn default() -> Self {
        Self::EMPTY
    }
}

fn event_index(index: usize) -> u16 {
    u16::try_from(index).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::VisualId;

    fn def(style: AnimationStyle) -> AnimationDefinition {
        AnimationDefinition::builder(style)
            .frame(VisualId(1), 0.1)
            .frame(VisualId(2), 0.2)
            .frame(VisualId(3), 0.3)
            .event("early", 0.05)
            .event("late", 0.45)
            .loop_start(1)
            .build()
    }

    #[test]
    fn test_record_layout() {
        assert_eq!(std::mem::size_of::<AnimatorState>(), 40);
    }

    #[test]
    fn test_registered_from_start() {
        let record = AnimatorState::registered(7, &def(AnimationStyle::Loop), 0);
        assert!(record.is_live());
        assert!(!record.is_paused());
        assert!(!record.has_started());
        assert_eq!(record.generation, 7);
        assert_eq!(record.max_frame, 2);
        assert_eq!(record.loop_start, 1);
        assert_eq!(record.max_event, 1);
        assert_eq!(record.style(), Some(AnimationStyle::Loop));
        assert!((record.next_frame_deadline - 0.1).abs() < 1e-12);
        assert_eq!(record.next_event, 0);
        assert!((record.next_event_deadline - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_registered_mid_timeline() {
        // Frame 2 starts at 0.3; next event is "late" at 0.45.
        let record = AnimatorState::registered(0, &def(AnimationStyle::Loop), 2);
        assert_eq!(record.current_frame, 2);
        assert!((record.next_frame_deadline - 0.3).abs() < 1e-12);
        assert_eq!(record.next_event, 1);
        assert!((record.next_event_deadline - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_registered_clamps_start_frame() {
        let record = AnimatorState::registered(0, &def(AnimationStyle::OneShot), 40);
        assert_eq!(record.current_frame, 2);
    }

    #[test]
    fn test_registered_without_events_or_frames() {
        let empty = AnimationDefinition::builder(AnimationStyle::Loop).build();
        let record = AnimatorState::registered(0, &empty, 0);
        assert!(record.next_frame_deadline.is_infinite());
        assert!(record.next_event_deadline.is_infinite());
    }

    #[test]
    fn test_resync_realigns_events() {
        let mut record = AnimatorState::registered(0, &def(AnimationStyle::Loop), 1);
        record.next_frame_deadline = 0.12;
        record.set_backwards(true);

        let other = AnimationDefinition::builder(AnimationStyle::OneShot)
            .frame(VisualId(9), 0.1)
            .frame(VisualId(9), 0.1)
            .frame(VisualId(9), 0.1)
            .event("x", 0.05)
            .event("y", 0.25)
            .build();
        record.resync(&other);

        // Frame 1 starts at 0.1 in `other`; next event after it is "y" at 0.25.
        assert_eq!(record.next_event, 1);
        assert!((record.next_event_deadline - (0.25 - 0.12)).abs() < 1e-12);
        assert!((record.next_frame_deadline - 0.12).abs() < 1e-12);
        assert_eq!(record.style(), Some(AnimationStyle::OneShot));
        assert!(!record.is_backwards());
    }

    #[test]
    fn test_resync_resets_out_of_range_frame() {
        let mut record = AnimatorState::registered(0, &def(AnimationStyle::Loop), 2);
        let short = AnimationDefinition::builder(AnimationStyle::Loop)
            .frame(VisualId(1), 0.5)
            .build();
        record.resync(&short);
        assert_eq!(record.current_frame, 0);
        assert_eq!(record.max_frame, 0);
        assert!(record.next_event_deadline.is_infinite());
    }

    #[test]
    fn test_retire() {
        let mut record = AnimatorState::registered(3, &def(AnimationStyle::YoYo), 0);
        record.retire();
        assert!(!record.is_live());
        assert!(record.is_paused());
        assert_eq!(record.generation, 3);
    }

    #[test]
    fn test_unknown_style_code() {
        let mut record = AnimatorState::EMPTY;
        record.style = 99;
        assert_eq!(record.style(), None);
    }
}
