//! # Animation Definitions
//!
//! Immutable, pre-authored timelines: ordered frames, ordered timed events,
//! a playback style and loop bounds.
//!
//! Every accessor returns a sentinel instead of failing on an out-of-range
//! index. Callers must check.

use serde::{Deserialize, Serialize};

use super::callbacks::{CallbackTable, EventCallback};
use crate::handle::AnimatorHandle;

/// Opaque reference to a visual (sprite, texture region, glyph...).
///
/// Resolved by the renderer, never by the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisualId(pub u32);

/// One frame of a timeline.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// The visual shown while this frame is current.
    pub visual: VisualId,
    /// How long the frame stays on screen, in seconds.
    pub duration: f64,
}

/// A named event at an absolute time from the start of the timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationEvent {
    /// Event name, used for lookup and subscription.
    pub name: String,
    /// Seconds from the start of the timeline.
    pub time: f64,
}

/// How the frame index moves once it reaches the end of the timeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationStyle {
    /// Wrap from the last frame back to the loop start.
    #[default]
    Loop,
    /// Bounce between the loop start and the last frame.
    YoYo,
    /// Advance to the last frame, then hold it forever.
    OneShot,
}

impl AnimationStyle {
    /// Stable code stored in plain-data records.
    #[inline]
    #[must_use]
    pub const fn as_raw(self) -> u8 {
        match self {
            Self::Loop => 0,
            Self::YoYo => 1,
            Self::OneShot => 2,
        }
    }

    /// Decodes a stored style code.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Loop),
            1 => Some(Self::YoYo),
            2 => Some(Self::OneShot),
            _ => None,
        }
    }
}

/// An immutable animation timeline.
///
/// Shared between animators as `Arc<AnimationDefinition>`. Only the callback
/// table has interior mutability; the timeline itself never changes after
/// construction.
///
/// # Example
///
/// ```rust,ignore
/// let walk = AnimationDefinition::builder(AnimationStyle::Loop)
///     .frame(VisualId(10), 0.1)
///     .frame(VisualId(11), 0.1)
///     .event("footstep", 0.05)
///     .build();
/// ```
#[derive(Debug, Deserialize)]
#[serde(from = "DefinitionAsset")]
pub struct AnimationDefinition {
    frames: Vec<Frame>,
    events: Vec<AnimationEvent>,
    style: AnimationStyle,
    loop_start_frame: u16,
    loop_end_frame: Option<u16>,
    starting_frame: u16,
    callbacks: CallbackTable,
}

/// On-disk shape of a definition.
#[derive(Deserialize)]
struct DefinitionAsset {
    #[serde(default)]
    style: AnimationStyle,
    #[serde(default)]
    frames: Vec<Frame>,
    #[serde(default)]
    events: Vec<AnimationEvent>,
    #[serde(default)]
    loop_start_frame: u16,
    #[serde(default)]
    loop_end_frame: Option<u16>,
    #[serde(default)]
    starting_frame: u16,
}

impl From<DefinitionAsset> for AnimationDefinition {
    fn from(asset: DefinitionAsset) -> Self {
        let mut builder = DefinitionBuilder::new(asset.style)
            .loop_start(asset.loop_start_frame)
            .starting_frame(asset.starting_frame);
        builder.frames = asset.frames;
        builder.events = asset.events;
        builder.loop_end = asset.loop_end_frame;
        builder.build()
    }
}

impl AnimationDefinition {
    /// Starts building a definition with the given style.
    #[must_use]
    pub fn builder(style: AnimationStyle) -> DefinitionBuilder {
        DefinitionBuilder::new(style)
    }

    /// Parses a definition from TOML.
    ///
    /// ```toml
    /// style = "yoyo"
    /// loop_start_frame = 1
    /// frames = [
    ///     { visual = 10, duration = 0.1 },
    ///     { visual = 11, duration = 0.2 },
    /// ]
    /// events = [{ name = "swing", time = 0.15 }]
    /// ```
    ///
    /// # Errors
    ///
    /// Returns the TOML error if the text is malformed or mistyped.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    // =========================================================================
    // Shape
    // =========================================================================

    /// Playback style.
    #[inline]
    #[must_use]
    pub const fn style(&self) -> AnimationStyle {
        self.style
    }

    /// Frame the loop (or bounce) returns to.
    #[inline]
    #[must_use]
    pub const fn loop_start_frame(&self) -> u16 {
        self.loop_start_frame
    }

    /// Authored loop end, if any. Only meaningful for [`AnimationStyle::Loop`].
    #[inline]
    #[must_use]
    pub const fn loop_end_frame(&self) -> Option<u16> {
        self.loop_end_frame
    }

    /// Frame an animator starts on after registration.
    #[inline]
    #[must_use]
    pub const fn starting_frame(&self) -> u16 {
        self.starting_frame
    }

    /// Number of frames.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Number of events.
    #[inline]
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Index of the last frame, 0 for an empty timeline.
    #[inline]
    #[must_use]
    pub fn max_frame_index(&self) -> u16 {
        last_index(self.frames.len())
    }

    /// Index of the last event, 0 when there are no events.
    #[inline]
    #[must_use]
    pub fn max_event_index(&self) -> u16 {
        last_index(self.events.len())
    }

    /// Index at which a [`AnimationStyle::Loop`] timeline wraps.
    ///
    /// The authored loop end clamped to the last frame; the last frame for
    /// every other style.
    #[must_use]
    pub fn wrap_frame_index(&self) -> u16 {
        let max = self.max_frame_index();
        match (self.style, self.loop_end_frame) {
            (AnimationStyle::Loop, Some(end)) => end.min(max),
            _ => max,
        }
    }

    // =========================================================================
    // Frames
    // =========================================================================

    /// Frame at `index`, `None` out of range.
    #[inline]
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Visual of frame `index`, `None` out of range.
    #[inline]
    #[must_use]
    pub fn visual(&self, index: usize) -> Option<VisualId> {
        self.frames.get(index).map(|f| f.visual)
    }

    /// Duration of frame `index`, `0.0` out of range.
    #[inline]
    #[must_use]
    pub fn frame_duration(&self, index: usize) -> f64 {
        self.frames.get(index).map_or(0.0, |f| f.duration)
    }

    /// Time at which frame `index` starts, measured from frame 0.
    ///
    /// `0.0` out of range.
    #[must_use]
    pub fn frame_time_from_start(&self, index: usize) -> f64 {
        if index >= self.frames.len() {
            return 0.0;
        }
        self.frames[..index].iter().map(|f| f.duration).sum()
    }

    /// Sum of every frame duration.
    #[must_use]
    pub fn total_duration(&self) -> f64 {
        self.frames.iter().map(|f| f.duration).sum()
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Event at `index`, `None` out of range.
    #[inline]
    #[must_use]
    pub fn event(&self, index: usize) -> Option<&AnimationEvent> {
        self.events.get(index)
    }

    /// First event called `name`, with its index.
    #[must_use]
    pub fn event_by_name(&self, name: &str) -> Option<(usize, &AnimationEvent)> {
        self.events.iter().enumerate().find(|(_, e)| e.name == name)
    }

    /// Absolute time of event `index`.
    ///
    /// `+inf` when the timeline has no events, `-1.0` out of range.
    #[must_use]
    pub fn event_time(&self, index: usize) -> f64 {
        if self.events.is_empty() {
            return f64::INFINITY;
        }
        self.events.get(index).map_or(-1.0, |e| e.time)
    }

    /// Length of one pass over the event timeline.
    ///
    /// The event timeline repeats independently of the frame loop, with a
    /// period of the total frame duration (or the last event time, if later).
    #[must_use]
    pub fn event_period(&self) -> f64 {
        let last = self.events.last().map_or(0.0, |e| e.time);
        self.total_duration().max(last)
    }

    /// First event at or after `time`, on the unrolled timeline.
    ///
    /// If every event lies before `time`, the first event of the next pass is
    /// returned with its time shifted by one [`event_period`](Self::event_period).
    #[must_use]
    pub fn next_event_at_or_after(&self, time: f64) -> Option<(usize, f64)> {
        self.next_event_from(|t| t >= time)
    }

    /// First event strictly after the start of `frame`, on the unrolled
    /// timeline (see [`next_event_at_or_after`](Self::next_event_at_or_after)).
    ///
    /// `None` when there are no events or the frame is out of range. Frame 0
    /// is always in range so event-only timelines still resolve.
    #[must_use]
    pub fn next_event_after_frame(&self, frame: usize) -> Option<(usize, f64)> {
        if frame != 0 && frame >= self.frames.len() {
            return None;
        }
        let frame_time = self.frame_time_from_start(frame);
        self.next_event_from(|t| t > frame_time)
    }

    /// Time of [`next_event_after_frame`](Self::next_event_after_frame).
    ///
    /// `+inf` when the timeline has no events, `-1.0` for an out-of-range
    /// frame.
    #[must_use]
    pub fn next_event_time_after_frame(&self, frame: usize) -> f64 {
        if self.events.is_empty() {
            return f64::INFINITY;
        }
        self.next_event_after_frame(frame).map_or(-1.0, |(_, t)| t)
    }

    /// Seconds between event `fired` and the event that follows it.
    ///
    /// After the last event this wraps through the end of the period to the
    /// first event. `+inf` when there are no events or `fired` is out of
    /// range, so an expired deadline is never refilled with garbage.
    #[must_use]
    pub fn event_interval_after(&self, fired: usize) -> f64 {
        let Some(current) = self.events.get(fired) else {
            return f64::INFINITY;
        };
        match self.events.get(fired + 1) {
            Some(next) => next.time - current.time,
            None => (self.event_period() - current.time) + self.events[0].time,
        }
    }

    fn next_event_from(&self, accept: impl Fn(f64) -> bool) -> Option<(usize, f64)> {
        let first = self.events.first()?;
        let found = self
            .events
            .iter()
            .enumerate()
            .find(|(_, e)| accept(e.time))
            .map(|(i, e)| (i, e.time));
        Some(found.unwrap_or((0, self.event_period() + first.time)))
    }

    // =========================================================================
    // Callbacks
    // =========================================================================

    /// Adds a listener to event `index`. `false` out of range.
    pub fn subscribe(&self, index: usize, callback: EventCallback) -> bool {
        self.callbacks.subscribe(index, callback)
    }

    /// Adds a listener to the first event called `name`. `false` if absent.
    pub fn subscribe_by_name(&self, name: &str, callback: EventCallback) -> bool {
        match self.event_by_name(name) {
            Some((index, _)) => self.callbacks.subscribe(index, callback),
            None => false,
        }
    }

    /// Invokes every listener of event `index` on behalf of `handle`.
    ///
    /// `false` out of range.
    pub fn invoke_event(&self, index: usize, handle: AnimatorHandle) -> bool {
        self.callbacks.invoke(index, handle)
    }

    /// The listener table.
    #[inline]
    #[must_use]
    pub fn callbacks(&self) -> &CallbackTable {
        &self.callbacks
    }
}

/// Highest valid index for a list of `len` items, saturating into `u16`.
fn last_index(len: usize) -> u16 {
    u16::try_from(len.saturating_sub(1)).unwrap_or(u16::MAX)
}

/// Builder for [`AnimationDefinition`].
///
/// Events are kept in time order and negative durations/times are clamped
/// to zero when the definition is built.
#[derive(Debug, Clone)]
#[must_use]
pub struct DefinitionBuilder {
    style: AnimationStyle,
    frames: Vec<Frame>,
    events: Vec<AnimationEvent>,
    loop_start: u16,
    loop_end: Option<u16>,
    starting_frame: u16,
}

impl DefinitionBuilder {
    /// Starts an empty timeline.
    pub fn new(style: AnimationStyle) -> Self {
        Self {
            style,
            frames: Vec::new(),
            events: Vec::new(),
            loop_start: 0,
            loop_end: None,
            starting_frame: 0,
        }
    }

    /// Appends a frame.
    pub fn frame(mut self, visual: VisualId, duration: f64) -> Self {
        self.frames.push(Frame { visual, duration });
        self
    }

    /// Appends one frame per `(visual, duration)` pair.
    pub fn frames(mut self, frames: impl IntoIterator<Item = (VisualId, f64)>) -> Self {
        self.frames
            .extend(frames.into_iter().map(|(visual, duration)| Frame { visual, duration }));
        self
    }

    /// Adds an event at `time` seconds from the start.
    pub fn event(mut self, name: impl Into<String>, time: f64) -> Self {
        self.events.push(AnimationEvent {
            name: name.into(),
            time,
        });
        self
    }

    /// Sets the loop start frame.
    pub fn loop_start(mut self, frame: u16) -> Self {
        self.loop_start = frame;
        self
    }

    /// Sets the loop end frame (Loop style only).
    pub fn loop_end(mut self, frame: u16) -> Self {
        self.loop_end = Some(frame);
        self
    }

    /// Sets the frame animators start on.
    pub fn starting_frame(mut self, frame: u16) -> Self {
        self.starting_frame = frame;
        self
    }

    /// Finishes the definition.
    #[must_use]
    pub fn build(mut self) -> AnimationDefinition {
        for frame in &mut self.frames {
            frame.duration = frame.duration.max(0.0);
        }
        for event in &mut self.events {
            event.time = event.time.max(0.0);
        }
        self.events.sort_by(|a, b| a.time.total_cmp(&b.time));

        let callbacks = CallbackTable::with_events(self.events.len());
        AnimationDefinition {
            frames: self.frames,
            events: self.events,
            style: self.style,
            loop_start_frame: self.loop_start,
            loop_end_frame: self.loop_end,
            starting_frame: self.starting_frame,
            callbacks,
        }
    }
}
