//! # KEYFRAME Core
//!
//! Data plane of the keyframe animation scheduler:
//! - Generational animator handles and a recycling handle pool
//! - Immutable animation definitions with an indexed callback table
//! - A dense table of plain-data runtime records
//! - The advance pass: a pure per-record step fanned out with rayon
//!
//! ## Architecture Rules
//!
//! 1. **No shared reads in the parallel window** - Records carry every
//!    definition-derived value the step needs
//! 2. **Notifications, not effects** - The advance pass only queues what
//!    changed; visuals and callbacks are applied later on one thread
//! 3. **Dense by identity** - The handle index is the table slot
//!
//! ## Example
//!
//! ```rust,ignore
//! use keyframe_core::{advance_all, AnimatorState, Outbound, StateTable};
//!
//! let outbound = Outbound::new();
//! let mut table = StateTable::with_capacity(10_000);
//! // ... register records ...
//! advance_all(table.as_mut_slice(), now, &outbound.writer(), 256);
//! for changed in outbound.drain_frames() { /* apply */ }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod advance;
pub mod definition;
pub mod handle;
pub mod state;

pub use advance::{
    advance_all, advance_all_sequential, advance_record, step, AdvanceStats, EventFired,
    FrameChanged, Outbound, OutboundWriter, Step,
};
pub use definition::{
    AnimationDefinition, AnimationEvent, AnimationStyle, CallbackTable, DefinitionBuilder,
    EventCallback, Frame, VisualId,
};
pub use handle::{AnimatorHandle, HandlePool};
pub use state::{AnimatorState, StateTable, NEVER_UPDATED};
