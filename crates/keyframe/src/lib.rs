//! # KEYFRAME
//!
//! Parallel keyframe animation scheduler.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌─────────────────┐  commands   ┌─────────────────┐                    │
//! │  │    Animator     │────────────>│    Scheduler    │                    │
//! │  │   (per object)  │  (gateway)  │                 │                    │
//! │  └─────────────────┘<────────────│  • Advance (N)  │──> FrameSink       │
//! │                      handles     │  • Apply   (1)  │──> callbacks       │
//! │                                  └────────┬────────┘                    │
//! │                                           │                             │
//! │                                  ┌────────┴────────┐                    │
//! │                                  │  keyframe_core  │                    │
//! │                                  │  • State table  │                    │
//! │                                  │  • Definitions  │                    │
//! │                                  └─────────────────┘                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `scheduler`: Tick driver and apply pass
//! - `gateway`: Lifecycle-tolerant request routing and handle ownership
//! - `animator`: Per-object component
//! - `commands`: Queues between gateway and scheduler

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod animator;
pub mod clock;
pub mod commands;
pub mod config;
pub mod error;
pub mod gateway;
pub mod scheduler;
pub mod sink;

// Re-export the data plane
pub use keyframe_core as core;

// Re-export commonly used types
pub use animator::Animator;
pub use clock::MonotonicClock;
pub use commands::{
    CommandQueues, CommandSender, Register, RetiredHandles, SetPaused, SwapAnimation, Unregister,
};
pub use config::SchedulerConfig;
pub use error::{KeyframeError, KeyframeResult};
pub use gateway::AnimationGateway;
pub use keyframe_core::{
    AnimationDefinition, AnimationEvent, AnimationStyle, AnimatorHandle, AnimatorState,
    EventCallback, Frame, VisualId,
};
pub use scheduler::{AnimationScheduler, TickStats};
pub use sink::{FrameSink, NullSink, RecordingSink};
