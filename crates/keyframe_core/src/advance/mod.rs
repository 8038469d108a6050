//! # Advance Pass
//!
//! Parallel, pure per-record stepping. Produces notifications only; all
//! effects happen later in the apply pass.
//!
//! ## Flow
//!
//! 1. [`advance_all`] fans [`step`] out over the state table
//! 2. Transitions are pushed to the [`Outbound`] queues, generation-stamped
//! 3. The batch joins before anything drains the queues

mod batch;
mod outbound;
mod step;

pub use batch::{advance_all, advance_all_sequential, advance_record, AdvanceStats};
pub use outbound::{EventFired, FrameChanged, Outbound, OutboundWriter};
pub use step::{step, Step};
