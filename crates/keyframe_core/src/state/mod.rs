//! # Animator State
//!
//! Plain-data runtime records and the dense table that holds them.
//!
//! ## Design Philosophy
//!
//! - One record per live animator, indexed by handle slot
//! - Records are `Pod`: no references, no heap, trivially `Send`
//! - Slots are never compacted; a generation tag marks the current occupant

mod record;
mod table;

pub use record::{AnimatorState, NEVER_UPDATED};
pub use table::StateTable;
