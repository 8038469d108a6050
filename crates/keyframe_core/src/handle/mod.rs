//! # Animator Identity
//!
//! Identities are dense slot indices tagged with a generation.
//!
//! ## Design Philosophy
//!
//! - The index doubles as the position in the state table
//! - Indices are recycled so the table stays dense
//! - Generations make a recycled index distinguishable from its old occupant

mod id;
mod pool;

pub use id::AnimatorHandle;
pub use pool::HandlePool;
