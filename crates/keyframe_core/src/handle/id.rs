//! # Animator Handles
//!
//! Handles are lightweight identifiers consisting of:
//! - A slot index into the state table
//! - A generation counter for safe reuse

use std::fmt;

/// Identity of a live animator.
///
/// The handle is split into two parts:
/// - Lower 32 bits: Slot index into the state table
/// - Upper 32 bits: Generation counter for detecting stale references
///
/// Two animators that are alive at the same time never share an index.
/// An index that is reused gets a new generation, so anything stamped with
/// the old generation can be told apart from the new occupant.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct AnimatorHandle(u64);

impl AnimatorHandle {
    /// Creates a handle from a slot index and generation.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the slot index portion of the handle.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the slot index as a `usize`, ready for table lookups.
    #[inline]
    #[must_use]
    pub const fn slot(self) -> usize {
        self.index() as usize
    }

    /// Returns the generation portion of the handle.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// The unset handle.
    pub const NULL: Self = Self(u64::MAX);

    /// Checks if this handle is unset.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for AnimatorHandle {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for AnimatorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("AnimatorHandle(NULL)")
        } else {
            write!(f, "AnimatorHandle({}v{})", self.index(), self.generation())
        }
    }
}

impl fmt::Display for AnimatorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("null")
        } else {
            write!(f, "{}v{}", self.index(), self.generation())
        }
    }
}
