//! # State Table
//!
//! Dense record storage indexed by handle slot.
//!
//! The table uses a dense array strategy:
//! - The slot index IS the handle index
//! - Removal never compacts; a slot is only rewritten on re-registration
//! - Access is O(1), iteration is cache-friendly

use super::record::AnimatorState;
use crate::handle::AnimatorHandle;

/// Dense array of [`AnimatorState`] records.
///
/// # Thread Safety
///
/// The table must not grow or be reordered while an advance batch is
/// running over [`as_mut_slice`](Self::as_mut_slice). The borrow checker
/// enforces this: the batch holds the only mutable borrow.
///
/// # Example
///
/// ```rust,ignore
/// let mut table = StateTable::with_capacity(1024);
/// table.insert(handle, AnimatorState::registered(handle.generation(), &def, 0));
/// assert!(table.live(handle).is_some());
/// ```
#[derive(Debug, Default, Clone)]
pub struct StateTable {
    records: Vec<AnimatorState>,
}

impl StateTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty table with room for `capacity` slots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    /// Number of slots (live or not).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the table has no slots.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of live records.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_live()).count()
    }

    /// Grows the table so that `slot` exists. New slots are empty.
    pub fn ensure_slot(&mut self, slot: usize) {
        if slot >= self.records.len() {
            self.records.resize(slot + 1, AnimatorState::EMPTY);
        }
    }

    /// Writes `record` into the handle's slot, growing the table if needed.
    pub fn insert(&mut self, handle: AnimatorHandle, record: AnimatorState) {
        let slot = handle.slot();
        self.ensure_slot(slot);
        self.records[slot] = record;
    }

    /// Record at `slot`, live or not. `None` out of range.
    #[inline]
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&AnimatorState> {
        self.records.get(slot)
    }

    /// Mutable record at `slot`, live or not. `None` out of range.
    #[inline]
    pub fn get_mut(&mut self, slot: usize) -> Option<&mut AnimatorState> {
        self.records.get_mut(slot)
    }

    /// Record owned by `handle`.
    ///
    /// `None` if the slot is out of range, not live, or was registered under
    /// a different generation.
    #[inline]
    #[must_use]
    pub fn live(&self, handle: AnimatorHandle) -> Option<&AnimatorState> {
        self.live_at(handle.slot(), handle.generation())
    }

    /// Mutable variant of [`live`](Self::live).
    #[inline]
    pub fn live_mut(&mut self, handle: AnimatorHandle) -> Option<&mut AnimatorState> {
        self.live_at_mut(handle.slot(), handle.generation())
    }

    /// Live record at `slot` registered under `generation`.
    #[inline]
    #[must_use]
    pub fn live_at(&self, slot: usize, generation: u32) -> Option<&AnimatorState> {
        self.records
            .get(slot)
            .filter(|r| r.is_live() && r.generation == generation)
    }

    /// Mutable variant of [`live_at`](Self::live_at).
    #[inline]
    pub fn live_at_mut(&mut self, slot: usize, generation: u32) -> Option<&mut AnimatorState> {
        self.records
            .get_mut(slot)
            .filter(|r| r.is_live() && r.generation == generation)
    }

    /// Retires the record owned by `handle`.
    ///
    /// Returns `false` if the handle does not own a live record.
    pub fn retire(&mut self, handle: AnimatorHandle) -> bool {
        match self.live_mut(handle) {
            Some(record) => {
                record.retire();
                true
            }
            None => false,
        }
    }

    /// All records, for read-only batch processing.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[AnimatorState] {
        &self.records
    }

    /// All records, for the advance pass.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [AnimatorState] {
        &mut self.records
    }

    /// Iterates over live records with their slots.
    pub fn iter_live(&self) -> impl Iterator<Item = (usize, &AnimatorState)> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_live())
    }
}
