//! # Handle Pool
//!
//! Issues and recycles animator identities.

use super::id::AnimatorHandle;

/// Issues small integer identities for live animators.
///
/// Returned indices are reused before new ones are minted, keeping the state
/// table dense. Every reuse bumps the slot's generation.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. The gateway wraps it in a mutex.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool = HandlePool::new();
///
/// let a = pool.borrow();       // 0v0
/// pool.give_back(a);
/// let b = pool.borrow();       // 0v1 - same slot, new generation
/// ```
#[derive(Debug)]
pub struct HandlePool {
    /// Current generation of every index ever issued.
    generations: Vec<u32>,
    /// Whether each issued index is currently out on loan.
    on_loan: Vec<bool>,
    /// Free list - indices of returned slots (LIFO).
    free_list: Vec<u32>,
    /// Number of handles currently out on loan.
    live_count: usize,
    /// Indices at or above this are never minted.
    index_limit: u32,
}

impl HandlePool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty pool with room for `capacity` indices before growing.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            generations: Vec::with_capacity(capacity),
            on_loan: Vec::with_capacity(capacity),
            free_list: Vec::with_capacity(capacity),
            live_count: 0,
            index_limit: u32::MAX,
        }
    }

    #[cfg(test)]
    fn with_index_limit(index_limit: u32) -> Self {
        Self {
            index_limit,
            ..Self::new()
        }
    }

    /// Returns the number of handles currently out on loan.
    #[inline]
    #[must_use]
    pub const fn live_count(&self) -> usize {
        self.live_count
    }

    /// Returns the number of distinct indices ever issued.
    #[inline]
    #[must_use]
    pub fn high_water(&self) -> usize {
        self.generations.len()
    }

    /// Returns the number of indices waiting for reuse.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Borrows a handle.
    ///
    /// Reuses the most recently returned index if there is one, otherwise
    /// mints the next sequential index.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX - 1` indices would be live at once.
    pub fn borrow(&mut self) -> AnimatorHandle {
        if let Some(index) = self.free_list.pop() {
            let slot = index as usize;
            self.generations[slot] = self.generations[slot].wrapping_add(1);
            self.on_loan[slot] = true;
            self.live_count += 1;
            return AnimatorHandle::new(index, self.generations[slot]);
        }

        let next = self.generations.len();
        assert!(next < self.index_limit as usize, "Handle pool exhausted");
        let index = next as u32;
        self.generations.push(0);
        self.on_loan.push(true);
        self.live_count += 1;
        AnimatorHandle::new(index, 0)
    }

    /// Returns a handle, making its index eligible for reuse.
    ///
    /// # Returns
    ///
    /// `false` if the handle is null, was never issued, is stale, or was
    /// already returned.
    pub fn give_back(&mut self, handle: AnimatorHandle) -> bool {
        if !self.is_live(handle) {
            return false;
        }

        self.on_loan[handle.slot()] = false;
        self.free_list.push(handle.index());
        self.live_count -= 1;
        true
    }

    /// Checks whether `handle` is currently out on loan.
    #[inline]
    #[must_use]
    pub fn is_live(&self, handle: AnimatorHandle) -> bool {
        if handle.is_null() {
            return false;
        }
        let slot = handle.slot();
        self.on_loan.get(slot).copied().unwrap_or(false)
            && self.generations[slot] == handle.generation()
    }
}

impl Default for HandlePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_sequential() {
        let mut pool = HandlePool::new();

        let a = pool.borrow();
        let b = pool.borrow();
        let c = pool.borrow();
        assert_eq!((a.index(), b.index(), c.index()), (0, 1, 2));
        assert_eq!(pool.live_count(), 3);
        assert_eq!(pool.high_water(), 3);
    }

    #[test]
    fn test_pool_reuse() {
        let mut pool = HandlePool::new();

        let a = pool.borrow();
        let _b = pool.borrow();
        assert!(pool.give_back(a));

        let c = pool.borrow();
        assert_eq!(c.index(), a.index()); // Same slot reused
        assert_ne!(c.generation(), a.generation());
        assert!(!pool.is_live(a));
        assert!(pool.is_live(c));
        assert_eq!(pool.high_water(), 2);
    }

    #[test]
    fn test_pool_lifo_reuse() {
        let mut pool = HandlePool::new();

        let a = pool.borrow();
        let b = pool.borrow();
        pool.give_back(a);
        pool.give_back(b);

        assert_eq!(pool.borrow().index(), b.index());
        assert_eq!(pool.borrow().index(), a.index());
    }

    #[test]
    fn test_pool_rejects_bad_returns() {
        let mut pool = HandlePool::new();

        let a = pool.borrow();
        assert!(!pool.give_back(AnimatorHandle::NULL));
        assert!(!pool.give_back(AnimatorHandle::new(7, 0)));
        assert!(pool.give_back(a));
        assert!(!pool.give_back(a)); // Double return
        assert_eq!(pool.free_count(), 1);

        let reused = pool.borrow();
        assert!(!pool.give_back(a)); // Stale generation
        assert!(pool.is_live(reused));
    }

    #[test]
    fn test_no_two_live_handles_share_an_index() {
        let mut pool = HandlePool::with_capacity(8);
        let mut live = Vec::new();

        for round in 0..50 {
            live.push(pool.borrow());
            if round % 3 == 0 {
                let gone = live.remove(0);
                pool.give_back(gone);
            }
            let mut indices: Vec<u32> = live.iter().map(|h| h.index()).collect();
            indices.sort_unstable();
            indices.dedup();
            assert_eq!(indices.len(), live.len());
        }
    }

    #[test]
    fn test_exhausted_borrow_leaves_count_intact() {
        let mut pool = HandlePool::with_index_limit(2);
        let _ = pool.borrow();
        let _ = pool.borrow();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| pool.borrow()));
        assert!(result.is_err());
        assert_eq!(pool.live_count(), 2);
        assert_eq!(pool.high_water(), 2);
    }
}
