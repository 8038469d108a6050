//! Monotonic tick clock.

use std::time::{Duration, Instant};

/// Seconds since creation, from [`Instant`].
///
/// Unaffected by wall-clock changes or any game time scale, which is what
/// [`AnimationScheduler::tick`](crate::AnimationScheduler::tick) expects.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Starts a clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Seconds elapsed since the clock started.
    #[inline]
    #[must_use]
    pub fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    /// Elapsed time as a [`Duration`].
    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_monotonic() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        std::thread::sleep(Duration::from_millis(2));
        let b = clock.now();
        assert!(a >= 0.0);
        assert!(b > a);
    }
}
