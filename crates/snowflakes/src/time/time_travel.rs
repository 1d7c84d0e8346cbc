use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use crate::{Sleeper, SystemClock, TimeSource};

/// The clock behind time-travel mode.
///
/// Time travel decouples a generator from real time: the clock starts at the
/// wall-clock time of construction and never reads the real clock again.
/// Instead it advances by exactly one millisecond each time it is asked to
/// wait. A generator in this mode issues IDs as fast as the CPU allows while
/// still producing valid, ordered IDs, which is what benchmarks want.
///
/// Timestamps drift ahead of real time under load, so this is **not** a
/// production mode. Enable it with [`GeneratorBuilder::time_travel`], which
/// installs one shared instance as both the clock and the sleeper.
///
/// [`GeneratorBuilder::time_travel`]: crate::GeneratorBuilder::time_travel
#[derive(Clone, Debug)]
pub struct TimeTravelClock {
    now: Arc<AtomicU64>,
}

impl Default for TimeTravelClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeTravelClock {
    /// Starts at the current wall-clock time.
    pub fn new() -> Self {
        Self::starting_at(SystemClock.current_millis())
    }

    /// Starts at `millis` since the Unix epoch.
    pub fn starting_at(millis: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(millis)),
        }
    }

    /// Moves the clock forward by `millis`.
    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::AcqRel);
    }
}

impl TimeSource for TimeTravelClock {
    fn current_millis(&self) -> u64 {
        self.now.load(Ordering::Acquire)
    }
}

impl Sleeper for TimeTravelClock {
    fn sleep(&self) {
        self.advance(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_moves_when_waiting() {
        let clock = TimeTravelClock::starting_at(100);
        assert_eq!(clock.current_millis(), 100);
        assert_eq!(clock.current_millis(), 100);

        clock.sleep();
        assert_eq!(clock.current_millis(), 101);

        clock.advance(9);
        assert_eq!(clock.current_millis(), 110);
    }

    #[test]
    fn clones_share_time() {
        let clock = TimeTravelClock::starting_at(0);
        let other = clock.clone();
        other.sleep();
        assert_eq!(clock.current_millis(), 1);
    }
}
