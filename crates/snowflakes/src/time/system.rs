use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{Sleeper, TimeSource};

/// Wall-clock time from [`SystemTime`].
///
/// This is the default clock. It follows every adjustment made to the system
/// clock, including backward steps, which the generator reports as
/// [`Error::ClockRegressed`]. Use [`MonotonicClock`] to avoid that.
///
/// [`Error::ClockRegressed`]: crate::Error::ClockRegressed
/// [`MonotonicClock`]: crate::MonotonicClock
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        // A clock set before 1970 reads as 0 and is then rejected against the
        // epoch by the generator.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Default wait between retries, well under one tick.
pub const DEFAULT_SLEEP: Duration = Duration::from_micros(100);

/// A [`Sleeper`] that parks the thread with [`std::thread::sleep`].
#[derive(Copy, Clone, Debug)]
pub struct ThreadSleep {
    dur: Duration,
}

impl Default for ThreadSleep {
    fn default() -> Self {
        Self { dur: DEFAULT_SLEEP }
    }
}

impl ThreadSleep {
    /// Sleeps for `dur` on every retry.
    pub const fn new(dur: Duration) -> Self {
        Self { dur }
    }

    /// The configured wait.
    pub const fn duration(&self) -> Duration {
        self.dur
    }
}

impl Sleeper for ThreadSleep {
    fn sleep(&self) {
        std::thread::sleep(self.dur);
    }
}

/// A [`Sleeper`] that only yields to the OS scheduler.
///
/// This reacts faster than [`ThreadSleep`] when the next millisecond is close,
/// at the cost of a tighter polling loop and more CPU under contention.
#[derive(Copy, Clone, Debug, Default)]
pub struct ThreadYield;

impl Sleeper for ThreadYield {
    fn sleep(&self) {
        std::thread::yield_now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_after_twitter_epoch() {
        let now = SystemClock.current_millis();
        assert!(now > crate::TWITTER_EPOCH.as_millis() as u64);
    }

    #[test]
    fn thread_sleep_waits_at_least_its_duration() {
        let sleeper = ThreadSleep::new(Duration::from_millis(2));
        let start = std::time::Instant::now();
        sleeper.sleep();
        assert!(start.elapsed() >= Duration::from_millis(2));
    }
}
