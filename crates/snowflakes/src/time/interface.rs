use core::time::Duration;
use std::sync::Arc;

/// Unix epoch: Thursday, January 1, 1970 00:00:00 UTC. The default epoch.
pub const UNIX_EPOCH_MS: Duration = Duration::from_millis(0);

/// Custom epoch: Wednesday, January 1, 2025 00:00:00 UTC
pub const CUSTOM_EPOCH: Duration = Duration::from_millis(1_735_689_600_000);

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
pub const TWITTER_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// Discord epoch: Thursday, January 1, 2015 00:00:00 UTC
pub const DISCORD_EPOCH: Duration = Duration::from_millis(1_420_070_400_000);

/// Instagram epoch: Saturday, January 1, 2011 00:00:00 UTC
pub const INSTAGRAM_EPOCH: Duration = Duration::from_millis(1_293_840_000_000);

/// A source of the current time.
///
/// This abstraction allows you to plug in the system clock, a monotonic
/// ticker, or a mocked time source in tests.
///
/// The unit is **milliseconds since the Unix epoch**. The generator subtracts
/// its own configured epoch, so a clock never needs to know about it.
///
/// # Example
///
/// ```
/// use snowflakes::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the Unix epoch.
    fn current_millis(&self) -> u64;
}

/// The wait hook used between retries when a millisecond is exhausted.
///
/// A real implementation blocks the calling thread briefly; a test
/// implementation can advance a mock clock instead so no real time passes.
pub trait Sleeper {
    /// Waits until it is worth trying again.
    fn sleep(&self);
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<S: Sleeper + ?Sized> Sleeper for &S {
    fn sleep(&self) {
        (**self).sleep();
    }
}

impl<S: Sleeper + ?Sized> Sleeper for Arc<S> {
    fn sleep(&self) {
        (**self).sleep();
    }
}
