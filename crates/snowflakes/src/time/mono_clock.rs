use core::time::Duration;
use std::{
    sync::{
        Arc, OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::Instant,
};

use crate::{SystemClock, TimeSource};

/// State published by the ticker thread: milliseconds since the anchor.
#[derive(Debug)]
struct SharedTickerInner {
    current: AtomicU64,
    _handle: OnceLock<JoinHandle<()>>,
}

/// A clock that never goes backward.
///
/// At construction the clock reads the wall clock once and remembers it as an
/// anchor. From then on a background thread measures elapsed time with
/// [`Instant`] and publishes it once per millisecond, so later adjustments to
/// the system clock (NTP steps, manual changes) never reach the generator and
/// [`Error::ClockRegressed`] cannot occur.
///
/// Cloning shares the ticker. The thread stops after the last clone is
/// dropped.
///
/// # Example
///
/// ```
/// use snowflakes::{Generator, MonotonicClock};
///
/// let generator = Generator::builder(1)
///     .clock(MonotonicClock::new())
///     .build()
///     .unwrap();
/// let id = generator.blocking_next_id().unwrap();
/// assert_eq!(generator.decode_id(id).machine_id, 1);
/// ```
///
/// [`Error::ClockRegressed`]: crate::Error::ClockRegressed
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    inner: Arc<SharedTickerInner>,
    anchor: u64, // unix millis at construction
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Starts a ticker anchored to the current wall-clock time.
    pub fn new() -> Self {
        let start = Instant::now();
        let anchor = SystemClock.current_millis();

        let inner = Arc::new(SharedTickerInner {
            current: AtomicU64::new(0),
            _handle: OnceLock::new(),
        });

        let weak_inner = Arc::downgrade(&inner);
        let handle = thread::spawn(move || {
            while let Some(inner) = weak_inner.upgrade() {
                let elapsed = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                inner.current.store(elapsed, Ordering::Relaxed);
                // Only hold the clock alive while publishing.
                drop(inner);

                let next_tick = start + Duration::from_millis(elapsed.saturating_add(1));
                thread::sleep(next_tick.saturating_duration_since(Instant::now()));
            }
        });

        // Freshly created, so the cell is empty.
        let _ = inner._handle.set(handle);

        Self { inner, anchor }
    }

    /// The wall-clock time, in milliseconds since the Unix epoch, that this
    /// clock was anchored to.
    pub const fn anchor(&self) -> u64 {
        self.anchor
    }
}

impl TimeSource for MonotonicClock {
    fn current_millis(&self) -> u64 {
        self.anchor
            .saturating_add(self.inner.current.load(Ordering::Relaxed))
    }
}
