use core::{cmp::Ordering, time::Duration};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    CancelSignal, Components, Error, GeneratorBuilder, Layout, Result, Sleeper, SnowflakeId,
    SystemClock, ThreadSleep, TimeSource,
    generator::{Mutex, MutexGuard},
};

/// The generator's mutable state. Only touched while holding the lock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct State {
    /// Timestamp of the last issued ID; `None` until the first one, so the
    /// first request always starts a fresh millisecond.
    pub(crate) last_timestamp: Option<u64>,
    /// Sequence of the last issued ID within `last_timestamp`.
    pub(crate) sequence: u64,
}

/// A lock-based Snowflake ID generator, safe to share across threads.
///
/// Every request runs one critical section under a mutex owned by this
/// instance: read the clock, compare it with the last issued timestamp, then
/// either bump the sequence or move to the new millisecond. Two generators
/// never share a lock, and concurrent callers of one generator never observe a
/// half-applied update.
///
/// Share a generator between threads by reference or behind an
/// [`Arc`](std::sync::Arc).
///
/// ## State machine
///
/// | clock vs. last issued | sequence room | result |
/// |---|---|---|
/// | later (or first call) | - | advance, sequence reset to 0 |
/// | equal | yes | sequence + 1 |
/// | equal | no | [`Error::SequenceExhausted`] |
/// | earlier | - | [`Error::ClockRegressed`] |
///
/// # Example
///
/// ```
/// use snowflakes::Generator;
///
/// let generator = Generator::new(378).unwrap();
/// let a = generator.blocking_next_id().unwrap();
/// let b = generator.blocking_next_id().unwrap();
/// assert!(a < b);
/// assert_eq!(generator.decode_id(b).machine_id, 378);
/// ```
#[derive(Debug)]
pub struct Generator<T = SystemClock, S = ThreadSleep> {
    #[cfg(feature = "cache-padded")]
    pub(crate) state: crossbeam_utils::CachePadded<Mutex<State>>,
    #[cfg(not(feature = "cache-padded"))]
    pub(crate) state: Mutex<State>,
    layout: Layout,
    machine_id: u64,
    epoch: Duration,
    epoch_ms: u64,
    time: T,
    sleeper: S,
    time_travel: bool,
}

impl Generator {
    /// Creates a generator with the default options: Unix epoch, 10 machine
    /// ID bits and 12 sequence bits, the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMachineId`] if `machine_id` is above 1023.
    pub fn new(machine_id: u64) -> Result<Self> {
        GeneratorBuilder::new(machine_id).build()
    }

    /// Starts configuring a generator for `machine_id`.
    pub fn builder(machine_id: u64) -> GeneratorBuilder {
        GeneratorBuilder::new(machine_id)
    }
}

impl<T, S> Generator<T, S>
where
    T: TimeSource,
    S: Sleeper,
{
    pub(crate) fn from_parts(
        layout: Layout,
        machine_id: u64,
        epoch: Duration,
        time: T,
        sleeper: S,
        time_travel: bool,
    ) -> Self {
        let state = Mutex::new(State::default());
        Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(state),
            #[cfg(not(feature = "cache-padded"))]
            state,
            layout,
            machine_id,
            epoch,
            epoch_ms: u64::try_from(epoch.as_millis()).unwrap_or(u64::MAX),
            time,
            sleeper,
            time_travel,
        }
    }

    /// The machine ID encoded into every ID.
    pub const fn machine_id(&self) -> u64 {
        self.machine_id
    }

    /// The machine ID / sequence split.
    pub const fn layout(&self) -> Layout {
        self.layout
    }

    /// The epoch timestamps are measured from, as time since the Unix epoch.
    pub const fn epoch(&self) -> Duration {
        self.epoch
    }

    /// Returns `true` if the generator was built in time-travel mode.
    pub const fn is_time_travel(&self) -> bool {
        self.time_travel
    }

    #[cfg(feature = "async-tokio")]
    pub(crate) const fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Splits an ID into timestamp, machine ID and sequence using this
    /// generator's layout. Never touches generator state.
    pub const fn decode_id(&self, id: SnowflakeId) -> Components {
        self.layout.decode(id)
    }

    /// Generates the next ID without waiting.
    ///
    /// # Errors
    ///
    /// - [`Error::SequenceExhausted`] if every sequence value of the current
    ///   millisecond has been issued. Retry once the clock moves on.
    /// - [`Error::ClockRegressed`] if the clock reads earlier than the last
    ///   issued ID.
    /// - [`Error::ClockBeforeEpoch`] / [`Error::TimestampOverflow`] if the
    ///   clock is outside the range the epoch can encode.
    /// - [`Error::LockPoisoned`] if another caller panicked inside the lock.
    ///
    /// No failure changes the generator's state.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> Result<SnowflakeId> {
        let mut state = self.lock()?;
        let now = self.elapsed_millis()?;

        match state.last_timestamp.map(|last| (now.cmp(&last), last)) {
            None | Some((Ordering::Greater, _)) => {
                state.last_timestamp = Some(now);
                state.sequence = 0;
            }
            Some((Ordering::Equal, _)) => {
                if state.sequence >= self.layout.max_sequence() {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(timestamp = now, "sequence exhausted");
                    return Err(Error::SequenceExhausted { timestamp: now });
                }
                state.sequence += 1;
            }
            Some((Ordering::Less, last)) => return Err(Self::cold_clock_behind(now, last)),
        }

        Ok(self.layout.encode(now, self.machine_id, state.sequence))
    }

    /// Generates the next ID, waiting for the next millisecond when the
    /// current one is exhausted.
    ///
    /// Each wait goes through the configured [`Sleeper`] with the lock
    /// released, then the request is retried from scratch.
    ///
    /// # Errors
    ///
    /// Returns any error of [`Generator::next_id`] other than
    /// [`Error::SequenceExhausted`].
    pub fn blocking_next_id(&self) -> Result<SnowflakeId> {
        self.retry_until(|| false)
    }

    /// Like [`Generator::blocking_next_id`], but gives up with
    /// [`Error::Cancelled`] once `cancel` fires.
    ///
    /// The signal is checked before and after every wait. An ID that is
    /// available without waiting is returned even if `cancel` already fired.
    ///
    /// # Errors
    ///
    /// [`Error::Cancelled`], or any error of [`Generator::next_id`] other than
    /// [`Error::SequenceExhausted`].
    pub fn blocking_next_id_until<C>(&self, cancel: &C) -> Result<SnowflakeId>
    where
        C: CancelSignal + ?Sized,
    {
        self.retry_until(|| cancel.is_cancelled())
    }

    fn retry_until(&self, is_cancelled: impl Fn() -> bool) -> Result<SnowflakeId> {
        loop {
            match self.next_id() {
                Err(Error::SequenceExhausted { .. }) => {
                    if is_cancelled() {
                        return Err(Self::cold_cancelled());
                    }
                    self.sleeper.sleep();
                    if is_cancelled() {
                        return Err(Self::cold_cancelled());
                    }
                }
                res => return res,
            }
        }
    }

    /// Current time in milliseconds since the configured epoch.
    fn elapsed_millis(&self) -> Result<u64> {
        let now = self.time.current_millis();
        let Some(elapsed) = now.checked_sub(self.epoch_ms) else {
            return Err(Error::ClockBeforeEpoch {
                now,
                epoch: self.epoch_ms,
            });
        };
        if elapsed > self.layout.max_timestamp() {
            return Err(Error::TimestampOverflow { timestamp: elapsed });
        }
        Ok(elapsed)
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.lock()?)
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(now: u64, last: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(now, last, "clock moved backwards, refusing to issue an ID");
        Error::ClockRegressed { now, last }
    }

    #[cold]
    #[inline(never)]
    fn cold_cancelled() -> Error {
        #[cfg(feature = "tracing")]
        tracing::debug!("cancelled while waiting for the next millisecond");
        Error::Cancelled
    }
}
