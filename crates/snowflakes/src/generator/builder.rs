use core::time::Duration;

#[cfg(feature = "tracing")]
use tracing::debug;

use crate::{
    DEFAULT_MACHINE_ID_BITS, Error, Generator, Layout, Result, Sleeper, SystemClock,
    ThreadSleep, TimeSource, TimeTravelClock, UNIX_EPOCH_MS,
};

/// Options for constructing a [`Generator`].
///
/// Options apply in call order; a later call replaces an earlier one that sets
/// the same thing. Nothing is validated until [`GeneratorBuilder::build`], so
/// the machine ID is checked against the final bit width.
///
/// # Example
///
/// ```
/// use snowflakes::{Generator, TWITTER_EPOCH};
///
/// let generator = Generator::builder(378)
///     .epoch(TWITTER_EPOCH)
///     .machine_id_bits(12)
///     .build()
///     .unwrap();
/// assert_eq!(generator.layout().sequence_bits(), 10);
/// ```
#[derive(Clone, Debug)]
pub struct GeneratorBuilder<T = SystemClock, S = ThreadSleep> {
    machine_id: u64,
    machine_id_bits: u8,
    epoch: Duration,
    time: T,
    sleeper: S,
    time_travel: bool,
}

impl GeneratorBuilder {
    /// Starts from the defaults: Unix epoch, 10 machine ID bits, the system
    /// clock and [`ThreadSleep`].
    pub fn new(machine_id: u64) -> Self {
        Self {
            machine_id,
            machine_id_bits: DEFAULT_MACHINE_ID_BITS,
            epoch: UNIX_EPOCH_MS,
            time: SystemClock,
            sleeper: ThreadSleep::default(),
            time_travel: false,
        }
    }
}

impl<T, S> GeneratorBuilder<T, S> {
    /// Measures timestamps from `epoch`, given as time since the Unix epoch.
    ///
    /// The 41-bit timestamp field covers roughly 69 years from the epoch.
    #[must_use]
    pub fn epoch(mut self, epoch: Duration) -> Self {
        self.epoch = epoch;
        self
    }

    /// Uses `bits` bits for the machine ID and `22 - bits` for the sequence.
    ///
    /// Must be in `1..=21`; checked by [`GeneratorBuilder::build`].
    #[must_use]
    pub fn machine_id_bits(mut self, bits: u8) -> Self {
        self.machine_id_bits = bits;
        self
    }

    /// Replaces the clock. Leaves time-travel mode if it was enabled.
    #[must_use]
    pub fn clock<T2>(self, time: T2) -> GeneratorBuilder<T2, S>
    where
        T2: TimeSource,
    {
        GeneratorBuilder {
            machine_id: self.machine_id,
            machine_id_bits: self.machine_id_bits,
            epoch: self.epoch,
            time,
            sleeper: self.sleeper,
            time_travel: false,
        }
    }

    /// Replaces the wait hook used by the blocking methods.
    ///
    /// Leaves time-travel mode if it was enabled. The [`TimeTravelClock`] stays
    /// installed but no longer moves on its own, so advance it with
    /// [`TimeTravelClock::advance`] or replace it with
    /// [`GeneratorBuilder::clock`].
    #[must_use]
    pub fn sleeper<S2>(self, sleeper: S2) -> GeneratorBuilder<T, S2>
    where
        S2: Sleeper,
    {
        GeneratorBuilder {
            machine_id: self.machine_id,
            machine_id_bits: self.machine_id_bits,
            epoch: self.epoch,
            time: self.time,
            sleeper,
            time_travel: false,
        }
    }

    /// Enables **time-travel mode**, for benchmarks and tests.
    ///
    /// The generator stops reading the real clock and uses a
    /// [`TimeTravelClock`] as both clock and sleeper: time starts at the
    /// current wall-clock time and advances one millisecond per wait, so
    /// blocking calls never really sleep. Timestamps run ahead of real time
    /// under load. Do not use this in production.
    #[must_use]
    pub fn time_travel(self) -> GeneratorBuilder<TimeTravelClock, TimeTravelClock> {
        let clock = TimeTravelClock::new();
        GeneratorBuilder {
            machine_id: self.machine_id,
            machine_id_bits: self.machine_id_bits,
            epoch: self.epoch,
            time: clock.clone(),
            sleeper: clock,
            time_travel: true,
        }
    }

    /// Validates the options and creates the generator.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidMachineIdBits`] if the bit width is outside `1..=21`.
    /// - [`Error::InvalidMachineId`] if the machine ID does not fit in that
    ///   width.
    pub fn build(self) -> Result<Generator<T, S>>
    where
        T: TimeSource,
        S: Sleeper,
    {
        let layout = Layout::new(self.machine_id_bits)?;
        if !layout.accepts_machine_id(self.machine_id) {
            return Err(Error::InvalidMachineId {
                machine_id: self.machine_id,
                max: layout.max_machine_id(),
            });
        }

        #[cfg(feature = "tracing")]
        debug!(
            machine_id = self.machine_id,
            machine_id_bits = self.machine_id_bits,
            epoch = ?self.epoch,
            time_travel = self.time_travel,
            "generator configured"
        );

        Ok(Generator::from_parts(
            layout,
            self.machine_id,
            self.epoch,
            self.time,
            self.sleeper,
            self.time_travel,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CancelSignal;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn defaults() {
        let generator = GeneratorBuilder::new(7).build().unwrap();
        assert_eq!(generator.machine_id(), 7);
        assert_eq!(generator.layout(), Layout::default());
        assert_eq!(generator.epoch(), UNIX_EPOCH_MS);
        assert!(!generator.is_time_travel());
    }

    #[test]
    fn machine_id_is_checked_against_final_width() {
        // 2000 needs 11 bits; the later option wins.
        let generator = Generator::builder(2000)
            .machine_id_bits(4)
            .machine_id_bits(11)
            .build()
            .unwrap();
        assert_eq!(generator.layout().machine_id_bits(), 11);

        let err = Generator::builder(2000)
            .machine_id_bits(11)
            .machine_id_bits(10)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidMachineId {
                machine_id: 2000,
                max: 1023
            }
        );
    }

    #[test]
    fn rejects_out_of_range_widths() {
        for bits in [0, 22, 64, u8::MAX] {
            let err = Generator::builder(0)
                .machine_id_bits(bits)
                .build()
                .unwrap_err();
            assert_eq!(err, Error::InvalidMachineIdBits { bits, max: 21 });
            assert!(err.is_config());
        }
    }

    #[test]
    fn rejects_machine_id_at_capacity() {
        assert!(Generator::new(1023).is_ok());
        assert!(matches!(
            Generator::new(1024),
            Err(Error::InvalidMachineId { machine_id: 1024, max: 1023 })
        ));
        assert!(Generator::builder(1).machine_id_bits(1).build().is_ok());
        assert!(Generator::builder(2).machine_id_bits(1).build().is_err());
    }

    #[test]
    fn last_epoch_wins() {
        let generator = Generator::builder(0)
            .epoch(crate::DISCORD_EPOCH)
            .epoch(crate::TWITTER_EPOCH)
            .build()
            .unwrap();
        assert_eq!(generator.epoch(), crate::TWITTER_EPOCH);
    }

    #[test]
    fn time_travel_is_explicit_and_replaceable() {
        let generator = Generator::builder(0).time_travel().build().unwrap();
        assert!(generator.is_time_travel());

        let generator = Generator::builder(0)
            .time_travel()
            .clock(SystemClock)
            .build()
            .unwrap();
        assert!(!generator.is_time_travel());
    }

    #[test]
    fn time_travel_survives_layout_options() {
        let generator = Generator::builder(3)
            .time_travel()
            .epoch(crate::TWITTER_EPOCH)
            .machine_id_bits(21)
            .build()
            .unwrap();
        assert!(generator.is_time_travel());
    }

    #[test]
    fn replacing_sleeper_leaves_time_travel() {
        let waits = AtomicU64::new(0);
        let generator = Generator::builder(0)
            .machine_id_bits(21)
            .time_travel()
            .sleeper(CountingSleep(&waits))
            .build()
            .unwrap();
        assert!(!generator.is_time_travel());

        // The installed clock is frozen now, so the third ID has to give up.
        generator.next_id().unwrap();
        generator.next_id().unwrap();
        let stop = StopAfter {
            waits: &waits,
            limit: 10,
        };
        assert_eq!(
            generator.blocking_next_id_until(&stop),
            Err(Error::Cancelled)
        );
        assert_eq!(waits.load(Ordering::Relaxed), 10);
    }

    struct StopAfter<'a> {
        waits: &'a AtomicU64,
        limit: u64,
    }

    impl CancelSignal for StopAfter<'_> {
        fn is_cancelled(&self) -> bool {
            self.waits.load(Ordering::Relaxed) >= self.limit
        }
    }

    #[derive(Debug)]
    struct CountingSleep<'a>(&'a AtomicU64);

    impl Sleeper for CountingSleep<'_> {
        fn sleep(&self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }
}
