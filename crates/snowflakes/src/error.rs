/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `snowflakes` can produce.
///
/// Configuration errors ([`Error::InvalidMachineIdBits`],
/// [`Error::InvalidMachineId`]) only surface from
/// [`GeneratorBuilder::build`]. Everything else comes from ID generation.
///
/// [`GeneratorBuilder::build`]: crate::GeneratorBuilder::build
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The machine ID bit width is outside `1..=21`.
    #[error("machine ID bit width {bits} is outside 1..={max}")]
    InvalidMachineIdBits {
        /// The requested width.
        bits: u8,
        /// The largest accepted width.
        max: u8,
    },

    /// The machine ID does not fit in the configured bit width.
    #[error("machine ID {machine_id} exceeds the maximum of {max} for this layout")]
    InvalidMachineId {
        /// The requested machine ID.
        machine_id: u64,
        /// The largest machine ID the layout can encode.
        max: u64,
    },

    /// The clock reads earlier than the timestamp of the last issued ID.
    ///
    /// This is never retried internally: waiting cannot repair a clock that
    /// was moved backward.
    #[error("clock moved backwards: now {now}ms, last issued at {last}ms")]
    ClockRegressed {
        /// Current time, in milliseconds since the generator's epoch.
        now: u64,
        /// Timestamp of the last issued ID.
        last: u64,
    },

    /// Every sequence value of the current millisecond has been issued.
    ///
    /// Retry once the clock advances, or use
    /// [`Generator::blocking_next_id`].
    ///
    /// [`Generator::blocking_next_id`]: crate::Generator::blocking_next_id
    #[error("sequence exhausted for timestamp {timestamp}ms")]
    SequenceExhausted {
        /// The millisecond whose capacity ran out.
        timestamp: u64,
    },

    /// A blocking or async wait observed its cancellation signal.
    #[error("ID generation cancelled while waiting for the next millisecond")]
    Cancelled,

    /// The clock reads earlier than the configured epoch.
    #[error("clock reads {now}ms since the Unix epoch, before the configured epoch {epoch}ms")]
    ClockBeforeEpoch {
        /// Current time, in milliseconds since the Unix epoch.
        now: u64,
        /// Configured epoch, in milliseconds since the Unix epoch.
        epoch: u64,
    },

    /// The elapsed time since the epoch no longer fits in the 41-bit
    /// timestamp field.
    #[error("timestamp {timestamp}ms does not fit in the 41-bit timestamp field")]
    TimestampOverflow {
        /// Milliseconds since the configured epoch.
        timestamp: u64,
    },

    /// The operation failed because the generator's lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison, so this
    /// variant is not available.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,
}

impl Error {
    /// Returns `true` for errors raised while validating generator
    /// configuration.
    pub const fn is_config(&self) -> bool {
        matches!(
            self,
            Self::InvalidMachineIdBits { .. } | Self::InvalidMachineId { .. }
        )
    }

    /// Returns `true` if retrying after the clock advances can succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::SequenceExhausted { .. })
    }
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
