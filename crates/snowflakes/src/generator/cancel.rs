use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// A cooperative cancellation signal for
/// [`Generator::blocking_next_id_until`].
///
/// The generator polls the signal between retries; it never interrupts a wait
/// that is already in progress.
///
/// # Example
///
/// ```
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use snowflakes::CancelSignal;
///
/// let stop = AtomicBool::new(false);
/// assert!(!stop.is_cancelled());
/// stop.store(true, Ordering::Release);
/// assert!(stop.is_cancelled());
/// ```
///
/// [`Generator::blocking_next_id_until`]: crate::Generator::blocking_next_id_until
pub trait CancelSignal {
    /// Returns `true` once the waiting caller should give up.
    fn is_cancelled(&self) -> bool;
}

impl CancelSignal for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

impl<C: CancelSignal + ?Sized> CancelSignal for &C {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

impl<C: CancelSignal + ?Sized> CancelSignal for Arc<C> {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

#[cfg_attr(docsrs, doc(cfg(feature = "async-tokio")))]
#[cfg(feature = "async-tokio")]
impl CancelSignal for tokio_util::sync::CancellationToken {
    fn is_cancelled(&self) -> bool {
        Self::is_cancelled(self)
    }
}
