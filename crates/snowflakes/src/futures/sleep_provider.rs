use core::{future::Future, time::Duration};

/// A trait that abstracts over how to sleep for a given [`Duration`] in async
/// contexts.
///
/// This is the async counterpart of [`Sleeper`](crate::Sleeper).
pub trait SleepProvider {
    /// The future is `Send` so that callers can be moved across threads.
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send;
}
