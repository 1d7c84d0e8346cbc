use core::{future::Future, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::{Error, Generator, Result, SleepProvider, Sleeper, SnowflakeId, TimeSource};

/// Waits on Tokio's timer between retries of an exhausted millisecond.
///
/// Suits many tasks contending for one generator: each waiting task parks on
/// the timer until the next millisecond instead of being polled again.
pub struct TokioSleep;
impl SleepProvider for TokioSleep {
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(dur)
    }
}

/// Hands control back to the Tokio scheduler between retries, ignoring the
/// requested duration.
///
/// The retry happens as soon as the task is polled again, so an ID is handed
/// out with the least delay once the clock ticks. With many waiting tasks this
/// turns into a busy loop; prefer [`TokioSleep`] there.
pub struct TokioYield;
impl SleepProvider for TokioYield {
    fn sleep_for(_dur: Duration) -> impl Future<Output = ()> + Send {
        tokio::task::yield_now()
    }
}

/// How long the async loop waits before retrying an exhausted millisecond.
const RETRY_AFTER: Duration = Duration::from_millis(1);

impl<T, S> Generator<T, S>
where
    T: TimeSource + Sync,
    S: Sleeper + Sync,
{
    /// Async counterpart of [`Generator::blocking_next_id`].
    ///
    /// Waits with `P` instead of the configured [`Sleeper`], so an async task
    /// never blocks its worker thread. In time-travel mode the generator's
    /// [`TimeTravelClock`](crate::TimeTravelClock) is advanced instead, since
    /// real time passing would never move it.
    ///
    /// # Errors
    ///
    /// Returns any error of [`Generator::next_id`] other than
    /// [`Error::SequenceExhausted`].
    ///
    /// # Example
    ///
    /// ```
    /// # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
    /// use snowflakes::{Generator, TokioSleep};
    ///
    /// let generator = Generator::new(1).unwrap();
    /// let id = generator.next_id_async::<TokioSleep>().await.unwrap();
    /// assert_eq!(generator.decode_id(id).machine_id, 1);
    /// # });
    /// ```
    pub async fn next_id_async<P>(&self) -> Result<SnowflakeId>
    where
        P: SleepProvider,
    {
        loop {
            match self.next_id() {
                Err(Error::SequenceExhausted { .. }) => self.wait_for_next_millis::<P>().await,
                res => return res,
            }
        }
    }

    /// Like [`Generator::next_id_async`], but resolves to
    /// [`Error::Cancelled`] as soon as `cancel` fires during a wait.
    ///
    /// # Errors
    ///
    /// [`Error::Cancelled`], or any error of [`Generator::next_id`] other than
    /// [`Error::SequenceExhausted`].
    pub async fn next_id_async_until<P>(&self, cancel: &CancellationToken) -> Result<SnowflakeId>
    where
        P: SleepProvider,
    {
        loop {
            match self.next_id() {
                Err(Error::SequenceExhausted { .. }) => {
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => {
                            #[cfg(feature = "tracing")]
                            tracing::debug!("cancelled while waiting for the next millisecond");
                            return Err(Error::Cancelled);
                        }
                        () = self.wait_for_next_millis::<P>() => {}
                    }
                }
                res => return res,
            }
        }
    }

    async fn wait_for_next_millis<P>(&self)
    where
        P: SleepProvider,
    {
        if self.is_time_travel() {
            // The travel clock never blocks; it only steps forward.
            self.sleeper().sleep();
            tokio::task::yield_now().await;
        } else {
            P::sleep_for(RETRY_AFTER).await;
        }
    }
}
