//! Free-running poll timers.
//!
//! A `PollTask` owns one tokio task that fires a poll on a fixed period.
//! Each tick's poll runs as its own task so a slow endpoint never delays
//! the timer; overlapping polls are allowed to race.
//!
//! Each `PollTask` is stopped either explicitly via `stop()` or when dropped,
//! so timers never outlive their owner. Polls still in flight at that point
//! are cancelled at their next await.
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Lower bound on a poll period.
pub const MIN_PERIOD: Duration = Duration::from_millis(10);

pub struct PollTask {
    name: &'static str,
    period: Duration,
    cancel: CancellationToken,
    join_handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for PollTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollTask")
            .field("name", &self.name)
            .field("period", &self.period)
            .field("running", &self.is_running())
            .finish()
    }
}

impl PollTask {
    /// Start polling every `period`; the first poll fires immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::spawn_with_token(name, period, CancellationToken::new(), tick)
    }

    /// Like `spawn`, but stops when `parent` (or this task) is cancelled.
    pub fn spawn_with_token<F, Fut>(
        name: &'static str,
        period: Duration,
        parent: CancellationToken,
        mut tick: F,
    ) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = period.max(MIN_PERIOD);
        let cancel = parent.child_token();
        let token = cancel.clone();

        let join_handle = tokio::spawn(async move {
            tracing::debug!(task = name, period_ms = period.as_millis() as u64, "poll task started");
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let poll = tick();
                        let poll_token = token.clone();
                        tokio::spawn(async move {
                            tokio::select! {
                                _ = poll_token.cancelled() => {}
                                _ = poll => {}
                            }
                        });
                    }
                }
            }
            tracing::trace!(task = name, "poll task exiting cleanly");
        });

        Self {
            name,
            period,
            cancel,
            join_handle: Some(join_handle),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.join_handle
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Cancel the timer and any in-flight polls, then wait for the timer task.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.join_handle.take() {
            match handle.await {
                Ok(()) => tracing::trace!(task = self.name, "poll task joined"),
                Err(e) => tracing::warn!(task = self.name, error = %e, "poll task ended abnormally"),
            }
        }
    }
}

impl Drop for PollTask {
    fn drop(&mut self) {
        // Cannot await here; cancellation makes the task exit at its next select.
        self.cancel.cancel();
        if let Some(handle) = self.join_handle.take() {
            handle.abort();
        }
    }
}
