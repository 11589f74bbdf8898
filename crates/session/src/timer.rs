//! Cancellable delayed-task primitives for the change coalescer.
//!
//! [`DelayedTask`] is the debounce building block: at most one pending
//! execution, where scheduling again replaces the pending one. [`Throttle`]
//! is the leading-and-trailing-edge rate limiter used for interactive
//! previews. Both are built on [`CancellationToken`] and `tokio::select!`
//! rather than ad hoc timer handles, so cancellation is explicit and
//! race-free.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

type BoxedJob = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

// ---------------------------------------------------------------------------
// DelayedTask
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct DelayedInner {
    /// Bumped on every schedule/cancel so a fired task can tell whether it
    /// is still the current one before clearing the pending marker.
    seq: u64,
    pending: Option<CancellationToken>,
}

/// A single-slot cancellable delayed task.
///
/// `schedule` arms a timer that runs the given job after `delay`, replacing
/// (and cancelling) any job still pending. `cancel` discards the pending job
/// without running it.
#[derive(Debug, Default)]
pub struct DelayedTask {
    inner: Arc<Mutex<DelayedInner>>,
}

impl DelayedTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer. Any previously pending job is cancelled first: a burst
    /// of schedules collapses to the last one.
    pub fn schedule<F>(&self, delay: Duration, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let seq = {
            let mut inner = self.inner.lock().unwrap();
            if let Some(previous) = inner.pending.take() {
                previous.cancel();
            }
            inner.seq += 1;
            inner.pending = Some(token.clone());
            inner.seq
        };

        let shared = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    {
                        let mut inner = shared.lock().unwrap();
                        if inner.seq == seq {
                            inner.pending = None;
                        }
                    }
                    job.await;
                }
            }
        });
    }

    /// Discard the pending job, if any.
    pub fn cancel(&self) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(pending) = inner.pending.take() {
            pending.cancel();
        }
        inner.seq += 1;
    }

    pub fn is_pending(&self) -> bool {
        self.inner.lock().unwrap().pending.is_some()
    }
}

// ---------------------------------------------------------------------------
// Throttle
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ThrottleInner {
    last_fired: Option<tokio::time::Instant>,
    trailing: Option<CancellationToken>,
    /// The most recent job submitted inside the interval; earlier ones are
    /// superseded, never queued.
    queued: Option<BoxedJob>,
}

/// Leading-and-trailing-edge rate limiter.
///
/// A call outside the interval runs immediately (leading edge). Calls inside
/// the interval replace a single queued job that runs when the interval
/// elapses (trailing edge), so continuous slider motion yields one render
/// per interval with the freshest parameters.
pub struct Throttle {
    interval: Duration,
    inner: Arc<Mutex<ThrottleInner>>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            inner: Arc::new(Mutex::new(ThrottleInner::default())),
        }
    }

    /// Run `job` now, or queue it for the trailing edge of the current
    /// interval, superseding any previously queued job.
    pub fn call<F>(&self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let now = tokio::time::Instant::now();
        let mut inner = self.inner.lock().unwrap();

        let outside_interval = match inner.last_fired {
            None => true,
            Some(last) => now.duration_since(last) >= self.interval,
        };

        if outside_interval && inner.trailing.is_none() {
            inner.last_fired = Some(now);
            drop(inner);
            tokio::spawn(job);
            return;
        }

        inner.queued = Some(Box::pin(job));
        if inner.trailing.is_none() {
            let token = CancellationToken::new();
            inner.trailing = Some(token.clone());

            let elapsed = inner
                .last_fired
                .map(|last| now.duration_since(last))
                .unwrap_or_default();
            let wait = self.interval.saturating_sub(elapsed);
            let shared = Arc::clone(&self.inner);
            drop(inner);

            tokio::spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => {}
                    _ = tokio::time::sleep(wait) => {
                        let job = {
                            let mut inner = shared.lock().unwrap();
                            inner.trailing = None;
                            inner.last_fired = Some(tokio::time::Instant::now());
                            inner.queued.take()
                        };
                        if let Some(job) = job {
                            job.await;
                        }
                    }
                }
            });
        }
    }

    /// Drop the queued trailing job, if any.
    pub fn cancel(&self) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(trailing) = inner.trailing.take() {
            trailing.cancel();
        }
        inner.queued = None;
    }

    pub fn is_pending(&self) -> bool {
        self.inner.lock().unwrap().trailing.is_some()
    }
}
