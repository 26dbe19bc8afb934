//! Search control: cancellation flags and soft/hard deadlines.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Decides when a search stops.
///
/// Two flags drive cancellation:
/// - `cancel_now` aborts the current iteration. It is shared with whoever
///   issues an external `stop`, and is also raised once the hard deadline
///   passes.
/// - `cancel_after_iteration` lets the running iteration finish but prevents
///   a new one. Raised once the soft deadline passes.
///
/// The search calls [`poll`](Self::poll) on a leaf-count schedule; it never
/// reads the clock on its own.
#[derive(Debug)]
pub struct SearchControl {
    cancel_now: Arc<AtomicBool>,
    cancel_after_iteration: AtomicBool,
    start: Instant,
    soft_limit: Option<Duration>,
    hard_limit: Option<Duration>,
}

impl SearchControl {
    /// No deadlines; only the shared flag stops the search.
    pub fn new_infinite(cancel_now: Arc<AtomicBool>) -> Self {
        Self {
            cancel_now,
            cancel_after_iteration: AtomicBool::new(false),
            start: Instant::now(),
            soft_limit: None,
            hard_limit: None,
        }
    }

    /// Deadlines measured from now.
    pub fn new_timed(cancel_now: Arc<AtomicBool>, soft: Duration, hard: Duration) -> Self {
        Self {
            cancel_now,
            cancel_after_iteration: AtomicBool::new(false),
            start: Instant::now(),
            soft_limit: Some(soft),
            hard_limit: Some(hard.max(soft)),
        }
    }

    /// Compare the clock against both deadlines and raise the matching flags.
    pub fn poll(&self) {
        let elapsed = self.elapsed();
        if let Some(hard) = self.hard_limit
            && elapsed >= hard
        {
            self.cancel_now.store(true, Ordering::Relaxed);
        }
        if let Some(soft) = self.soft_limit
            && elapsed >= soft
        {
            self.cancel_after_iteration.store(true, Ordering::Relaxed);
        }
    }

    /// The current iteration must be abandoned.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_now.load(Ordering::Relaxed)
    }

    /// No new iteration may start.
    ///
    /// Also reads the clock, so a soft deadline that expired between polls
    /// is honoured at the iteration boundary.
    pub fn should_stop_iterating(&self) -> bool {
        if self.is_cancelled() || self.cancel_after_iteration.load(Ordering::Relaxed) {
            return true;
        }
        self.soft_limit.is_some_and(|soft| self.elapsed() >= soft)
    }

    /// Raise `cancel_now` from inside the process.
    pub fn stop(&self) {
        self.cancel_now.store(true, Ordering::Relaxed);
    }

    /// Time since the control was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Soft deadline, if any.
    pub fn soft_limit(&self) -> Option<Duration> {
        self.soft_limit
    }

    /// Hard deadline, if any.
    pub fn hard_limit(&self) -> Option<Duration> {
        self.hard_limit
    }
}
