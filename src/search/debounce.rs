//! Keyword debouncing.
//!
//! The debouncer is polled from the UI loop instead of owning a timer, so
//! dropping it (or calling [`Debouncer::cancel`]) guarantees nothing fires
//! afterwards. Time comes from `tokio::time::Instant`, which lets tests run
//! with a paused clock.

use tokio::time::{Duration, Instant};

/// Propagates a value only after it has stayed unchanged for `delay`
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    settled: T,
    pending: Option<Pending<T>>,
}

#[derive(Debug)]
struct Pending<T> {
    value: T,
    since: Instant,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    /// Create a debouncer whose settled value starts as `initial`
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            delay,
            settled: initial,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// The last value that made it through
    pub fn settled(&self) -> &T {
        &self.settled
    }

    /// Record a new input value.
    ///
    /// A value different from the pending one restarts the wait.
    pub fn update(&mut self, value: T) {
        match &self.pending {
            Some(pending) if pending.value == value => return,
            None if self.settled == value => return,
            _ => {}
        }

        self.pending = Some(Pending {
            value,
            since: Instant::now(),
        });
    }

    /// Return the pending value once it has been stable for `delay`.
    ///
    /// Yields each settle at most once, and nothing when the value ended up
    /// back where it started.
    pub fn poll(&mut self) -> Option<T> {
        self.poll_at(Instant::now())
    }

    pub fn poll_at(&mut self, now: Instant) -> Option<T> {
        let ready = self
            .pending
            .as_ref()
            .is_some_and(|p| now.saturating_duration_since(p.since) >= self.delay);
        if !ready {
            return None;
        }

        let value = self.pending.take()?.value;
        if value == self.settled {
            return None;
        }

        self.settled = value.clone();
        Some(value)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Remaining wait before the pending value settles
    pub fn time_until_ready(&self) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|p| self.delay.saturating_sub(p.since.elapsed()))
    }

    /// Drop the pending value without emitting it
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
