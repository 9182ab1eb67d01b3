//! Turns a stream of raw keystroke values into settled queries.
//!
//! The debouncer is a plain state machine owned by a single task: `push`
//! (re)schedules the pending emission, `settled` sleeps until the quiet period
//! has elapsed and yields the latest value. After `cancel` nothing is emitted.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Pending {
    value: String,
    deadline: Instant,
}

#[derive(Debug)]
pub struct QueryDebouncer {
    quiet: Duration,
    pending: Option<Pending>,
    cancelled: bool,
}

impl QueryDebouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            cancelled: false,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Record a raw input value, replacing any pending one and restarting
    /// the quiet period. Ignored once cancelled.
    pub fn push(&mut self, input: impl Into<String>) {
        if self.cancelled {
            return;
        }
        self.pending = Some(Pending {
            value: input.into(),
            deadline: Instant::now() + self.quiet,
        });
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// When the pending value will settle, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Take the pending value if its quiet period has elapsed at `now`.
    pub fn take_settled(&mut self, now: Instant) -> Option<String> {
        let ready = self.pending.as_ref().is_some_and(|p| p.deadline <= now);
        if ready {
            self.pending.take().map(|p| p.value)
        } else {
            None
        }
    }

    /// Wait for the pending value to settle. Returns `None` immediately when
    /// nothing is pending or the debouncer was cancelled.
    pub async fn settled(&mut self) -> Option<String> {
        loop {
            let deadline = self.deadline()?;
            tokio::time::sleep_until(deadline).await;
            if let Some(value) = self.take_settled(Instant::now()) {
                return Some(value);
            }
        }
    }

    /// Drop any pending value and refuse further input.
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.pending = None;
    }
}
