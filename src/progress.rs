//! Refinement progress reporting and cancellation
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Progress notification, emitted by the [crate::prelude::Solver]
/// at start, on every 10th iteration, on early convergence and on completion.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ProgressEvent {
    /// Completion rate, only reaches 100 once the estimate is formed
    pub percent: u8,
    /// Iteration index
    pub iteration: usize,
    /// Short status description
    pub message: String,
}

impl ProgressEvent {
    pub(crate) fn new(percent: u8, iteration: usize, message: String) -> Self {
        Self {
            percent,
            iteration,
            message,
        }
    }
}

/// Implement this trait to receive [ProgressEvent]s.
/// Notifications are delivered inline, on the solving thread:
/// implementations should return quickly.
pub trait ProgressSink {
    fn progress(&mut self, event: &ProgressEvent);
}

impl<F: FnMut(&ProgressEvent)> ProgressSink for F {
    fn progress(&mut self, event: &ProgressEvent) {
        self(event)
    }
}

/// [ProgressSink] that discards all notifications
#[derive(Debug, Default, Copy, Clone)]
pub struct Quiet;

impl ProgressSink for Quiet {
    fn progress(&mut self, _: &ProgressEvent) {}
}

/// Shared cancellation flag. The solver polls it once per iteration and
/// returns a partial estimate when it is raised.
#[derive(Debug, Default, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }
    /// Requests cancellation, for all clones of this token
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
