//! Progress notices for verbose runs.
//!
//! The engine never prints. It hands [`Progress`] events to a
//! [`ProgressSink`] and the front end decides how they look.

use std::time::Duration;

use parking_lot::Mutex;

/// A user-facing progress event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// Deletion is about to start.
    Deleting {
        /// Pods in the snapshot.
        pods: usize,
        /// Batches planned.
        batches: usize,
    },
    /// A pod is about to be deleted.
    Pod {
        /// Pod name.
        name: String,
        /// Whether the delete is a dry run.
        dry_run: bool,
    },
    /// The run is pausing before the next batch.
    Waiting {
        /// Length of the pause.
        interval: Duration,
        /// Index of the batch that follows.
        next_batch: usize,
    },
}

/// Receives progress events.
pub trait ProgressSink: Send + Sync {
    /// Handle one event.
    fn notify(&self, event: &Progress);
}

/// A sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn notify(&self, _event: &Progress) {}
}

/// A sink that keeps every event, for inspection in tests.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<Progress>>,
}

impl RecordingProgress {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far.
    #[must_use]
    pub fn events(&self) -> Vec<Progress> {
        self.events.lock().clone()
    }

    /// Number of [`Progress::Waiting`] events received.
    #[must_use]
    pub fn waits(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, Progress::Waiting { .. }))
            .count()
    }
}

impl ProgressSink for RecordingProgress {
    fn notify(&self, event: &Progress) {
        self.events.lock().push(event.clone());
    }
}
