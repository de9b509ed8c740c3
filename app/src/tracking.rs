//! Analytics tracking.
//!
//! The store reports `todo.add` and `todo.remove` with the todo's title
//! right before the corresponding request is sent.

use std::sync::{Mutex, PoisonError};

/// Event name reported when a todo is about to be created
pub const TODO_ADD: &str = "todo.add";

/// Event name reported when a todo is about to be deleted
pub const TODO_REMOVE: &str = "todo.remove";

/// Sink for analytics events
pub trait Tracker: Send + Sync {
    /// Report `event` with a free-form `detail`
    fn track(&self, event: &str, detail: &str);
}

/// Emits each event as a `tracing` event on the `todomvc::analytics` target
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTracker;

impl Tracker for LogTracker {
    fn track(&self, event: &str, detail: &str) {
        tracing::info!(target: "todomvc::analytics", event, detail, "track");
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingTracker {
    events: Mutex<Vec<(String, String)>>,
}

impl RecordingTracker {
    /// Creates an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far as `(event, detail)`, oldest first
    #[must_use]
    pub fn events(&self) -> Vec<(String, String)> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Tracker for RecordingTracker {
    fn track(&self, event: &str, detail: &str) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((event.to_string(), detail.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_tracker_keeps_order() {
        let tracker = RecordingTracker::new();
        tracker.track(TODO_ADD, "milk");
        tracker.track(TODO_REMOVE, "milk");

        assert_eq!(
            tracker.events(),
            vec![
                ("todo.add".to_string(), "milk".to_string()),
                ("todo.remove".to_string(), "milk".to_string()),
            ]
        );
    }
}
