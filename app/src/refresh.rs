//! Periodic reload of the todo list.

use crate::reducer::TodoStore;
use crate::types::TodoAction;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Interval used when none is configured
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Background task sending `LoadTodos` every interval
///
/// The first reload happens one full interval after start. The task stops
/// when [`stop`](Self::stop) is called, when it is dropped, or once the store
/// refuses actions because it is shutting down.
#[derive(Debug)]
pub struct PeriodicRefresh {
    task: JoinHandle<()>,
}

impl PeriodicRefresh {
    /// Starts reloading `store` every `every`
    #[must_use]
    pub fn start(store: TodoStore, every: Duration) -> Self {
        let task = tokio::spawn(async move {
            let mut ticks = tokio::time::interval(every.max(Duration::from_millis(1)));
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticks.tick().await;

            loop {
                ticks.tick().await;
                tracing::debug!("Periodic refresh");
                if let Err(error) = store.send(TodoAction::LoadTodos).await {
                    tracing::info!(error = %error, "Stopping periodic refresh");
                    break;
                }
            }
        });

        Self { task }
    }

    /// Whether the task has stopped
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops reloading
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for PeriodicRefresh {
    fn drop(&mut self) {
        self.task.abort();
    }
}
