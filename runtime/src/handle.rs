//! Completion tracking for the effects of a sent action.
//!
//! Every action sent to the store gets an [`EffectHandle`]. The store keeps
//! the matching [`Tracking`] and bumps its counter for each effect it starts;
//! the handle resolves once the counter is back to zero. In cascading mode,
//! actions fed back by those effects get handles of their own, which are
//! adopted by the parent before the parent's counter drops.

use crate::StoreError;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

/// How far an [`EffectHandle`] follows the work its action started
#[derive(Debug, Clone)]
pub enum TrackingMode {
    /// Only the effects returned for the action itself
    Direct,

    /// Also every effect of every action those effects feed back, transitively
    Cascading {
        /// Handles of fed-back actions, settled after the parent's own effects
        children: Arc<Mutex<Vec<EffectHandle>>>,
    },
}

impl TrackingMode {
    /// Cascading mode with no children yet
    #[must_use]
    pub fn cascading() -> Self {
        Self::Cascading {
            children: Arc::default(),
        }
    }

    /// Mode for an action fed back under this one
    pub(crate) fn for_feedback(&self) -> Self {
        match self {
            Self::Direct => Self::Direct,
            Self::Cascading { .. } => Self::cascading(),
        }
    }

    pub(crate) fn adopt(&self, child: EffectHandle) {
        if let Self::Cascading { children } = self {
            children
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(child);
        }
    }

    /// Snapshot of the adopted handles; they stay recorded so a wait that
    /// timed out can be repeated
    fn children(&self) -> Vec<EffectHandle> {
        match self {
            Self::Direct => Vec::new(),
            Self::Cascading { children } => children
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }
}

/// Awaitable completion of the effects started by one action
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send_cascading(TodoAction::LoadTodos).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // the load has settled and its outcome has been reduced
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    mode: TrackingMode,
    running: Arc<AtomicUsize>,
    settled: watch::Receiver<()>,
}

impl EffectHandle {
    /// A handle and the tracking side the store drives
    pub(crate) fn new(mode: TrackingMode) -> (Self, Tracking) {
        let running = Arc::new(AtomicUsize::new(0));
        let (notify, settled) = watch::channel(());

        let handle = Self {
            mode: mode.clone(),
            running: Arc::clone(&running),
            settled,
        };
        (
            handle,
            Tracking {
                mode,
                running,
                notify,
            },
        )
    }

    /// A handle with nothing to wait for
    #[must_use]
    pub fn completed() -> Self {
        Self::new(TrackingMode::Direct).0
    }

    /// Effects of this action still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// Waits until the tracked effects have finished
    ///
    /// Under [`TrackingMode::Cascading`] this includes the effects of every
    /// action fed back along the way.
    pub async fn wait(&mut self) {
        self.settle().await;

        // A child is adopted before its parent's counter drops, so all of
        // them are visible here
        let mut queue = self.mode.children();
        while let Some(mut child) = queue.pop() {
            child.settle().await;
            queue.extend(child.mode.children());
        }
    }

    /// [`wait`](Self::wait) with a deadline
    ///
    /// # Errors
    ///
    /// [`StoreError::Timeout`] if effects are still running after `timeout`.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }

    /// Waits for this handle's own counter only
    async fn settle(&mut self) {
        while self.pending() > 0 {
            if self.settled.changed().await.is_err() {
                break;
            }
        }
    }
}

impl fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectHandle")
            .field("mode", &self.mode)
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

/// Store-side half of an [`EffectHandle`]
#[derive(Clone)]
pub(crate) struct Tracking {
    pub(crate) mode: TrackingMode,
    running: Arc<AtomicUsize>,
    notify: watch::Sender<()>,
}

impl Tracking {
    pub(crate) fn start(&self) {
        self.running.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn finish(&self) {
        if self.running.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.notify.send(());
        }
    }
}
