//! The store: single owner of a reducer's state.

use crate::handle::{EffectHandle, Tracking, TrackingMode};
use crate::{StoreConfig, StoreError};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use todomvc_core::{effect::Effect, reducer::Reducer};
use tokio::sync::RwLock;

/// Interval at which [`Store::shutdown`] checks for running effects
const SHUTDOWN_POLL: Duration = Duration::from_millis(20);

/// Runs a reducer over state it owns and executes the effects it returns
///
/// Cloning a store is cheap; clones share state, environment and shutdown
/// status. The reducer runs under the state's write lock, so actions sent
/// from any number of tasks are reduced one at a time.
///
/// # Type Parameters
///
/// - `S`: State
/// - `A`: Action
/// - `E`: Environment
/// - `R`: Reducer over `S`, `A` and `E`
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: R,
    environment: E,
    shutting_down: Arc<AtomicBool>,
    in_flight: Arc<AtomicUsize>,
    default_shutdown_timeout: Duration,
}

/// Marks one running effect, both on its handle and store-wide
///
/// Dropped when the effect's task ends, including by panic.
struct InFlight {
    tracking: Tracking,
    store_wide: Arc<AtomicUsize>,
}

impl InFlight {
    fn begin(tracking: Tracking, store_wide: &Arc<AtomicUsize>) -> Self {
        tracking.start();
        store_wide.fetch_add(1, Ordering::SeqCst);
        Self {
            tracking,
            store_wide: Arc::clone(store_wide),
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.store_wide.fetch_sub(1, Ordering::SeqCst);
        self.tracking.finish();
    }
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: Send + 'static,
    S: Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Store with [`StoreConfig::default`]
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self::with_config(initial_state, reducer, environment, StoreConfig::default())
    }

    /// Store with explicit settings
    #[must_use]
    pub fn with_config(initial_state: S, reducer: R, environment: E, config: StoreConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer,
            environment,
            shutting_down: Arc::new(AtomicBool::new(false)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            default_shutdown_timeout: config.default_shutdown_timeout,
        }
    }

    /// Configured shutdown deadline
    #[must_use]
    pub const fn default_shutdown_timeout(&self) -> Duration {
        self.default_shutdown_timeout
    }

    /// Effects running right now, across all actions
    #[must_use]
    pub fn pending_effects(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Reduces `action` and starts its effects
    ///
    /// Returns once the reducer has run; the handle tracks the effects it
    /// returned but not what those effects feed back.
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
        self.dispatch(action, TrackingMode::Direct).await
    }

    /// Like [`send`](Self::send), but the handle also covers every action fed
    /// back along the way and the effects those start
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    #[tracing::instrument(skip(self, action), name = "store_send_cascading")]
    pub async fn send_cascading(&self, action: A) -> Result<EffectHandle, StoreError> {
        self.dispatch(action, TrackingMode::cascading()).await
    }

    /// Reads state through `f` while holding the read lock
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        f(&*self.state.read().await)
    }

    /// Stops accepting actions, then waits up to `timeout` for running effects
    ///
    /// Actions fed back after this point are dropped.
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownTimeout`] with the number of effects still running.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        tracing::info!("Shutting down store");
        metrics::counter!("store.shutdown.initiated").increment(1);
        self.shutting_down.store(true, Ordering::Release);

        let deadline = Instant::now() + timeout;
        loop {
            let running = self.pending_effects();
            if running == 0 {
                tracing::info!("Store shut down");
                metrics::counter!("store.shutdown.completed").increment(1);
                return Ok(());
            }
            if Instant::now() >= deadline {
                tracing::error!(running, "Shutdown timed out");
                metrics::counter!("store.shutdown.timeout").increment(1);
                return Err(StoreError::ShutdownTimeout(running));
            }

            tracing::debug!(running, "Waiting for effects");
            tokio::time::sleep(SHUTDOWN_POLL).await;
        }
    }

    async fn dispatch(&self, action: A, mode: TrackingMode) -> Result<EffectHandle, StoreError> {
        if self.shutting_down.load(Ordering::Acquire) {
            tracing::warn!("Rejected action: store is shutting down");
            metrics::counter!("store.shutdown.rejected_actions").increment(1);
            return Err(StoreError::ShutdownInProgress);
        }
        metrics::counter!("store.commands.total").increment(1);

        let (handle, tracking) = EffectHandle::new(mode);

        let effects = {
            let mut state = self.state.write().await;
            let _span = tracing::debug_span!("reduce").entered();

            let started = Instant::now();
            let effects = self.reducer.reduce(&mut state, action, &self.environment);
            metrics::histogram!("store.reducer.duration_seconds")
                .record(started.elapsed().as_secs_f64());
            tracing::trace!(effects = effects.len(), "Reduced");

            effects
        };

        for effect in effects {
            self.execute(effect, tracking.clone());
        }
        Ok(handle)
    }

    /// Reduces an action produced by an effect
    ///
    /// In cascading mode the new action's handle is adopted by `tracking`
    /// before the effect counts as finished.
    async fn feed_back(&self, action: A, tracking: &Tracking) {
        match self.dispatch(action, tracking.mode.for_feedback()).await {
            Ok(child) => tracking.mode.adopt(child),
            Err(error) => tracing::warn!(%error, "Dropped action fed back by effect"),
        }
    }

    /// Runs `work` on its own task, counted as one running effect
    fn spawn_tracked<F>(&self, tracking: Tracking, work: F)
    where
        F: Future<Output = Option<A>> + Send + 'static,
    {
        let in_flight = InFlight::begin(tracking, &self.in_flight);
        let store = self.clone();

        tokio::spawn(async move {
            if let Some(action) = work.await {
                store.feed_back(action, &in_flight.tracking).await;
            }
            drop(in_flight);
        });
    }

    fn execute(&self, effect: Effect<A>, tracking: Tracking) {
        match effect {
            Effect::None => {},
            Effect::Future(work) => {
                metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                self.spawn_tracked(tracking, work);
            },
            Effect::Delay { duration, action } => {
                metrics::counter!("store.effects.executed", "type" => "delay").increment(1);
                self.spawn_tracked(tracking, async move {
                    tokio::time::sleep(duration).await;
                    Some(*action)
                });
            },
        }
    }
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: self.reducer.clone(),
            environment: self.environment.clone(),
            shutting_down: Arc::clone(&self.shutting_down),
            in_flight: Arc::clone(&self.in_flight),
            default_shutdown_timeout: self.default_shutdown_timeout,
        }
    }
}
