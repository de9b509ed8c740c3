//! # TodoMVC Core
//!
//! The vocabulary shared by the store runtime and the TodoMVC client.
//!
//! A [`Reducer`](reducer::Reducer) is the only place state changes. It takes
//! the current state, one action and the environment, mutates the state and
//! hands back [`Effect`](effect::Effect) values. Effects say what remote or
//! timed work should happen; the runtime decides when to run it and feeds
//! any resulting action back through the reducer.
//!
//! Time and identifier generation sit behind the traits in [`environment`],
//! and the REST backend behind [`todo::TodoApi`], so tests can swap all of
//! them.
//!
//! ```ignore
//! use todomvc_core::{effect::Effect, reducer::Reducer, SmallVec, smallvec};
//!
//! struct Toggle;
//!
//! impl Reducer for Toggle {
//!     type State = bool;
//!     type Action = ();
//!     type Environment = ();
//!
//!     fn reduce(&self, on: &mut bool, _: (), _: &()) -> SmallVec<[Effect<()>; 4]> {
//!         *on = !*on;
//!         smallvec![Effect::None]
//!     }
//! }
//! ```

pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

pub mod todo;

/// State transitions.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// Owns every change to `State`
    ///
    /// `reduce` must not perform I/O. Anything slow or remote is returned as
    /// an [`Effect`] instead, and its outcome comes back later as another
    /// action.
    ///
    /// ```ignore
    /// fn reduce(&self, state: &mut TodoState, action: TodoAction, env: &TodoEnvironment)
    ///     -> SmallVec<[Effect<TodoAction>; 4]>
    /// {
    ///     match action {
    ///         TodoAction::SetNewTodo { text } => {
    ///             state.new_todo = text;
    ///             SmallVec::new()
    ///         },
    ///         // ...
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// What the reducer mutates
        type State;

        /// Inputs: user intents and the outcomes of earlier effects
        type Action;

        /// Injected dependencies
        type Environment;

        /// Applies `action` to `state` and returns the work it implies
        ///
        /// Nearly every action yields at most one effect, hence the inline
        /// capacity of four.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Deferred work returned by reducers.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Work for the store to run after a reduction
    ///
    /// Nothing happens when an effect is built. Actions it produces are sent
    /// back to the same store.
    pub enum Effect<Action> {
        /// Nothing to do
        None,

        /// Send `action` once `duration` has passed
        Delay {
            /// Wait before sending
            duration: Duration,
            /// Sent when the wait is over
            action: Box<Action>,
        },

        /// A remote call or other async job; `Some` is fed back
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Boxes `fut` into [`Effect::Future`]
        #[must_use]
        pub fn future<F>(fut: F) -> Effect<Action>
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// Dispatch `action` after `duration`
        ///
        /// A zero duration still goes through the runtime's timer so the
        /// action is always delivered asynchronously.
        #[must_use]
        pub fn delay(duration: Duration, action: Action) -> Effect<Action> {
            Effect::Delay {
                duration,
                action: Box::new(action),
            }
        }

        /// Returns true for `Effect::None`
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

/// Injected time and identifiers.
pub mod environment {
    use chrono::{DateTime, Utc};
    use rand::Rng;

    /// Source of "now"
    pub trait Clock: Send + Sync {
        /// Current instant
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Generates placeholder identifiers for records that have not yet been
    /// persisted remotely.
    pub trait IdGenerator: Send + Sync {
        /// Produce a fresh identifier
        fn next_id(&self) -> String;
    }

    /// Random ten-digit identifiers
    ///
    /// Collisions are possible in principle; the ids are only used to
    /// correlate an in-flight create with its response and never outlive it.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct RandomIdGenerator;

    impl IdGenerator for RandomIdGenerator {
        fn next_id(&self) -> String {
            let n: u64 = rand::thread_rng().gen_range(0..10_000_000_000);
            format!("{n:010}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use super::environment::{Clock, IdGenerator, RandomIdGenerator, SystemClock};
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum TestAction {
        Ping,
    }

    #[test]
    fn effect_debug_hides_future() {
        let effect: Effect<TestAction> = Effect::future(async { Some(TestAction::Ping) });
        assert_eq!(format!("{effect:?}"), "Effect::Future(<future>)");
    }

    #[test]
    fn effect_debug_shows_delay() {
        let effect = Effect::delay(Duration::from_millis(5), TestAction::Ping);
        let debug = format!("{effect:?}");
        assert!(debug.contains("Effect::Delay"));
        assert!(debug.contains("Ping"));
    }

    #[test]
    fn only_none_is_none() {
        assert!(Effect::<TestAction>::None.is_none());
        assert!(!Effect::delay(Duration::ZERO, TestAction::Ping).is_none());
        assert!(!Effect::future(async { None::<TestAction> }).is_none());
    }

    #[test]
    fn random_ids_are_ten_digits() {
        let generator = RandomIdGenerator;
        for _ in 0..100 {
            let id = generator.next_id();
            assert_eq!(id.len(), 10);
            assert!(id.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
