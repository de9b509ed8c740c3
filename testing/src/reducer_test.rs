//! Given-When-Then harness for reducers, plus effect helpers.
//!
//! Reducers are plain functions, so most store behaviour can be checked
//! without a runtime: reduce an action, look at the state, look at the
//! effects, and if needed run those effects with [`drive_effects`].

#![allow(clippy::module_name_repetitions)]

use todomvc_core::{effect::Effect, reducer::Reducer};

type StateCheck<S> = Box<dyn FnOnce(&S)>;
type EffectCheck<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Reduces a scripted sequence of actions and checks the outcome
///
/// Actions given with [`when_action`](Self::when_action) are reduced in
/// order. State checks see the final state; effect checks see the effects
/// returned for the last action.
///
/// # Example
///
/// ```ignore
/// use todomvc_testing::{ReducerTest, assertions};
///
/// ReducerTest::new(TodoReducer::new())
///     .with_env(env)
///     .given_state(TodoState::new())
///     .when_action(TodoAction::SetNewTodo { text: "milk".into() })
///     .when_action(TodoAction::AddTodo)
///     .then_state(|state| assert_eq!(state.new_todo, "milk"))
///     .then_effects(assertions::assert_has_future_effect)
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    given: Option<S>,
    actions: Vec<A>,
    state_checks: Vec<StateCheck<S>>,
    effect_checks: Vec<EffectCheck<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Harness around `reducer`
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            given: None,
            actions: Vec::new(),
            state_checks: Vec::new(),
            effect_checks: Vec::new(),
        }
    }

    /// Environment handed to the reducer
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// Starting state
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.given = Some(state);
        self
    }

    /// Appends an action to reduce
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.actions.push(action);
        self
    }

    /// Check on the state after every action
    #[must_use]
    pub fn then_state<F>(mut self, check: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_checks.push(Box::new(check));
        self
    }

    /// Check on the effects of the last action
    #[must_use]
    pub fn then_effects<F>(mut self, check: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_checks.push(Box::new(check));
        self
    }

    /// Reduces the actions and runs every check
    ///
    /// # Panics
    ///
    /// If the state, environment or actions are missing, or a check fails.
    #[allow(clippy::panic)]
    pub fn run(self) {
        let Some(mut state) = self.given else {
            panic!("ReducerTest: call given_state() before run()");
        };
        let Some(env) = self.environment else {
            panic!("ReducerTest: call with_env() before run()");
        };
        if self.actions.is_empty() {
            panic!("ReducerTest: call when_action() before run()");
        }

        let mut effects = Vec::new();
        for action in self.actions {
            effects = self.reducer.reduce(&mut state, action, &env).into_vec();
        }

        for check in self.state_checks {
            check(&state);
        }
        for check in self.effect_checks {
            check(&effects);
        }
    }
}

/// Ready-made effect checks for [`ReducerTest::then_effects`]
#[allow(clippy::panic)]
pub mod assertions {
    use std::fmt::Debug;
    use todomvc_core::effect::Effect;

    /// Nothing to execute: no effects, or only `Effect::None`
    ///
    /// # Panics
    ///
    /// If any effect does work.
    pub fn assert_no_effects<A: Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "expected no effects, got {effects:?}"
        );
    }

    /// Exactly `expected` effects
    ///
    /// # Panics
    ///
    /// On any other count.
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(effects.len(), expected, "unexpected number of effects");
    }

    /// At least one `Effect::Future`
    ///
    /// # Panics
    ///
    /// If there is none.
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(|e| matches!(e, Effect::Future(_))),
            "expected a future effect"
        );
    }

    /// At least one `Effect::Delay`
    ///
    /// # Panics
    ///
    /// If there is none.
    pub fn assert_has_delay_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(|e| matches!(e, Effect::Delay { .. })),
            "expected a delay effect"
        );
    }

    /// A delay whose action satisfies `predicate`
    ///
    /// # Panics
    ///
    /// If no delayed action matches.
    pub fn assert_delayed_action<A, F>(effects: &[Effect<A>], predicate: F)
    where
        F: Fn(&A) -> bool,
    {
        let found = effects.iter().any(|e| match e {
            Effect::Delay { action, .. } => predicate(action),
            _ => false,
        });
        assert!(found, "expected a delay effect with a matching action");
    }
}

/// Runs effects outside a store and returns the actions they produce
///
/// Futures are awaited in order and delays fire at once. The produced
/// actions are returned, not reduced.
///
/// # Example
///
/// ```ignore
/// let effects = TodoReducer::new().reduce(&mut state, TodoAction::LoadTodos, &env);
/// let outcomes = drive_effects(effects).await;
/// assert!(matches!(outcomes[..], [TodoAction::TodosLoaded { .. }]));
/// ```
pub async fn drive_effects<A, I>(effects: I) -> Vec<A>
where
    I: IntoIterator<Item = Effect<A>>,
{
    let mut produced = Vec::new();
    for effect in effects {
        match effect {
            Effect::None => {},
            Effect::Future(work) => produced.extend(work.await),
            Effect::Delay { action, .. } => produced.push(*action),
        }
    }
    produced
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use todomvc_core::{SmallVec, smallvec};

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Tally {
        marks: Vec<char>,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum TallyAction {
        Mark(char),
        Undo,
        MarkLater(char),
    }

    struct TallyReducer;

    impl Reducer for TallyReducer {
        type State = Tally;
        type Action = TallyAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Tally,
            action: TallyAction,
            _env: &(),
        ) -> SmallVec<[Effect<TallyAction>; 4]> {
            match action {
                TallyAction::Mark(c) => {
                    state.marks.push(c);
                    SmallVec::new()
                },
                TallyAction::Undo => {
                    state.marks.pop();
                    smallvec![Effect::None]
                },
                TallyAction::MarkLater(c) => {
                    smallvec![Effect::delay(Duration::from_secs(60), TallyAction::Mark(c))]
                },
            }
        }
    }

    #[test]
    fn reduces_actions_in_order() {
        ReducerTest::new(TallyReducer)
            .with_env(())
            .given_state(Tally::default())
            .when_action(TallyAction::Mark('a'))
            .when_action(TallyAction::Mark('b'))
            .when_action(TallyAction::Undo)
            .then_state(|state| assert_eq!(state.marks, vec!['a']))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn effect_checks_see_the_last_action() {
        ReducerTest::new(TallyReducer)
            .with_env(())
            .given_state(Tally::default())
            .when_action(TallyAction::Undo)
            .when_action(TallyAction::MarkLater('z'))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_delay_effect(effects);
                assertions::assert_delayed_action(effects, |a| *a == TallyAction::Mark('z'));
            })
            .run();
    }

    #[test]
    #[should_panic(expected = "given_state")]
    fn missing_state_is_reported() {
        ReducerTest::new(TallyReducer)
            .with_env(())
            .when_action(TallyAction::Undo)
            .run();
    }

    #[tokio::test]
    async fn drive_effects_runs_in_order_and_skips_waiting() {
        let effects = vec![
            Effect::None,
            Effect::future(async { Some(TallyAction::Mark('x')) }),
            Effect::delay(Duration::from_secs(60), TallyAction::Undo),
            Effect::future(async { None }),
        ];

        let produced = drive_effects(effects).await;

        assert_eq!(produced, vec![TallyAction::Mark('x'), TallyAction::Undo]);
    }
}
