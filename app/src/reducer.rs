//! Reducer logic for the todo store.
//!
//! Intents validate against the local cache and describe the remote call as
//! an effect; outcomes fold the server's answer back into the cache. Loads are
//! numbered: only the outcome of the most recently issued load may replace
//! the list, so a slow older response can never overwrite a newer one.

use crate::error::TodoError;
use crate::tracking::{LogTracker, TODO_ADD, TODO_REMOVE, Tracker};
use crate::types::{TodoAction, TodoState};
use std::sync::Arc;
use std::time::Duration;
use todomvc_core::{
    SmallVec,
    effect::Effect,
    environment::{Clock, IdGenerator, RandomIdGenerator, SystemClock},
    reducer::Reducer,
    smallvec,
    todo::{NewTodo, Todo, TodoApi, TodoId, TodoPatch},
};
use todomvc_runtime::Store;

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Remote todo service
    pub api: Arc<dyn TodoApi>,
    /// Analytics sink
    pub tracker: Arc<dyn Tracker>,
    /// Placeholder ids for todos being created
    pub ids: Arc<dyn IdGenerator>,
    /// Clock for load timestamps
    pub clock: Arc<dyn Clock>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(
        api: Arc<dyn TodoApi>,
        tracker: Arc<dyn Tracker>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            api,
            tracker,
            ids,
            clock,
        }
    }

    /// Environment with production tracker, id generator and clock
    #[must_use]
    pub fn production(api: Arc<dyn TodoApi>) -> Self {
        Self::new(
            api,
            Arc::new(LogTracker),
            Arc::new(RandomIdGenerator),
            Arc::new(SystemClock),
        )
    }
}

/// Store running the todo reducer
pub type TodoStore = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;

/// Reducer for the todo store
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Marks the load `generation` as in flight and fetches the collection
    fn begin_load(
        state: &mut TodoState,
        generation: u64,
        env: &TodoEnvironment,
    ) -> Effect<TodoAction> {
        // A superseded load still settles, but must not raise the flag again
        if generation == state.load_generation {
            state.loading = true;
        }
        tracing::debug!(generation, "Loading todos");

        let api = Arc::clone(&env.api);
        Effect::future(async move {
            match api.list().await {
                Ok(todos) => Some(TodoAction::TodosLoaded { generation, todos }),
                Err(error) => Some(TodoAction::LoadFailed { generation, error }),
            }
        })
    }

    /// Creates a todo on the server after `delay`, reporting `todo.add` first
    fn create(
        title: String,
        completed: bool,
        delay: Duration,
        env: &TodoEnvironment,
    ) -> Effect<TodoAction> {
        let local_id = env.ids.next_id();
        let api = Arc::clone(&env.api);
        let tracker = Arc::clone(&env.tracker);

        Effect::future(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            tracker.track(TODO_ADD, &title);

            let request = NewTodo::new(title.clone(), completed).with_local_id(local_id.clone());
            match api.create(request).await {
                Ok(todo) => Some(TodoAction::TodoPersisted { local_id, todo }),
                Err(error) => Some(TodoAction::AddFailed {
                    local_id,
                    title,
                    error,
                }),
            }
        })
    }

    /// Sends `patch` for a todo already edited locally; `revert` undoes the
    /// edit on failure
    fn update(
        id: TodoId,
        patch: TodoPatch,
        revert: TodoPatch,
        env: &TodoEnvironment,
    ) -> Effect<TodoAction> {
        let api = Arc::clone(&env.api);

        Effect::future(async move {
            match api.update(id, patch.clone()).await {
                Ok(todo) => Some(TodoAction::TodoUpdated { todo }),
                Err(error) => Some(TodoAction::UpdateFailed {
                    id,
                    applied: patch,
                    revert,
                    error,
                }),
            }
        })
    }

    /// Puts back each reverted field that still holds the value from `applied`
    ///
    /// A field changed since, by a later edit or a load, is left alone.
    fn revert_edit(todo: &mut Todo, applied: &TodoPatch, revert: TodoPatch) {
        if let Some(title) = revert
            .title
            .filter(|_| applied.title.as_ref() == Some(&todo.title))
        {
            todo.title = title;
        }
        if let Some(completed) = revert
            .completed
            .filter(|_| applied.completed == Some(todo.completed))
        {
            todo.completed = completed;
        }
    }

    /// Deletes the completed todos one at a time
    ///
    /// A todo the server no longer has counts as removed.
    fn remove_all(completed: Vec<Todo>, env: &TodoEnvironment) -> Effect<TodoAction> {
        let api = Arc::clone(&env.api);
        let tracker = Arc::clone(&env.tracker);

        Effect::future(async move {
            let mut removed = Vec::with_capacity(completed.len());
            let mut failed = Vec::new();

            for todo in completed {
                tracker.track(TODO_REMOVE, &todo.title);
                match api.delete(todo.id).await {
                    Ok(()) => removed.push(todo.id),
                    Err(error) if error.is_not_found() => removed.push(todo.id),
                    Err(error) => failed.push((todo.id, error)),
                }
            }

            Some(TodoAction::CompletedRemoved { removed, failed })
        })
    }

    /// Counts a settled load; returns true if it is the most recent one
    fn settle_load(state: &mut TodoState, generation: u64) -> bool {
        state.loads_settled += 1;
        state.page_ready = true;

        let latest = generation == state.load_generation;
        if latest {
            state.loading = false;
        } else {
            tracing::debug!(
                generation,
                latest = state.load_generation,
                "Discarding stale load"
            );
        }
        latest
    }

    fn record_failure(state: &mut TodoState, error: TodoError) {
        state.last_error = Some(error);
        state.errors_recorded += 1;
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::trace!(action = action.name(), "Reducing");

        match action {
            // ========== Intents ==========
            TodoAction::SetDelay { delay } => {
                state.delay = delay;
                SmallVec::new()
            },

            TodoAction::SetAddTodoDelay { delay } => {
                state.add_todo_delay = delay;
                SmallVec::new()
            },

            TodoAction::LoadTodos => {
                state.load_generation += 1;
                let generation = state.load_generation;

                if state.delay.is_zero() {
                    smallvec![Self::begin_load(state, generation, env)]
                } else {
                    tracing::debug!(generation, delay = ?state.delay, "Delaying load");
                    smallvec![Effect::delay(
                        state.delay,
                        TodoAction::BeginLoad { generation }
                    )]
                }
            },

            TodoAction::BeginLoad { generation } => {
                smallvec![Self::begin_load(state, generation, env)]
            },

            TodoAction::SetNewTodo { text } => {
                state.new_todo = text;
                SmallVec::new()
            },

            TodoAction::ClearNewTodo => {
                state.new_todo.clear();
                SmallVec::new()
            },

            TodoAction::AddTodo => {
                let title = state.new_todo.trim();
                if title.is_empty() {
                    return SmallVec::new();
                }

                smallvec![Self::create(
                    title.to_string(),
                    false,
                    state.add_todo_delay,
                    env
                )]
            },

            TodoAction::AddEntireTodo { title, completed } => {
                let title = title.trim();
                if title.is_empty() {
                    Self::record_failure(state, TodoError::EmptyTitle);
                    return SmallVec::new();
                }

                smallvec![Self::create(title.to_string(), completed, Duration::ZERO, env)]
            },

            TodoAction::RemoveTodo { id } => {
                let Some(todo) = state.get(id) else {
                    Self::record_failure(state, TodoError::NotFound(id));
                    return SmallVec::new();
                };

                let title = todo.title.clone();
                let api = Arc::clone(&env.api);
                let tracker = Arc::clone(&env.tracker);

                smallvec![Effect::future(async move {
                    tracker.track(TODO_REMOVE, &title);
                    match api.delete(id).await {
                        Ok(()) => Some(TodoAction::TodoRemoved { id }),
                        Err(error) => Some(TodoAction::RemoveFailed { id, error }),
                    }
                })]
            },

            TodoAction::RemoveCompleted => {
                let completed: Vec<Todo> =
                    state.todos.iter().filter(|t| t.completed).cloned().collect();
                if completed.is_empty() {
                    return SmallVec::new();
                }

                smallvec![Self::remove_all(completed, env)]
            },

            TodoAction::ToggleTodo { id } => {
                let Some(todo) = state.get_mut(id) else {
                    Self::record_failure(state, TodoError::NotFound(id));
                    return SmallVec::new();
                };

                let revert = TodoPatch::completed(todo.completed);
                todo.completed = !todo.completed;
                let patch = TodoPatch::completed(todo.completed);

                smallvec![Self::update(id, patch, revert, env)]
            },

            TodoAction::RenameTodo { id, title } => {
                let title = title.trim();
                if title.is_empty() {
                    Self::record_failure(state, TodoError::EmptyTitle);
                    return SmallVec::new();
                }

                let Some(todo) = state.get_mut(id) else {
                    Self::record_failure(state, TodoError::NotFound(id));
                    return SmallVec::new();
                };

                let previous = std::mem::replace(&mut todo.title, title.to_string());
                let revert = TodoPatch::title(previous);

                smallvec![Self::update(id, TodoPatch::title(title), revert, env)]
            },

            // ========== Outcomes ==========
            TodoAction::TodosLoaded { generation, todos } => {
                if Self::settle_load(state, generation) {
                    tracing::debug!(generation, count = todos.len(), "Loaded todos");
                    state.todos = todos;
                    state.last_loaded_at = Some(env.clock.now());
                    state.last_error = None;
                }
                SmallVec::new()
            },

            TodoAction::LoadFailed { generation, error } => {
                tracing::error!(generation, error = %error, "Could not load todos");
                if Self::settle_load(state, generation) {
                    Self::record_failure(state, error.into());
                }
                SmallVec::new()
            },

            TodoAction::TodoPersisted { local_id, todo } => {
                tracing::debug!(local_id = %local_id, id = %todo.id, "Todo persisted");
                match state.get_mut(todo.id) {
                    // A load that raced the create may already have brought it in
                    Some(existing) => *existing = todo,
                    None => state.todos.push(todo),
                }
                state.last_error = None;
                SmallVec::new()
            },

            TodoAction::AddFailed {
                local_id,
                title,
                error,
            } => {
                tracing::error!(local_id = %local_id, title = %title, error = %error, "Could not add todo");
                Self::record_failure(state, error.into());
                SmallVec::new()
            },

            TodoAction::TodoRemoved { id } => {
                tracing::debug!(id = %id, "Removed todo from the server");
                state.remove(id);
                state.last_error = None;
                SmallVec::new()
            },

            TodoAction::RemoveFailed { id, error } => {
                if error.is_not_found() {
                    tracing::warn!(id = %id, "Todo was already gone from the server");
                    state.remove(id);
                    Self::record_failure(state, TodoError::NotFound(id));
                } else {
                    tracing::error!(id = %id, error = %error, "Could not remove todo");
                    Self::record_failure(state, error.into());
                }
                SmallVec::new()
            },

            TodoAction::CompletedRemoved { removed, failed } => {
                tracing::debug!(removed = removed.len(), failed = failed.len(), "Cleared completed todos");
                state.todos.retain(|t| !removed.contains(&t.id));

                for (id, error) in &failed {
                    tracing::error!(id = %id, error = %error, "Could not remove completed todo");
                }
                match failed.into_iter().next() {
                    Some((_, error)) => Self::record_failure(state, error.into()),
                    None => state.last_error = None,
                }
                SmallVec::new()
            },

            TodoAction::TodoUpdated { todo } => {
                if let Some(existing) = state.get_mut(todo.id) {
                    *existing = todo;
                }
                state.last_error = None;
                SmallVec::new()
            },

            TodoAction::UpdateFailed {
                id,
                applied,
                revert,
                error,
            } => {
                if error.is_not_found() {
                    tracing::warn!(id = %id, "Updated todo is gone from the server");
                    state.remove(id);
                    Self::record_failure(state, TodoError::NotFound(id));
                } else {
                    tracing::error!(id = %id, error = %error, "Could not update todo, reverting");
                    if let Some(existing) = state.get_mut(id) {
                        Self::revert_edit(existing, &applied, revert);
                    }
                    Self::record_failure(state, error.into());
                }
                SmallVec::new()
            },
        }
    }
}
