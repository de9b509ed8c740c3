//! The controller: the one entry point front ends talk to.
//!
//! Every intent becomes an action sent to the store; every read goes through
//! [`Store::state`](todomvc_runtime::Store::state). The controller keeps no
//! todo data of its own, only the current [`Visibility`], which is view state
//! and lives in a `watch` channel so front ends can follow route changes.
//!
//! Intents return the action's [`EffectHandle`] tracked in cascading mode:
//! awaiting it waits for the request *and* for the outcome it feeds back, so
//! after `controller.submit("milk").await?.wait().await` the new todo is in
//! the list (or `last_error` says why it is not).

use crate::error::{SubmitError, TodoError};
use crate::reducer::TodoStore;
use crate::types::TodoAction;
use crate::view::{self, ViewModel, Visibility};
use std::sync::Arc;
use std::time::Duration;
use todomvc_core::todo::{Todo, TodoId};
use todomvc_runtime::{EffectHandle, StoreError};
use tokio::sync::watch;

/// Front-end facade over the todo store
#[derive(Clone)]
pub struct TodoController {
    store: TodoStore,
    visibility: Arc<watch::Sender<Visibility>>,
}

impl TodoController {
    /// Creates a controller showing every todo
    #[must_use]
    pub fn new(store: TodoStore) -> Self {
        let (visibility, _) = watch::channel(Visibility::All);
        Self {
            store,
            visibility: Arc::new(visibility),
        }
    }

    /// The underlying store
    #[must_use]
    pub const fn store(&self) -> &TodoStore {
        &self.store
    }

    async fn dispatch(&self, action: TodoAction) -> Result<EffectHandle, StoreError> {
        tracing::debug!(action = action.name(), "Dispatching");
        self.store.send_cascading(action).await
    }

    // ========== Intents ==========

    /// Sets the wait applied before each load
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] once the store is shutting down.
    pub async fn set_delay(&self, delay: Duration) -> Result<EffectHandle, StoreError> {
        self.dispatch(TodoAction::SetDelay { delay }).await
    }

    /// Sets the wait applied before each add is sent
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] once the store is shutting down.
    pub async fn set_add_todo_delay(&self, delay: Duration) -> Result<EffectHandle, StoreError> {
        self.dispatch(TodoAction::SetAddTodoDelay { delay }).await
    }

    /// Reloads the list from the server
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] once the store is shutting down.
    pub async fn load_todos(&self) -> Result<EffectHandle, StoreError> {
        self.dispatch(TodoAction::LoadTodos).await
    }

    /// Reloads the list and waits until the load has settled
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] once the store is shutting down.
    pub async fn load_todos_and_wait(&self) -> Result<(), StoreError> {
        self.load_todos().await?.wait().await;
        Ok(())
    }

    /// Replaces the new-todo input text
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] once the store is shutting down.
    pub async fn set_new_todo(&self, text: impl Into<String>) -> Result<EffectHandle, StoreError> {
        self.dispatch(TodoAction::SetNewTodo { text: text.into() })
            .await
    }

    /// Empties the new-todo input
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] once the store is shutting down.
    pub async fn clear_new_todo(&self) -> Result<EffectHandle, StoreError> {
        self.dispatch(TodoAction::ClearNewTodo).await
    }

    /// Submits the new-todo input
    ///
    /// Validates `text`, adds it as a todo and clears the input. The returned
    /// handle completes once the add has settled.
    ///
    /// # Errors
    ///
    /// [`SubmitError::EmptyInput`] for blank input, in which case nothing is
    /// sent; [`SubmitError::Store`] if the store refuses the actions.
    pub async fn submit(&self, text: &str) -> Result<EffectHandle, SubmitError> {
        let title = view::validate_submission(text)?;

        self.set_new_todo(title).await?;
        let handle = self.dispatch(TodoAction::AddTodo).await?;
        self.clear_new_todo().await?;

        Ok(handle)
    }

    /// Adds a todo with explicit fields, bypassing the input
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] once the store is shutting down.
    pub async fn add_entire_todo(
        &self,
        title: impl Into<String>,
        completed: bool,
    ) -> Result<EffectHandle, StoreError> {
        self.dispatch(TodoAction::AddEntireTodo {
            title: title.into(),
            completed,
        })
        .await
    }

    /// Deletes a todo
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] once the store is shutting down.
    pub async fn remove_todo(&self, id: TodoId) -> Result<EffectHandle, StoreError> {
        self.dispatch(TodoAction::RemoveTodo { id }).await
    }

    /// Deletes every completed todo
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] once the store is shutting down.
    pub async fn remove_completed(&self) -> Result<EffectHandle, StoreError> {
        self.dispatch(TodoAction::RemoveCompleted).await
    }

    /// Flips the completion state of a todo
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] once the store is shutting down.
    pub async fn toggle(&self, id: TodoId) -> Result<EffectHandle, StoreError> {
        self.dispatch(TodoAction::ToggleTodo { id }).await
    }

    /// Changes the title of a todo
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] once the store is shutting down.
    pub async fn rename(
        &self,
        id: TodoId,
        title: impl Into<String>,
    ) -> Result<EffectHandle, StoreError> {
        self.dispatch(TodoAction::RenameTodo {
            id,
            title: title.into(),
        })
        .await
    }

    /// Follows a location hash; unknown routes show every todo
    pub fn navigate(&self, hash: &str) -> Visibility {
        let visibility = Visibility::from_hash(hash);
        self.visibility.send_replace(visibility);
        visibility
    }

    /// Stops accepting intents and waits for in-flight requests
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownTimeout`] if requests are still running after `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        self.store.shutdown(timeout).await
    }

    // ========== Views ==========

    /// Current visibility
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        *self.visibility.borrow()
    }

    /// Receiver notified on every route change
    #[must_use]
    pub fn subscribe_visibility(&self) -> watch::Receiver<Visibility> {
        self.visibility.subscribe()
    }

    /// Every todo, in list order
    pub async fn todos(&self) -> Vec<Todo> {
        self.store.state(|s| s.todos.clone()).await
    }

    /// Todos shown under the current visibility
    pub async fn filtered_todos(&self) -> Vec<Todo> {
        let visibility = self.visibility();
        self.store
            .state(|s| view::filtered_todos(&s.todos, visibility))
            .await
    }

    /// Number of incomplete todos
    pub async fn remaining(&self) -> usize {
        self.store.state(|s| view::remaining(&s.todos)).await
    }

    /// Whether a load is in flight
    pub async fn loading(&self) -> bool {
        self.store.state(|s| s.loading).await
    }

    /// Current new-todo input text
    pub async fn new_todo(&self) -> String {
        self.store.state(|s| s.new_todo.clone()).await
    }

    /// Whether a load has settled since start
    pub async fn is_page_ready(&self) -> bool {
        self.store.state(|s| s.page_ready).await
    }

    /// Most recent failure
    pub async fn last_error(&self) -> Option<TodoError> {
        self.store.state(|s| s.last_error.clone()).await
    }

    /// Marker for [`error_since`](Self::error_since), taken before an intent
    pub async fn error_mark(&self) -> u64 {
        self.store.state(|s| s.errors_recorded).await
    }

    /// The most recent failure, if any failure was recorded after `mark`
    ///
    /// Unlike [`last_error`](Self::last_error) this ignores failures that
    /// were already reported before `mark` was taken.
    pub async fn error_since(&self, mark: u64) -> Option<TodoError> {
        self.store
            .state(|s| {
                if s.errors_recorded > mark {
                    s.last_error.clone()
                } else {
                    None
                }
            })
            .await
    }

    /// Render-ready view under the current visibility
    pub async fn view_model(&self) -> ViewModel {
        let visibility = self.visibility();
        self.store
            .state(|s| ViewModel::new(s, visibility))
            .await
    }
}
