//! State and actions of the todo store.
//!
//! The store mirrors the remote collection. Intents describe what the view
//! asks for; outcomes are fed back by effects once the remote service has
//! answered. Nothing reaches `todos` without going through an outcome, except
//! the optimistic local edits of toggle and rename.

use crate::error::TodoError;
use chrono::{DateTime, Utc};
use std::time::Duration;
use todomvc_core::todo::{ApiError, Todo, TodoId, TodoPatch};
use todomvc_macros::Action;

/// State of the todo store
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoState {
    /// Client-side cache of the remote collection, in server order
    pub todos: Vec<Todo>,
    /// Text of the new-todo input
    pub new_todo: String,
    /// True while the latest load is in flight
    pub loading: bool,
    /// Artificial wait before each load starts
    pub delay: Duration,
    /// Artificial wait before each add is sent
    pub add_todo_delay: Duration,
    /// Generation of the most recently issued load
    pub load_generation: u64,
    /// Number of loads that have settled, successfully or not
    pub loads_settled: u64,
    /// Set once the first load has settled
    pub page_ready: bool,
    /// When the todos were last replaced by a load
    pub last_loaded_at: Option<DateTime<Utc>>,
    /// Most recent failure
    pub last_error: Option<TodoError>,
    /// Failures recorded so far; bumped together with `last_error`
    pub errors_recorded: u64,
}

impl TodoState {
    /// Creates an empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state already holding `todos`
    #[must_use]
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        Self {
            todos,
            ..Self::default()
        }
    }

    /// Returns a todo by ID
    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// Returns a mutable todo by ID
    pub fn get_mut(&mut self, id: TodoId) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|t| t.id == id)
    }

    /// Removes a todo by ID, returning it if it was present
    pub fn remove(&mut self, id: TodoId) -> Option<Todo> {
        let position = self.todos.iter().position(|t| t.id == id)?;
        Some(self.todos.remove(position))
    }
}

/// Actions of the todo store
///
/// `#[intent]` variants are sent by the view; `#[outcome]` variants are only
/// produced by effects. `BeginLoad` is the internal second step of a load.
#[derive(Action, Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    // ========== Intents ==========
    /// Set the wait applied before each load
    #[intent]
    SetDelay {
        /// Wait duration
        delay: Duration,
    },

    /// Set the wait applied before each add is sent
    #[intent]
    SetAddTodoDelay {
        /// Wait duration
        delay: Duration,
    },

    /// Reload the collection from the server
    #[intent]
    LoadTodos,

    /// Replace the new-todo input text
    #[intent]
    SetNewTodo {
        /// Input text
        text: String,
    },

    /// Empty the new-todo input
    #[intent]
    ClearNewTodo,

    /// Create a todo from the new-todo input
    #[intent]
    AddTodo,

    /// Create a todo from explicit fields
    #[intent]
    AddEntireTodo {
        /// Title of the todo
        title: String,
        /// Initial completion state
        completed: bool,
    },

    /// Delete a todo
    #[intent]
    RemoveTodo {
        /// Todo to delete
        id: TodoId,
    },

    /// Delete every completed todo
    #[intent]
    RemoveCompleted,

    /// Flip the completion state of a todo
    #[intent]
    ToggleTodo {
        /// Todo to toggle
        id: TodoId,
    },

    /// Change the title of a todo
    #[intent]
    RenameTodo {
        /// Todo to rename
        id: TodoId,
        /// New title
        title: String,
    },

    /// Start the fetch of a load once its delay has elapsed
    BeginLoad {
        /// Generation of the load
        generation: u64,
    },

    // ========== Outcomes ==========
    /// The server returned the collection
    #[outcome]
    TodosLoaded {
        /// Generation of the load
        generation: u64,
        /// Records returned by the server
        todos: Vec<Todo>,
    },

    /// A load failed
    #[outcome]
    LoadFailed {
        /// Generation of the load
        generation: u64,
        /// Cause
        error: ApiError,
    },

    /// The server persisted a new todo
    #[outcome]
    TodoPersisted {
        /// Placeholder id sent with the create
        local_id: String,
        /// Record with its server-assigned id
        todo: Todo,
    },

    /// Creating a todo failed
    #[outcome]
    AddFailed {
        /// Placeholder id sent with the create
        local_id: String,
        /// Title that was not persisted
        title: String,
        /// Cause
        error: ApiError,
    },

    /// The server deleted a todo
    #[outcome]
    TodoRemoved {
        /// Deleted todo
        id: TodoId,
    },

    /// Deleting a todo failed
    #[outcome]
    RemoveFailed {
        /// Todo that was not deleted
        id: TodoId,
        /// Cause
        error: ApiError,
    },

    /// The completed todos were deleted, one by one
    #[outcome]
    CompletedRemoved {
        /// Todos that are gone from the server
        removed: Vec<TodoId>,
        /// Todos whose deletion failed
        failed: Vec<(TodoId, ApiError)>,
    },

    /// The server applied an update
    #[outcome]
    TodoUpdated {
        /// Record as stored by the server
        todo: Todo,
    },

    /// An update failed
    #[outcome]
    UpdateFailed {
        /// Todo the update was for
        id: TodoId,
        /// Fields as they were edited locally and sent
        applied: TodoPatch,
        /// The same fields as they were before the edit
        revert: TodoPatch,
        /// Cause
        error: ApiError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> TodoState {
        TodoState::with_todos(vec![
            Todo::new(1, "first", false),
            Todo::new(2, "second", true),
            Todo::new(3, "third", false),
        ])
    }

    #[test]
    fn todo_state_remove_keeps_order() {
        let mut state = state();
        let removed = state.remove(TodoId::new(2));

        assert_eq!(removed, Some(Todo::new(2, "second", true)));
        let ids: Vec<u64> = state.todos.iter().map(|t| t.id.value()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(state.remove(TodoId::new(2)), None);
    }

    #[test]
    fn todo_action_is_intent() {
        let action = TodoAction::RemoveTodo {
            id: TodoId::new(1),
        };
        assert!(action.is_intent());
        assert!(!action.is_outcome());
    }

    #[test]
    fn todo_action_is_outcome() {
        let action = TodoAction::TodoRemoved {
            id: TodoId::new(1),
        };
        assert!(action.is_outcome());
        assert!(!action.is_intent());
    }

    #[test]
    fn begin_load_is_internal() {
        let action = TodoAction::BeginLoad { generation: 1 };
        assert!(!action.is_intent());
        assert!(!action.is_outcome());
        assert_eq!(action.name(), "BeginLoad");
    }
}
