//! Error types for the todo store and the view binding.

use thiserror::Error;
use todomvc_core::todo::{ApiError, TodoId};
use todomvc_runtime::StoreError;

/// Errors recorded by the todo store in `TodoState::last_error`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TodoError {
    /// A title was blank or whitespace only
    #[error("Todo title cannot be empty")]
    EmptyTitle,

    /// The todo does not exist (locally, or any more on the server)
    #[error("Todo {0} not found")]
    NotFound(TodoId),

    /// The remote service call failed
    #[error(transparent)]
    Remote(#[from] ApiError),
}

/// Errors returned when submitting the new-todo input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The input was empty or whitespace only
    #[error("Cannot add a blank todo")]
    EmptyInput,

    /// The store refused the action
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_errors_convert() {
        let error: TodoError = ApiError::Timeout.into();
        assert_eq!(error, TodoError::Remote(ApiError::Timeout));
        assert_eq!(error.to_string(), "Request timed out");
    }

    #[test]
    fn submit_error_messages() {
        assert_eq!(SubmitError::EmptyInput.to_string(), "Cannot add a blank todo");
        let error: SubmitError = StoreError::ShutdownInProgress.into();
        assert_eq!(error.to_string(), "Store is shutting down");
    }
}
