//! View binding: derived, render-ready views of the todo store.
//!
//! Everything here is a pure function of the store state and the current
//! [`Visibility`]; nothing in this module mutates state.

use crate::error::SubmitError;
use crate::types::TodoState;
use std::fmt;
use todomvc_core::todo::Todo;

/// Which todos the list shows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Every todo
    #[default]
    All,
    /// Incomplete todos
    Active,
    /// Completed todos
    Completed,
}

impl Visibility {
    /// Every visibility, in footer order
    pub const ALL: [Self; 3] = [Self::All, Self::Active, Self::Completed];

    /// Visibility for a location hash such as `#/active`
    ///
    /// Accepts the route with or without the `#` and `#/` prefixes. Empty or
    /// unknown routes fall back to [`Visibility::All`].
    #[must_use]
    pub fn from_hash(hash: &str) -> Self {
        let route = hash.trim();
        let route = route.strip_prefix('#').unwrap_or(route);
        let route = route.strip_prefix('/').unwrap_or(route);

        match route {
            "active" => Self::Active,
            "completed" => Self::Completed,
            _ => Self::All,
        }
    }

    /// Route name: `all`, `active` or `completed`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    /// Location hash routing to this visibility
    #[must_use]
    pub fn hash(self) -> String {
        format!("#/{}", self.as_str())
    }

    /// Whether `todo` is shown under this visibility
    #[must_use]
    pub const fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Active => !todo.completed,
            Self::Completed => todo.completed,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Todos shown under `visibility`, in list order
#[must_use]
pub fn filtered_todos(todos: &[Todo], visibility: Visibility) -> Vec<Todo> {
    todos
        .iter()
        .filter(|todo| visibility.matches(todo))
        .cloned()
        .collect()
}

/// Number of incomplete todos
#[must_use]
pub fn remaining(todos: &[Todo]) -> usize {
    todos.iter().filter(|todo| !todo.completed).count()
}

/// `word` with an `s` appended unless `count` is exactly one
#[must_use]
pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

/// Checks the new-todo input before it is submitted
///
/// # Errors
///
/// [`SubmitError::EmptyInput`] if the input is empty or whitespace only.
pub fn validate_submission(text: &str) -> Result<&str, SubmitError> {
    let title = text.trim();
    if title.is_empty() {
        Err(SubmitError::EmptyInput)
    } else {
        Ok(title)
    }
}

/// Everything a front end needs to draw the todo list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewModel {
    /// Todos shown under the current visibility
    pub items: Vec<Todo>,
    /// Number of incomplete todos
    pub remaining: usize,
    /// Footer text, e.g. `"1 item left"`
    pub remaining_label: String,
    /// The list is hidden while there are no todos at all
    pub list_visible: bool,
    /// The footer is hidden while there are no todos at all
    pub footer_visible: bool,
    /// "Clear completed" is offered only if something is completed
    pub clear_completed_visible: bool,
    /// Current visibility
    pub visibility: Visibility,
    /// A load is in flight
    pub loading: bool,
}

impl ViewModel {
    /// Derives the view of `state` under `visibility`
    #[must_use]
    pub fn new(state: &TodoState, visibility: Visibility) -> Self {
        let remaining = remaining(&state.todos);
        let any = !state.todos.is_empty();

        Self {
            items: filtered_todos(&state.todos, visibility),
            remaining,
            remaining_label: format!("{remaining} {} left", pluralize("item", remaining)),
            list_visible: any,
            footer_visible: any,
            clear_completed_visible: remaining < state.todos.len(),
            visibility,
            loading: state.loading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todos() -> Vec<Todo> {
        vec![
            Todo::new(1, "simple", true),
            Todo::new(2, "hard", false),
            Todo::new(3, "medium", false),
        ]
    }

    #[test]
    fn hash_routes() {
        assert_eq!(Visibility::from_hash("#/active"), Visibility::Active);
        assert_eq!(Visibility::from_hash("#/completed"), Visibility::Completed);
        assert_eq!(Visibility::from_hash("#/all"), Visibility::All);
        assert_eq!(Visibility::from_hash("active"), Visibility::Active);
        assert_eq!(Visibility::from_hash("#completed"), Visibility::Completed);
    }

    #[test]
    fn unknown_or_empty_hash_shows_all() {
        assert_eq!(Visibility::from_hash(""), Visibility::All);
        assert_eq!(Visibility::from_hash("#/"), Visibility::All);
        assert_eq!(Visibility::from_hash("#/nope"), Visibility::All);
        assert_eq!(Visibility::from_hash("#/Active"), Visibility::All);
    }

    #[test]
    fn hash_round_trips_for_every_visibility() {
        for visibility in Visibility::ALL {
            assert_eq!(Visibility::from_hash(&visibility.hash()), visibility);
        }
    }

    #[test]
    fn filters() {
        let todos = todos();
        assert_eq!(filtered_todos(&todos, Visibility::All), todos);

        let active: Vec<u64> = filtered_todos(&todos, Visibility::Active)
            .iter()
            .map(|t| t.id.value())
            .collect();
        assert_eq!(active, vec![2, 3]);

        let completed: Vec<u64> = filtered_todos(&todos, Visibility::Completed)
            .iter()
            .map(|t| t.id.value())
            .collect();
        assert_eq!(completed, vec![1]);
    }

    #[test]
    fn pluralizes() {
        assert_eq!(pluralize("item", 0), "items");
        assert_eq!(pluralize("item", 1), "item");
        assert_eq!(pluralize("item", 2), "items");
    }

    #[test]
    fn blank_submission_is_rejected() {
        assert_eq!(validate_submission(""), Err(SubmitError::EmptyInput));
        assert_eq!(validate_submission(" \t "), Err(SubmitError::EmptyInput));
        assert_eq!(validate_submission("  milk "), Ok("milk"));
    }

    #[test]
    fn view_model_for_list() {
        let state = TodoState::with_todos(todos());
        let view = ViewModel::new(&state, Visibility::Active);

        assert_eq!(view.items.len(), 2);
        assert_eq!(view.remaining, 2);
        assert_eq!(view.remaining_label, "2 items left");
        assert!(view.list_visible);
        assert!(view.footer_visible);
        assert!(view.clear_completed_visible);
    }

    #[test]
    fn view_model_hides_list_and_footer_when_empty() {
        let view = ViewModel::new(&TodoState::new(), Visibility::All);

        assert!(view.items.is_empty());
        assert_eq!(view.remaining_label, "0 items left");
        assert!(!view.list_visible);
        assert!(!view.footer_visible);
        assert!(!view.clear_completed_visible);
    }

    #[test]
    fn view_model_singular_label() {
        let state = TodoState::with_todos(vec![Todo::new(1, "one", false)]);
        assert_eq!(
            ViewModel::new(&state, Visibility::All).remaining_label,
            "1 item left"
        );
    }
}
