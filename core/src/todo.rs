//! Todo records and the remote todo service abstraction.
//!
//! The client keeps a denormalized cache of the records held by a REST
//! service. This module defines the wire types shared by the store, the HTTP
//! client and the test fixtures, and the [`TodoApi`] trait the store talks to.
//!
//! # Identity
//!
//! The server assigns every record a numeric [`TodoId`], which is canonical.
//! A client creating a record sends a random placeholder id along with it
//! ([`NewTodo::id`]); the placeholder only correlates the request with its
//! response and is dropped once the server's record arrives.
//!
//! # Implementations
//!
//! - `HttpTodoApi` (in `todomvc-client`): Production implementation over `reqwest`
//! - `InMemoryTodoApi` (in `todomvc-testing`): Fast, deterministic testing
//!
//! # Example
//!
//! ```no_run
//! use todomvc_core::todo::{ApiError, NewTodo, TodoApi, TodoPatch};
//!
//! async fn example<A: TodoApi>(api: &A) -> Result<(), ApiError> {
//!     let created = api.create(NewTodo::new("write docs", false)).await?;
//!     api.update(created.id, TodoPatch::completed(true)).await?;
//!     let all = api.list().await?;
//!     assert!(all.iter().any(|todo| todo.id == created.id));
//!     api.delete(created.id).await?;
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Server-assigned identifier of a persisted todo
///
/// Serialized as a JSON number. Deserialization also accepts a string of
/// digits, which is how records created with a client placeholder id come
/// back from some backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TodoId(u64);

impl TodoId {
    /// Creates a `TodoId` from its numeric value
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric value
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TodoId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for TodoId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl<'de> Deserialize<'de> for TodoId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(TodoIdVisitor)
    }
}

struct TodoIdVisitor;

impl serde::de::Visitor<'_> for TodoIdVisitor {
    type Value = TodoId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer or a string of digits")
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<TodoId, E> {
        Ok(TodoId(v))
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<TodoId, E> {
        u64::try_from(v)
            .map(TodoId)
            .map_err(|_| E::invalid_value(serde::de::Unexpected::Signed(v), &self))
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<TodoId, E> {
        v.parse()
            .map_err(|_| E::invalid_value(serde::de::Unexpected::Str(v), &self))
    }
}

/// A single todo record as stored by the remote service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Canonical identifier
    pub id: TodoId,
    /// Display text
    pub title: String,
    /// Whether the todo is completed
    pub completed: bool,
}

impl Todo {
    /// Creates a todo record
    #[must_use]
    pub fn new(id: impl Into<TodoId>, title: impl Into<String>, completed: bool) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed,
        }
    }
}

/// Body of `POST /todos`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTodo {
    /// Display text
    pub title: String,
    /// Initial completion state
    pub completed: bool,
    /// Client-side placeholder id; the server replaces it with its own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl NewTodo {
    /// Creates a request body without a placeholder id
    #[must_use]
    pub fn new(title: impl Into<String>, completed: bool) -> Self {
        Self {
            title: title.into(),
            completed,
            id: None,
        }
    }

    /// Attaches a client-side placeholder id
    #[must_use]
    pub fn with_local_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Body of `PATCH /todos/:id`; absent fields are left untouched
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPatch {
    /// New display text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New completion state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TodoPatch {
    /// Patch that only sets the completion flag
    #[must_use]
    pub const fn completed(completed: bool) -> Self {
        Self {
            title: None,
            completed: Some(completed),
        }
    }

    /// Patch that only sets the title
    #[must_use]
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            completed: None,
        }
    }

    /// Applies the patch to a record in place
    pub fn apply_to(&self, todo: &mut Todo) {
        if let Some(title) = &self.title {
            todo.title.clone_from(title);
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
    }
}

/// Body of `POST /reset`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetRequest {
    /// Records replacing the entire collection
    pub todos: Vec<Todo>,
}

/// Errors that can occur when talking to the remote todo service.
///
/// Values are cheap to clone so they can travel inside actions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request could not be sent or the connection failed
    #[error("Request failed: {0}")]
    Request(String),

    /// The request exceeded the client timeout
    #[error("Request timed out")]
    Timeout,

    /// The record does not exist on the server
    #[error("Todo {0} not found")]
    NotFound(TodoId),

    /// The server answered with an unexpected status
    #[error("API error (status {status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// The response body could not be decoded
    #[error("Response decoding failed: {0}")]
    Decode(String),
}

impl ApiError {
    /// Returns true if the server reported the record as missing
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Future returned by [`TodoApi`] methods
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// The remote todo service.
///
/// One method per route of the REST contract:
///
/// | Method | Route |
/// |---|---|
/// | [`list`](TodoApi::list) | `GET /todos` |
/// | [`create`](TodoApi::create) | `POST /todos` |
/// | [`get`](TodoApi::get) | `GET /todos/:id` |
/// | [`update`](TodoApi::update) | `PATCH /todos/:id` |
/// | [`delete`](TodoApi::delete) | `DELETE /todos/:id` |
/// | [`reset`](TodoApi::reset) | `POST /reset` |
///
/// # Dyn Compatibility
///
/// This trait uses explicit `Pin<Box<dyn Future>>` returns instead of `async fn`
/// to enable trait object usage (`Arc<dyn TodoApi>`). Reducers build effects
/// that capture the API handle, so it must be shareable and `'static`.
pub trait TodoApi: Send + Sync {
    /// Fetch the full collection.
    ///
    /// # Errors
    ///
    /// Any transport, status or decoding failure.
    fn list(&self) -> ApiFuture<'_, Vec<Todo>>;

    /// Persist a new record and return it with its server-assigned id.
    ///
    /// # Errors
    ///
    /// Any transport, status or decoding failure.
    fn create(&self, todo: NewTodo) -> ApiFuture<'_, Todo>;

    /// Fetch a single record.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] if the id is unknown, otherwise any transport,
    /// status or decoding failure.
    fn get(&self, id: TodoId) -> ApiFuture<'_, Todo>;

    /// Apply a partial update and return the updated record.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] if the id is unknown, otherwise any transport,
    /// status or decoding failure.
    fn update(&self, id: TodoId, patch: TodoPatch) -> ApiFuture<'_, Todo>;

    /// Delete a record.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] if the id is unknown, otherwise any transport
    /// or status failure.
    fn delete(&self, id: TodoId) -> ApiFuture<'_, ()>;

    /// Replace the entire collection (test orchestration only).
    ///
    /// # Errors
    ///
    /// Any transport or status failure.
    fn reset(&self, todos: Vec<Todo>) -> ApiFuture<'_, ()>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn todo_id_display() {
        assert_eq!(TodoId::new(42).to_string(), "42");
    }

    #[test]
    fn todo_deserializes_numeric_id() {
        let todo: Todo =
            serde_json::from_value(json!({"id": 7, "title": "first", "completed": false})).unwrap();
        assert_eq!(todo, Todo::new(7, "first", false));
    }

    #[test]
    fn todo_deserializes_digit_string_id() {
        let todo: Todo =
            serde_json::from_value(json!({"id": "4821937465", "title": "seeded", "completed": true}))
                .unwrap();
        assert_eq!(todo, Todo::new(4_821_937_465, "seeded", true));
        assert_eq!(serde_json::to_value(todo.id).unwrap(), json!(4_821_937_465_u64));
    }

    #[test]
    fn todo_id_rejects_non_numeric_values() {
        assert!(serde_json::from_value::<TodoId>(json!("abc")).is_err());
        assert!(serde_json::from_value::<TodoId>(json!(-3)).is_err());
        assert!(serde_json::from_value::<TodoId>(json!(1.5)).is_err());
    }

    #[test]
    fn new_todo_omits_missing_placeholder() {
        let body = serde_json::to_value(NewTodo::new("first", false)).unwrap();
        assert_eq!(body, json!({"title": "first", "completed": false}));

        let body =
            serde_json::to_value(NewTodo::new("first", false).with_local_id("0123456789")).unwrap();
        assert_eq!(body["id"], "0123456789");
    }

    #[test]
    fn patch_serializes_only_present_fields() {
        let body = serde_json::to_value(TodoPatch::completed(true)).unwrap();
        assert_eq!(body, json!({"completed": true}));
    }

    #[test]
    fn patch_applies_present_fields() {
        let mut todo = Todo::new(1, "old", false);
        TodoPatch::title("new").apply_to(&mut todo);
        assert_eq!(todo, Todo::new(1, "new", false));
        TodoPatch::completed(true).apply_to(&mut todo);
        assert_eq!(todo, Todo::new(1, "new", true));
    }

    #[test]
    fn not_found_is_classified() {
        assert!(ApiError::NotFound(TodoId::new(1)).is_not_found());
        assert!(!ApiError::Timeout.is_not_found());
    }

    proptest::proptest! {
        #[test]
        fn patch_touches_only_present_fields(
            id in proptest::prelude::any::<u64>(),
            title in ".{0,16}",
            completed in proptest::prelude::any::<bool>(),
            new_title in proptest::option::of(".{0,16}"),
            new_completed in proptest::option::of(proptest::prelude::any::<bool>()),
        ) {
            let mut todo = Todo::new(id, title.clone(), completed);
            let patch = TodoPatch { title: new_title.clone(), completed: new_completed };
            patch.apply_to(&mut todo);

            proptest::prop_assert_eq!(todo.id, TodoId::new(id));
            proptest::prop_assert_eq!(todo.title, new_title.unwrap_or(title));
            proptest::prop_assert_eq!(todo.completed, new_completed.unwrap_or(completed));
        }
    }
}
