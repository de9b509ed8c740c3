//! In-memory todo service
//!
//! [`TodoBackend`] holds the collection the way the REST service does:
//! numeric ids assigned on create, blank titles rejected, a reset route that
//! replaces everything. It backs both [`InMemoryTodoApi`] (direct calls, no
//! HTTP) and the [`TodoServer`](crate::server::TodoServer) fixture.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use todomvc_core::todo::{ApiError, ApiFuture, NewTodo, Todo, TodoApi, TodoId, TodoPatch};

/// Shared in-memory collection
///
/// Cloning yields another handle to the same collection.
#[derive(Clone, Debug, Default)]
pub struct TodoBackend {
    inner: Arc<Mutex<BackendState>>,
}

#[derive(Debug, Default)]
struct BackendState {
    todos: Vec<Todo>,
    next_id: u64,
}

impl BackendState {
    fn replace(&mut self, todos: Vec<Todo>) {
        self.next_id = todos.iter().map(|t| t.id.value()).max().unwrap_or(0);
        self.todos = todos;
    }
}

fn bad_request(message: &str) -> ApiError {
    ApiError::Status {
        status: 400,
        message: message.to_string(),
    }
}

impl TodoBackend {
    /// Empty collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection seeded with `todos`; new ids continue after the largest seeded id
    #[must_use]
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        let backend = Self::new();
        backend.lock().replace(todos);
        backend
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the collection in insertion order
    #[must_use]
    pub fn todos(&self) -> Vec<Todo> {
        self.lock().todos.clone()
    }

    /// Persist a new record under a fresh numeric id
    ///
    /// The client's placeholder id, if any, is ignored.
    ///
    /// # Errors
    ///
    /// Status 400 if the title is blank.
    pub fn create(&self, todo: NewTodo) -> Result<Todo, ApiError> {
        if todo.title.trim().is_empty() {
            return Err(bad_request("title must not be blank"));
        }

        let mut state = self.lock();
        state.next_id += 1;
        let created = Todo::new(state.next_id, todo.title, todo.completed);
        state.todos.push(created.clone());
        Ok(created)
    }

    /// Look up a record
    ///
    /// # Errors
    ///
    /// `NotFound` if no record has this id.
    pub fn get(&self, id: TodoId) -> Result<Todo, ApiError> {
        self.lock()
            .todos
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(ApiError::NotFound(id))
    }

    /// Apply a partial update
    ///
    /// # Errors
    ///
    /// `NotFound` if no record has this id, status 400 for a blank title.
    pub fn update(&self, id: TodoId, patch: &TodoPatch) -> Result<Todo, ApiError> {
        if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(bad_request("title must not be blank"));
        }

        let mut state = self.lock();
        let todo = state
            .todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(ApiError::NotFound(id))?;
        patch.apply_to(todo);
        Ok(todo.clone())
    }

    /// Remove a record
    ///
    /// # Errors
    ///
    /// `NotFound` if no record has this id.
    pub fn delete(&self, id: TodoId) -> Result<(), ApiError> {
        let mut state = self.lock();
        let position = state
            .todos
            .iter()
            .position(|t| t.id == id)
            .ok_or(ApiError::NotFound(id))?;
        state.todos.remove(position);
        Ok(())
    }

    /// Replace the entire collection
    pub fn reset(&self, todos: Vec<Todo>) {
        self.lock().replace(todos);
    }
}

/// Route of the todo service, used to target injected failures
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiRoute {
    /// `GET /todos`
    List,
    /// `POST /todos`
    Create,
    /// `GET /todos/:id`
    Get,
    /// `PATCH /todos/:id`
    Update,
    /// `DELETE /todos/:id`
    Delete,
    /// `POST /reset`
    Reset,
}

/// A call observed by [`InMemoryTodoApi`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiRequest {
    /// `list()`
    List,
    /// `create(todo)`
    Create(NewTodo),
    /// `get(id)`
    Get(TodoId),
    /// `update(id, patch)`
    Update(TodoId, TodoPatch),
    /// `delete(id)`
    Delete(TodoId),
    /// `reset(todos)` with the number of records
    Reset(usize),
}

impl ApiRequest {
    /// Route the request was made against
    #[must_use]
    pub const fn route(&self) -> ApiRoute {
        match self {
            Self::List => ApiRoute::List,
            Self::Create(_) => ApiRoute::Create,
            Self::Get(_) => ApiRoute::Get,
            Self::Update(..) => ApiRoute::Update,
            Self::Delete(_) => ApiRoute::Delete,
            Self::Reset(_) => ApiRoute::Reset,
        }
    }
}

#[derive(Debug, Default)]
struct Instrumentation {
    failures: HashMap<ApiRoute, VecDeque<ApiError>>,
    requests: Vec<ApiRequest>,
    latency: Duration,
}

/// [`TodoApi`] over a [`TodoBackend`] without HTTP
///
/// Records every call and can be told to fail upcoming calls per route.
///
/// # Example
///
/// ```
/// use todomvc_testing::{ApiRoute, InMemoryTodoApi};
/// use todomvc_core::todo::ApiError;
///
/// let api = InMemoryTodoApi::new();
/// api.fail_next(ApiRoute::List, ApiError::Timeout);
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryTodoApi {
    backend: TodoBackend,
    instrumentation: Arc<Mutex<Instrumentation>>,
}

impl InMemoryTodoApi {
    /// API over an empty collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// API over an existing backend
    #[must_use]
    pub fn with_backend(backend: TodoBackend) -> Self {
        Self {
            backend,
            instrumentation: Arc::default(),
        }
    }

    /// The underlying collection
    #[must_use]
    pub const fn backend(&self) -> &TodoBackend {
        &self.backend
    }

    fn lock(&self) -> MutexGuard<'_, Instrumentation> {
        self.instrumentation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next call on `route` fail with `error`
    ///
    /// Calls queue up: injecting twice fails the next two calls.
    pub fn fail_next(&self, route: ApiRoute, error: ApiError) {
        self.lock().failures.entry(route).or_default().push_back(error);
    }

    /// Delay every subsequent call by `latency`
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    /// Calls observed so far, oldest first
    #[must_use]
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock().requests.clone()
    }

    /// Number of calls observed on `route`
    #[must_use]
    pub fn count(&self, route: ApiRoute) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.route() == route)
            .count()
    }

    /// Log the call, wait out the latency, then fail if a failure is queued
    async fn intercept(&self, request: ApiRequest) -> Result<(), ApiError> {
        let route = request.route();
        let latency = {
            let mut instrumentation = self.lock();
            instrumentation.requests.push(request);
            instrumentation.latency
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let failure = self
            .lock()
            .failures
            .get_mut(&route)
            .and_then(VecDeque::pop_front);

        match failure {
            Some(error) => {
                tracing::debug!(?route, %error, "Injected failure");
                Err(error)
            },
            None => Ok(()),
        }
    }
}

impl TodoApi for InMemoryTodoApi {
    fn list(&self) -> ApiFuture<'_, Vec<Todo>> {
        Box::pin(async move {
            self.intercept(ApiRequest::List).await?;
            Ok(self.backend.todos())
        })
    }

    fn create(&self, todo: NewTodo) -> ApiFuture<'_, Todo> {
        Box::pin(async move {
            self.intercept(ApiRequest::Create(todo.clone())).await?;
            self.backend.create(todo)
        })
    }

    fn get(&self, id: TodoId) -> ApiFuture<'_, Todo> {
        Box::pin(async move {
            self.intercept(ApiRequest::Get(id)).await?;
            self.backend.get(id)
        })
    }

    fn update(&self, id: TodoId, patch: TodoPatch) -> ApiFuture<'_, Todo> {
        Box::pin(async move {
            self.intercept(ApiRequest::Update(id, patch.clone())).await?;
            self.backend.update(id, &patch)
        })
    }

    fn delete(&self, id: TodoId) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            self.intercept(ApiRequest::Delete(id)).await?;
            self.backend.delete(id)
        })
    }

    fn reset(&self, todos: Vec<Todo>) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            self.intercept(ApiRequest::Reset(todos.len())).await?;
            self.backend.reset(todos);
            Ok(())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn create_assigns_sequential_ids() {
        let backend = TodoBackend::new();
        let first = backend.create(NewTodo::new("first", false)).unwrap();
        let second = backend
            .create(NewTodo::new("second", false).with_local_id("0123456789"))
            .unwrap();

        assert_eq!(first.id, TodoId::new(1));
        assert_eq!(second.id, TodoId::new(2));
    }

    #[test]
    fn ids_continue_after_seeded_records() {
        let backend = TodoBackend::with_todos(vec![Todo::new(5, "seeded", false)]);
        let created = backend.create(NewTodo::new("next", false)).unwrap();
        assert_eq!(created.id, TodoId::new(6));
    }

    #[test]
    fn blank_titles_are_rejected() {
        let backend = TodoBackend::new();
        let result = backend.create(NewTodo::new("   ", false));
        assert!(matches!(result, Err(ApiError::Status { status: 400, .. })));

        let todo = backend.create(NewTodo::new("kept", false)).unwrap();
        let result = backend.update(todo.id, &TodoPatch::title(""));
        assert!(matches!(result, Err(ApiError::Status { status: 400, .. })));
        assert_eq!(backend.get(todo.id).unwrap().title, "kept");
    }

    #[test]
    fn missing_records_are_not_found() {
        let backend = TodoBackend::new();
        let id = TodoId::new(3);
        assert_eq!(backend.get(id), Err(ApiError::NotFound(id)));
        assert_eq!(backend.delete(id), Err(ApiError::NotFound(id)));
        assert_eq!(
            backend.update(id, &TodoPatch::completed(true)),
            Err(ApiError::NotFound(id))
        );
    }

    #[test]
    fn reset_replaces_collection() {
        let backend = TodoBackend::with_todos(vec![Todo::new(1, "old", false)]);
        backend.reset(vec![Todo::new(2, "new", true)]);
        assert_eq!(backend.todos(), vec![Todo::new(2, "new", true)]);
    }

    #[tokio::test]
    async fn injected_failure_applies_once() {
        let api = InMemoryTodoApi::new();
        api.fail_next(ApiRoute::List, ApiError::Timeout);

        assert_eq!(api.list().await, Err(ApiError::Timeout));
        assert_eq!(api.list().await, Ok(vec![]));
        assert_eq!(api.count(ApiRoute::List), 2);
    }

    #[tokio::test]
    async fn failed_calls_leave_backend_untouched() {
        let api = InMemoryTodoApi::new();
        api.fail_next(ApiRoute::Create, ApiError::Request("offline".to_string()));

        let result = api.create(NewTodo::new("lost", false)).await;

        assert!(result.is_err());
        assert!(api.backend().todos().is_empty());
        assert_eq!(
            api.requests(),
            vec![ApiRequest::Create(NewTodo::new("lost", false))]
        );
    }
}
