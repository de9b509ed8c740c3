//! # TodoMVC Client
//!
//! `reqwest` implementation of [`TodoApi`] against the todo REST service.
//!
//! | Method | Route |
//! |---|---|
//! | `list` | `GET /todos` |
//! | `create` | `POST /todos` |
//! | `get` | `GET /todos/:id` |
//! | `update` | `PATCH /todos/:id` |
//! | `delete` | `DELETE /todos/:id` |
//! | `reset` | `POST /reset` |
//!
//! Every request carries a fixed timeout ([`DEFAULT_TIMEOUT`] unless
//! configured). A request that exceeds it fails with [`ApiError::Timeout`].
//!
//! # Example
//!
//! ```no_run
//! use todomvc_client::HttpTodoApi;
//! use todomvc_core::todo::{ApiError, TodoApi};
//!
//! async fn print_titles() -> Result<(), ApiError> {
//!     let api = HttpTodoApi::new("http://localhost:3000")?;
//!     for todo in api.list().await? {
//!         println!("{}", todo.title);
//!     }
//!     Ok(())
//! }
//! ```

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use std::time::Duration;
use todomvc_core::todo::{
    ApiError, ApiFuture, NewTodo, ResetRequest, Todo, TodoApi, TodoId, TodoPatch,
};

/// Service location used when none is configured
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Per-request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// HTTP client for the todo REST service
#[derive(Clone, Debug)]
pub struct HttpTodoApi {
    client: Client,
    base_url: String,
}

impl HttpTodoApi {
    /// Create a client for `base_url` with the default timeout
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Request` if the underlying HTTP client cannot be built
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client for `base_url` with an explicit per-request timeout
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Request` if the underlying HTTP client cannot be built
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    /// Create a client from `TODOMVC_API_URL`, falling back to [`DEFAULT_API_URL`]
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Request` if the underlying HTTP client cannot be built
    pub fn from_env() -> Result<Self, ApiError> {
        let base_url =
            std::env::var("TODOMVC_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(base_url)
    }

    /// Base URL requests are issued against (without trailing slash)
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn list_todos(&self) -> Result<Vec<Todo>, ApiError> {
        tracing::debug!("GET /todos");
        let response = self
            .client
            .get(self.url("/todos"))
            .send()
            .await
            .map_err(transport_error)?;

        let entries: Vec<ListEntry> = decode(check(response, None).await?).await?;
        let total = entries.len();
        let todos: Vec<Todo> = entries
            .into_iter()
            .filter_map(|entry| match entry {
                ListEntry::Todo(todo) => Some(todo),
                ListEntry::Unreadable(_) => None,
            })
            .collect();

        if todos.len() < total {
            tracing::warn!(
                skipped = total - todos.len(),
                total,
                "GET /todos returned records that are not todos; skipping them"
            );
        }
        Ok(todos)
    }

    async fn create_todo(&self, todo: NewTodo) -> Result<Todo, ApiError> {
        tracing::debug!(title = %todo.title, "POST /todos");
        let response = self
            .client
            .post(self.url("/todos"))
            .json(&todo)
            .send()
            .await
            .map_err(transport_error)?;

        decode(check(response, None).await?).await
    }

    async fn get_todo(&self, id: TodoId) -> Result<Todo, ApiError> {
        tracing::debug!(%id, "GET /todos/:id");
        let response = self
            .client
            .get(self.url(&format!("/todos/{id}")))
            .send()
            .await
            .map_err(transport_error)?;

        decode(check(response, Some(id)).await?).await
    }

    async fn update_todo(&self, id: TodoId, patch: TodoPatch) -> Result<Todo, ApiError> {
        tracing::debug!(%id, "PATCH /todos/:id");
        let response = self
            .client
            .patch(self.url(&format!("/todos/{id}")))
            .json(&patch)
            .send()
            .await
            .map_err(transport_error)?;

        decode(check(response, Some(id)).await?).await
    }

    async fn delete_todo(&self, id: TodoId) -> Result<(), ApiError> {
        tracing::debug!(%id, "DELETE /todos/:id");
        let response = self
            .client
            .delete(self.url(&format!("/todos/{id}")))
            .send()
            .await
            .map_err(transport_error)?;

        check(response, Some(id)).await.map(|_| ())
    }

    async fn reset_todos(&self, todos: Vec<Todo>) -> Result<(), ApiError> {
        tracing::debug!(count = todos.len(), "POST /reset");
        let response = self
            .client
            .post(self.url("/reset"))
            .json(&ResetRequest { todos })
            .send()
            .await
            .map_err(transport_error)?;

        check(response, None).await.map(|_| ())
    }
}

impl TodoApi for HttpTodoApi {
    fn list(&self) -> ApiFuture<'_, Vec<Todo>> {
        Box::pin(self.list_todos())
    }

    fn create(&self, todo: NewTodo) -> ApiFuture<'_, Todo> {
        Box::pin(self.create_todo(todo))
    }

    fn get(&self, id: TodoId) -> ApiFuture<'_, Todo> {
        Box::pin(self.get_todo(id))
    }

    fn update(&self, id: TodoId, patch: TodoPatch) -> ApiFuture<'_, Todo> {
        Box::pin(self.update_todo(id, patch))
    }

    fn delete(&self, id: TodoId) -> ApiFuture<'_, ()> {
        Box::pin(self.delete_todo(id))
    }

    fn reset(&self, todos: Vec<Todo>) -> ApiFuture<'_, ()> {
        Box::pin(self.reset_todos(todos))
    }
}

/// One element of the `GET /todos` array
///
/// A record the client cannot read is dropped instead of failing the whole
/// collection.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListEntry {
    Todo(Todo),
    Unreadable(IgnoredAny),
}

fn transport_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Request(error.to_string())
    }
}

/// Pass successful responses through; map everything else to an `ApiError`.
///
/// `id` names the record addressed by the route, so a 404 can be reported as
/// `NotFound` rather than a bare status.
async fn check(response: Response, id: Option<TodoId>) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => Err(ApiError::NotFound(id)),
        (status, _) => {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::Status {
                status: status.as_u16(),
                message: body,
            })
        },
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response.json::<T>().await.map_err(|e| {
        if e.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Decode(e.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() -> Result<(), ApiError> {
        let api = HttpTodoApi::new("http://localhost:3000/")?;
        assert_eq!(api.base_url(), "http://localhost:3000");
        assert_eq!(api.url("/todos/1"), "http://localhost:3000/todos/1");
        Ok(())
    }
}
