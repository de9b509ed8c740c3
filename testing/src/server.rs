//! In-process REST service for end-to-end tests
//!
//! [`TodoServer`] serves a [`TodoBackend`] over HTTP on an ephemeral local
//! port:
//!
//! ```text
//! GET    /todos        list
//! POST   /todos        create (201, blank title → 400)
//! GET    /todos/:id    fetch (404 if unknown)
//! PATCH  /todos/:id    partial update (404 if unknown, blank title → 400)
//! DELETE /todos/:id    delete (200, 404 if unknown)
//! POST   /reset        replace the collection
//! ```

use crate::backend::TodoBackend;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::net::SocketAddr;
use todomvc_core::todo::{ApiError, NewTodo, ResetRequest, Todo, TodoId, TodoPatch};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Maps backend errors onto the status codes of the REST contract
struct ServerError(ApiError);

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self.0 {
            ApiError::NotFound(id) => {
                (StatusCode::NOT_FOUND, format!("todo {id} not found")).into_response()
            },
            ApiError::Status { status, message } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                message,
            )
                .into_response(),
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response(),
        }
    }
}

impl From<ApiError> for ServerError {
    fn from(error: ApiError) -> Self {
        Self(error)
    }
}

#[allow(clippy::unused_async)]
async fn list_todos(State(backend): State<TodoBackend>) -> Json<Vec<Todo>> {
    Json(backend.todos())
}

#[allow(clippy::unused_async)]
async fn create_todo(
    State(backend): State<TodoBackend>,
    Json(todo): Json<NewTodo>,
) -> Result<(StatusCode, Json<Todo>), ServerError> {
    let created = backend.create(todo)?;
    tracing::debug!(id = %created.id, "Created todo");
    Ok((StatusCode::CREATED, Json(created)))
}

#[allow(clippy::unused_async)]
async fn get_todo(
    State(backend): State<TodoBackend>,
    Path(id): Path<u64>,
) -> Result<Json<Todo>, ServerError> {
    Ok(Json(backend.get(TodoId::new(id))?))
}

#[allow(clippy::unused_async)]
async fn update_todo(
    State(backend): State<TodoBackend>,
    Path(id): Path<u64>,
    Json(patch): Json<TodoPatch>,
) -> Result<Json<Todo>, ServerError> {
    Ok(Json(backend.update(TodoId::new(id), &patch)?))
}

#[allow(clippy::unused_async)]
async fn delete_todo(
    State(backend): State<TodoBackend>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ServerError> {
    backend.delete(TodoId::new(id))?;
    Ok(StatusCode::OK)
}

#[allow(clippy::unused_async)]
async fn reset_todos(
    State(backend): State<TodoBackend>,
    Json(request): Json<ResetRequest>,
) -> StatusCode {
    tracing::debug!(count = request.todos.len(), "Reset todos");
    backend.reset(request.todos);
    StatusCode::OK
}

/// Router for the todo REST contract over `backend`
pub fn router(backend: TodoBackend) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/:id",
            get(get_todo).patch(update_todo).delete(delete_todo),
        )
        .route("/reset", post(reset_todos))
        .with_state(backend)
}

/// A running REST service bound to `127.0.0.1` on an ephemeral port
///
/// Stops serving when dropped.
///
/// # Example
///
/// ```ignore
/// let server = TodoServer::start(TodoBackend::new()).await?;
/// let api = HttpTodoApi::new(server.base_url())?;
/// ```
pub struct TodoServer {
    addr: SocketAddr,
    backend: TodoBackend,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl TodoServer {
    /// Bind a listener and start serving `backend`
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the listener cannot be bound.
    pub async fn start(backend: TodoBackend) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (shutdown, signal) = oneshot::channel::<()>();

        let app = router(backend.clone());
        let task = tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = signal.await;
                })
                .await;
            if let Err(error) = served {
                tracing::error!(%error, "Todo server stopped");
            }
        });

        tracing::debug!(%addr, "Todo server listening");

        Ok(Self {
            addr,
            backend,
            shutdown: Some(shutdown),
            task,
        })
    }

    /// Address the server listens on
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `http://` URL of the server, without trailing slash
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// The collection being served
    #[must_use]
    pub const fn backend(&self) -> &TodoBackend {
        &self.backend
    }

    /// Stop serving and wait for the server task to finish
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        let _ = (&mut self.task).await;
    }
}

impl Drop for TodoServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}
