//! # TodoMVC App
//!
//! The TodoMVC client: a todo store mirroring a REST collection, and the
//! view binding that turns its state into something a front end can draw.
//!
//! ## Architecture
//!
//! - [`types`]: `TodoState` and `TodoAction` (intents and outcomes)
//! - [`reducer`]: `TodoReducer` and its injected `TodoEnvironment`
//! - [`view`]: visibility routes and derived views
//! - [`controller`]: `TodoController`, the facade front ends call
//! - [`refresh`]: periodic reload
//! - [`terminal`]: the line-oriented front end used by the `todomvc` binary
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use todomvc_app::{TodoController, TodoEnvironment, TodoReducer, TodoState, TodoStore};
//! use todomvc_client::HttpTodoApi;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Arc::new(HttpTodoApi::new("http://localhost:3000")?);
//! let store = TodoStore::new(
//!     TodoState::new(),
//!     TodoReducer::new(),
//!     TodoEnvironment::production(api),
//! );
//! let controller = TodoController::new(store);
//!
//! controller.load_todos_and_wait().await?;
//! controller.submit("buy milk").await?.wait().await;
//! println!("{}", controller.view_model().await.remaining_label);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod reducer;
pub mod refresh;
pub mod terminal;
pub mod tracking;
pub mod types;
pub mod view;

pub use config::Config;
pub use controller::TodoController;
pub use error::{SubmitError, TodoError};
pub use reducer::{TodoEnvironment, TodoReducer, TodoStore};
pub use refresh::PeriodicRefresh;
pub use tracking::{LogTracker, RecordingTracker, Tracker};
pub use types::{TodoAction, TodoState};
pub use view::{ViewModel, Visibility};
