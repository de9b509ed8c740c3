//! # TodoMVC Runtime
//!
//! The [`Store`] that owns reducer state and executes effects.
//!
//! ## Single Writer
//!
//! State changes only inside the reducer, and the reducer only runs while the
//! store holds the state's write lock. The view, the periodic refresh and the
//! effects feeding results back may all send actions at once; their mutations
//! are applied one after another. Reads go through [`Store::state`].
//!
//! ## Waiting for Effects
//!
//! [`Store::send`] returns as soon as the reducer has run. The returned
//! [`EffectHandle`] resolves once the action's effects have finished;
//! [`Store::send_cascading`] extends that to everything the effects feed back.
//!
//! ```ignore
//! use todomvc_runtime::Store;
//!
//! let store = Store::new(initial_state, reducer, environment);
//! store.send_cascading(TodoAction::LoadTodos).await?.wait().await;
//! let count = store.state(|s| s.todos.len()).await;
//! ```
//!
//! ## Metrics
//!
//! Counters `store.commands.total`, `store.effects.executed` (labelled by
//! `type`) and `store.shutdown.*`, and the histogram
//! `store.reducer.duration_seconds`, are emitted through `metrics`. They cost
//! nothing until a recorder is installed.

pub mod config;
pub mod error;
pub mod handle;
pub mod store;

pub use config::StoreConfig;
pub use error::StoreError;
pub use handle::{EffectHandle, TrackingMode};
pub use store::Store;
