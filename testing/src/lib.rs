//! # TodoMVC Testing
//!
//! Fixtures for testing the TodoMVC store at every level:
//!
//! - [`mocks`]: a frozen clock and predictable ids
//! - [`ReducerTest`]: Given-When-Then checks on a reducer, no runtime needed
//! - [`InMemoryTodoApi`]: the todo service without HTTP, with failure injection
//! - [`TodoServer`]: the todo REST contract served in-process for end-to-end tests
//!
//! ## Example
//!
//! ```ignore
//! use todomvc_testing::{InMemoryTodoApi, test_clock};
//!
//! #[tokio::test]
//! async fn adds_a_todo() {
//!     let api = Arc::new(InMemoryTodoApi::new());
//!     let store = TodoStore::new(TodoState::default(), TodoReducer, env(api.clone()));
//!
//!     store.send(TodoAction::SetNewTodo { text: "milk".into() }).await?;
//!     store.send_cascading(TodoAction::AddTodo).await?.wait().await;
//!
//!     assert_eq!(store.state(|s| s.todos.len()).await, 1);
//! }
//! ```

use chrono::{DateTime, Utc};
use todomvc_core::environment::{Clock, IdGenerator};

pub mod backend;
pub mod reducer_test;
pub mod server;

/// Deterministic environment implementations.
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};

    /// A clock stuck at one instant
    ///
    /// ```
    /// use todomvc_testing::mocks::FixedClock;
    /// use todomvc_core::environment::Clock;
    /// use chrono::{TimeZone, Utc};
    ///
    /// let noon = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    /// assert_eq!(FixedClock::new(noon).now(), noon);
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Clock reporting `time` forever
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock fixed at the Unix epoch
    #[must_use]
    pub const fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::UNIX_EPOCH)
    }

    /// Predictable placeholder ids: `"0000000001"`, `"0000000002"`, ...
    #[derive(Debug, Default)]
    pub struct SequentialIdGenerator {
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Generator whose first id is `"0000000001"`
        #[must_use]
        pub const fn new() -> Self {
            Self {
                next: AtomicU64::new(0),
            }
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> String {
            let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
            format!("{n:010}")
        }
    }
}

pub use backend::{ApiRequest, ApiRoute, InMemoryTodoApi, TodoBackend};
pub use mocks::{FixedClock, SequentialIdGenerator, test_clock};
pub use reducer_test::{ReducerTest, assertions, drive_effects};
pub use server::TodoServer;
