//! Errors returned by the store.

use thiserror::Error;

/// Why the store refused or gave up on a request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// [`Store::shutdown`](crate::Store::shutdown) has been called; no
    /// action is reduced after that point
    #[error("Store is shutting down")]
    ShutdownInProgress,

    /// Effects were still running when the shutdown deadline passed
    #[error("Shutdown timed out with {0} effects still running")]
    ShutdownTimeout(usize),

    /// A wait ran past its deadline
    #[error("Timed out waiting for effects")]
    Timeout,
}
