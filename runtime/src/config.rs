//! Store tuning knobs.

use std::time::Duration;

/// Settings for a [`Store`](crate::Store)
///
/// # Example
///
/// ```
/// use todomvc_runtime::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::default().with_shutdown_timeout(Duration::from_secs(5));
/// assert_eq!(config.default_shutdown_timeout, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Deadline callers use for [`Store::shutdown`](crate::Store::shutdown)
    /// when they have none of their own
    pub default_shutdown_timeout: Duration,
}

impl StoreConfig {
    /// Shutdown timeout used by [`StoreConfig::default`]
    pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

    /// Explicit settings
    #[must_use]
    pub const fn new(default_shutdown_timeout: Duration) -> Self {
        Self {
            default_shutdown_timeout,
        }
    }

    /// Replaces the shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.default_shutdown_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SHUTDOWN_TIMEOUT)
    }
}
