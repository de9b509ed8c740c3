//! Configuration management for the TodoMVC client.
//!
//! Loads configuration from environment variables with sensible defaults.
//! The artificial delays can also come from a URL query string
//! (`?delay=500&addTodoDelay=50`), which test harnesses use to slow the
//! client down.

use crate::refresh::DEFAULT_REFRESH_INTERVAL;
use reqwest::Url;
use std::env;
use std::time::Duration;
use todomvc_client::{DEFAULT_API_URL, DEFAULT_TIMEOUT};

/// Default `tracing` filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "todomvc=info";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the REST service
    pub api_url: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Wait before each load
    pub delay: Duration,
    /// Wait before each add is sent
    pub add_todo_delay: Duration,
    /// Interval of the periodic reload
    pub refresh_interval: Duration,
    /// `tracing` filter directives
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
            delay: Duration::ZERO,
            add_todo_delay: Duration::ZERO,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `TODOMVC_API_URL` | `http://localhost:3000` |
    /// | `TODOMVC_REQUEST_TIMEOUT_MS` | `1000` |
    /// | `TODOMVC_DELAY_MS` | `0` |
    /// | `TODOMVC_ADD_TODO_DELAY_MS` | `0` |
    /// | `TODOMVC_REFRESH_INTERVAL_SECS` | `60` |
    /// | `RUST_LOG` | `todomvc=info` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            api_url: lookup("TODOMVC_API_URL").unwrap_or(defaults.api_url),
            request_timeout: lookup("TODOMVC_REQUEST_TIMEOUT_MS")
                .and_then(|s| s.parse().ok())
                .map_or(defaults.request_timeout, Duration::from_millis),
            delay: lookup("TODOMVC_DELAY_MS")
                .map_or(defaults.delay, |s| parse_millis(&s)),
            add_todo_delay: lookup("TODOMVC_ADD_TODO_DELAY_MS")
                .map_or(defaults.add_todo_delay, |s| parse_millis(&s)),
            refresh_interval: lookup("TODOMVC_REFRESH_INTERVAL_SECS")
                .and_then(|s| s.parse().ok())
                .map_or(defaults.refresh_interval, Duration::from_secs),
            log_filter: lookup("RUST_LOG").unwrap_or(defaults.log_filter),
        }
    }

    /// Overlay the `delay` and `addTodoDelay` query parameters
    ///
    /// `query` may be a bare query (`delay=500`), start with `?`, or be a
    /// full URL. Parameters that are absent leave the current value alone;
    /// parameters that are present but not a non-negative number become zero.
    #[must_use]
    pub fn with_query(mut self, query: &str) -> Self {
        let query = query.split_once('?').map_or(query, |(_, q)| q);
        let Ok(url) = Url::parse(&format!("http://localhost/?{query}")) else {
            tracing::warn!(query, "Ignoring malformed query string");
            return self;
        };

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "delay" => self.delay = parse_millis(&value),
                "addTodoDelay" => self.add_todo_delay = parse_millis(&value),
                _ => {},
            }
        }
        self
    }
}

/// Milliseconds from the leading number of `value`
///
/// Reads the longest numeric prefix, so `"50ms"` is 50 ms and `"1.5"` is
/// 1.5 ms. Anything without a leading number, and negative numbers, are zero.
#[must_use]
pub fn parse_millis(value: &str) -> Duration {
    let value = value.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    for (i, c) in value.char_indices() {
        match c {
            '+' | '-' if i == 0 => {},
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }

    if !seen_digit {
        return Duration::ZERO;
    }

    match value[..end].parse::<f64>() {
        Ok(ms) if ms.is_finite() && ms > 0.0 => Duration::from_secs_f64(ms / 1000.0),
        _ => Duration::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&[]));

        assert_eq!(config, Config::default());
        assert_eq!(config.api_url, "http://localhost:3000");
        assert_eq!(config.request_timeout, Duration::from_millis(1000));
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.log_filter, "todomvc=info");
    }

    #[test]
    fn reads_variables() {
        let config = Config::from_lookup(lookup(&[
            ("TODOMVC_API_URL", "http://todos.test:8080"),
            ("TODOMVC_REQUEST_TIMEOUT_MS", "250"),
            ("TODOMVC_DELAY_MS", "500"),
            ("TODOMVC_ADD_TODO_DELAY_MS", "50"),
            ("TODOMVC_REFRESH_INTERVAL_SECS", "5"),
            ("RUST_LOG", "debug"),
        ]));

        assert_eq!(config.api_url, "http://todos.test:8080");
        assert_eq!(config.request_timeout, Duration::from_millis(250));
        assert_eq!(config.delay, Duration::from_millis(500));
        assert_eq!(config.add_todo_delay, Duration::from_millis(50));
        assert_eq!(config.refresh_interval, Duration::from_secs(5));
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn unparsable_numbers_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("TODOMVC_REQUEST_TIMEOUT_MS", "soon"),
            ("TODOMVC_DELAY_MS", "later"),
        ]));

        assert_eq!(config.request_timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.delay, Duration::ZERO);
    }

    #[test]
    fn query_overrides_delays() {
        let config = Config::default().with_query("?delay=500&addTodoDelay=50");
        assert_eq!(config.delay, Duration::from_millis(500));
        assert_eq!(config.add_todo_delay, Duration::from_millis(50));

        let config = Config::default().with_query("http://localhost:8888/?addTodoDelay=20");
        assert_eq!(config.delay, Duration::ZERO);
        assert_eq!(config.add_todo_delay, Duration::from_millis(20));
    }

    #[test]
    fn absent_query_parameters_keep_values() {
        let config = Config {
            delay: Duration::from_millis(10),
            ..Config::default()
        }
        .with_query("other=1");
        assert_eq!(config.delay, Duration::from_millis(10));
    }

    #[test]
    fn millis_are_parsed_leniently() {
        assert_eq!(parse_millis("50"), Duration::from_millis(50));
        assert_eq!(parse_millis("50ms"), Duration::from_millis(50));
        assert_eq!(parse_millis(" 2.5"), Duration::from_micros(2500));
        assert_eq!(parse_millis("+7"), Duration::from_millis(7));
        assert_eq!(parse_millis(""), Duration::ZERO);
        assert_eq!(parse_millis("abc"), Duration::ZERO);
        assert_eq!(parse_millis("-10"), Duration::ZERO);
        assert_eq!(parse_millis("."), Duration::ZERO);
    }
}
