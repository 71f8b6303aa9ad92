//! Retry execution engine for upstream API calls
//!
//! Wraps a single upstream operation and, on failure, runs classification,
//! the retry rule table, and the backoff schedule up to a bounded attempt
//! count before surfacing the typed failure.
//!
//! # Features
//!
//! - Fixed retry rule table over the seven failure kinds
//! - Exponential backoff with a hard cap, honoring server `Retry-After` hints
//! - Observable attempts via the `RetryObserver` trait
//! - Built-in `TracingObserver` for logging
//! - Builder pattern for runner configuration
//! - Thread-safe with Send + Sync bounds
//!
//! # Example
//!
//! ```rust,no_run
//! use setlist_core::retry::retry_with_config;
//! use setlist_core::{BackoffConfig, FailureSignal};
//!
//! async fn example() -> Result<String, setlist_core::ApiFailure> {
//!     let config = BackoffConfig::default();
//!
//!     retry_with_config(&config, "fetch-playlist", || async {
//!         // Your upstream call here
//!         Ok::<_, FailureSignal>("payload".to_string())
//!     })
//!     .await
//! }
//! ```

mod delay;
mod observer;
mod policy;
mod runner;

pub use delay::{apply_jitter, delay_for};
pub use observer::{NoOpObserver, RetryObserver, StatsObserver, TracingObserver};
pub use policy::should_retry;
pub use runner::{retry_with_config, RetryRunner, RetryRunnerBuilder};

#[cfg(test)]
mod tests;
