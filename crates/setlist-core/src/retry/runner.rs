//! Retry orchestration
//!
//! `RetryRunner` owns one orchestrated call at a time: it invokes the
//! operation, classifies any failure, consults the rule table, waits out the
//! backoff, and surfaces the typed failure once attempts run out. The
//! per-call attempt state lives on the stack of `run` and is never shared.
//!
//! Backoff waits are `tokio::time::sleep`, so an orchestrated call is
//! cancelled by dropping its future: the pending sleep aborts immediately
//! and no failure value is fabricated.

use std::future::Future;
use std::time::Instant;

use crate::config::BackoffConfig;
use crate::failure::{ApiFailure, FailureKind, FailureSignal};

use super::delay::{apply_jitter, delay_for};
use super::observer::{NoOpObserver, RetryObserver, TracingObserver};
use super::policy::should_retry;

/// Execute an operation with the default backoff configuration and tracing.
///
/// Convenience wrapper for callers that don't need a custom observer.
pub async fn retry_with_config<F, Fut, T>(
    config: &BackoffConfig,
    operation: &str,
    op: F,
) -> Result<T, ApiFailure>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FailureSignal>>,
{
    RetryRunnerBuilder::new()
        .with_config(config.clone())
        .with_observer(TracingObserver)
        .build()
        .run(operation, op)
        .await
}

/// Builder for a [`RetryRunner`].
///
/// # Example
///
/// ```rust
/// use setlist_core::retry::{RetryRunnerBuilder, TracingObserver};
/// use setlist_core::BackoffConfig;
///
/// let runner = RetryRunnerBuilder::new()
///     .with_config(BackoffConfig::default())
///     .with_observer(TracingObserver)
///     .with_jitter(true)
///     .build();
/// ```
pub struct RetryRunnerBuilder<O = NoOpObserver> {
    config: BackoffConfig,
    observer: O,
    jitter: bool,
}

impl Default for RetryRunnerBuilder<NoOpObserver> {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryRunnerBuilder<NoOpObserver> {
    /// Create a builder with default settings.
    ///
    /// Jitter is off by default so the published schedule holds exactly.
    pub fn new() -> Self {
        Self {
            config: BackoffConfig::default(),
            observer: NoOpObserver,
            jitter: false,
        }
    }
}

impl<O> RetryRunnerBuilder<O> {
    /// Set the backoff configuration.
    pub fn with_config(mut self, config: BackoffConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the observer receiving attempt callbacks.
    pub fn with_observer<O2>(self, observer: O2) -> RetryRunnerBuilder<O2> {
        RetryRunnerBuilder {
            config: self.config,
            observer,
            jitter: self.jitter,
        }
    }

    /// Enable or disable jitter on backoff sleeps.
    ///
    /// Jitter never applies to server-provided rate-limit hints.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Build the runner.
    pub fn build(self) -> RetryRunner<O> {
        RetryRunner {
            config: self.config,
            observer: self.observer,
            jitter: self.jitter,
        }
    }
}

/// Orchestrates one upstream call with bounded retries.
///
/// Use [`RetryRunnerBuilder`] to create an instance. The runner itself is
/// immutable and can be shared across concurrent calls; each `run` keeps its
/// own attempt counter.
pub struct RetryRunner<O = NoOpObserver> {
    config: BackoffConfig,
    observer: O,
    jitter: bool,
}

impl<O> RetryRunner<O>
where
    O: RetryObserver,
{
    /// Execute an idempotent operation with retries per the rule table.
    ///
    /// The operation is invoked at most `max_retries + 1` times. On each
    /// failure the signal is classified; non-retryable kinds surface
    /// immediately, retryable kinds wait out the backoff and try again.
    /// Intermediate failures are reported only to the observer; the returned
    /// error is always the typed failure of the final signal.
    pub async fn run<F, Fut, T>(&self, operation: &str, mut op: F) -> Result<T, ApiFailure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FailureSignal>>,
    {
        let start = Instant::now();
        let max_attempts = self.config.max_retries + 1;
        let mut attempt: u32 = 0;

        loop {
            self.observer.on_attempt_start(operation, attempt, max_attempts);

            match op().await {
                Ok(value) => {
                    self.observer.on_success(operation, attempt, start.elapsed());
                    return Ok(value);
                }
                Err(signal) => {
                    let kind = crate::classify::classify(&signal);

                    if !should_retry(kind) {
                        self.observer.on_rejected(operation, attempt, kind, &signal);
                        return Err(ApiFailure::from_signal(&signal));
                    }

                    if attempt >= self.config.max_retries {
                        self.observer
                            .on_exhausted(operation, attempt + 1, kind, &signal);
                        return Err(ApiFailure::from_signal(&signal));
                    }

                    let delay =
                        delay_for(&self.config, kind, attempt, signal.retry_after_hint());
                    self.observer
                        .on_attempt_failed(operation, attempt, kind, &signal, delay);

                    let wait = if self.jitter && kind != FailureKind::RateLimited {
                        apply_jitter(delay)
                    } else {
                        delay
                    };
                    if !wait.is_zero() {
                        tokio::time::sleep(wait).await;
                    }

                    attempt += 1;
                }
            }
        }
    }

    /// Execute an operation exactly once, mapping any failure to its typed
    /// form without retrying.
    ///
    /// This is the path for non-idempotent mutations, where a retry after a
    /// timeout could apply the write twice.
    pub async fn run_once<F, Fut, T>(&self, operation: &str, op: F) -> Result<T, ApiFailure>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FailureSignal>>,
    {
        let start = Instant::now();
        self.observer.on_attempt_start(operation, 0, 1);

        match op().await {
            Ok(value) => {
                self.observer.on_success(operation, 0, start.elapsed());
                Ok(value)
            }
            Err(signal) => {
                let kind = crate::classify::classify(&signal);
                self.observer.on_rejected(operation, 0, kind, &signal);
                Err(ApiFailure::from_signal(&signal))
            }
        }
    }

    /// The backoff configuration this runner was built with.
    pub fn config(&self) -> &BackoffConfig {
        &self.config
    }
}
