//! Retry observation and logging
//!
//! The `RetryObserver` trait receives callbacks during retry execution; the
//! `TracingObserver` implementation logs them with the `tracing` crate. One
//! runner serves many operation kinds, so every callback carries the
//! operation name.

use crate::failure::{FailureKind, FailureSignal};
use std::time::Duration;

/// Observer trait for retry attempt events.
///
/// Implement this to collect metrics or drive logging. Attempt numbers are
/// 0-indexed, matching the backoff schedule.
pub trait RetryObserver: Send + Sync {
    /// Called before each attempt.
    fn on_attempt_start(&self, operation: &str, attempt: u32, max_attempts: u32);

    /// Called when an attempt fails and will be retried after `delay`.
    fn on_attempt_failed(
        &self,
        operation: &str,
        attempt: u32,
        kind: FailureKind,
        signal: &FailureSignal,
        delay: Duration,
    );

    /// Called when the operation succeeds.
    fn on_success(&self, operation: &str, attempt: u32, total_duration: Duration);

    /// Called when every allowed attempt has failed.
    fn on_exhausted(&self, operation: &str, attempts: u32, kind: FailureKind, signal: &FailureSignal);

    /// Called when the rule table vetoes a retry and the failure surfaces
    /// immediately.
    fn on_rejected(&self, operation: &str, attempt: u32, kind: FailureKind, signal: &FailureSignal) {
        let _ = (operation, attempt, kind, signal);
    }
}

/// A no-op observer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl RetryObserver for NoOpObserver {
    fn on_attempt_start(&self, _operation: &str, _attempt: u32, _max_attempts: u32) {}

    fn on_attempt_failed(
        &self,
        _operation: &str,
        _attempt: u32,
        _kind: FailureKind,
        _signal: &FailureSignal,
        _delay: Duration,
    ) {
    }

    fn on_success(&self, _operation: &str, _attempt: u32, _total_duration: Duration) {}

    fn on_exhausted(
        &self,
        _operation: &str,
        _attempts: u32,
        _kind: FailureKind,
        _signal: &FailureSignal,
    ) {
    }
}

/// An observer that logs retry events with the `tracing` crate.
///
/// # Log levels
///
/// - `on_attempt_start`: DEBUG
/// - `on_attempt_failed`: WARN (kind and computed delay included)
/// - `on_success`: INFO after a retry, DEBUG on a clean first attempt
/// - `on_exhausted`: ERROR
/// - `on_rejected`: WARN
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RetryObserver for TracingObserver {
    fn on_attempt_start(&self, operation: &str, attempt: u32, max_attempts: u32) {
        tracing::debug!(
            operation,
            attempt,
            max_attempts,
            "starting upstream attempt"
        );
    }

    fn on_attempt_failed(
        &self,
        operation: &str,
        attempt: u32,
        kind: FailureKind,
        signal: &FailureSignal,
        delay: Duration,
    ) {
        tracing::warn!(
            operation,
            attempt,
            kind = %kind,
            error = %signal,
            delay_ms = delay.as_millis() as u64,
            "attempt failed, will retry"
        );
    }

    fn on_success(&self, operation: &str, attempt: u32, total_duration: Duration) {
        if attempt > 0 {
            tracing::info!(
                operation,
                attempt,
                total_duration_ms = total_duration.as_millis() as u64,
                "succeeded after retry"
            );
        } else {
            tracing::debug!(
                operation,
                duration_ms = total_duration.as_millis() as u64,
                "succeeded on first attempt"
            );
        }
    }

    fn on_exhausted(
        &self,
        operation: &str,
        attempts: u32,
        kind: FailureKind,
        signal: &FailureSignal,
    ) {
        tracing::error!(
            operation,
            attempts,
            kind = %kind,
            error = %signal,
            "all retry attempts exhausted"
        );
    }

    fn on_rejected(&self, operation: &str, attempt: u32, kind: FailureKind, signal: &FailureSignal) {
        tracing::warn!(
            operation,
            attempt,
            kind = %kind,
            error = %signal,
            "failure is not retryable"
        );
    }
}

/// An observer that counts retry events.
///
/// Useful for tests and metrics.
#[derive(Debug, Default)]
pub struct StatsObserver {
    attempt_starts: std::sync::atomic::AtomicU32,
    failures: std::sync::atomic::AtomicU32,
    successes: std::sync::atomic::AtomicU32,
    exhaustions: std::sync::atomic::AtomicU32,
    rejections: std::sync::atomic::AtomicU32,
}

impl StatsObserver {
    /// Create a new stats observer
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attempts started
    pub fn attempt_starts(&self) -> u32 {
        self.attempt_starts.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Number of failed attempts that were retried
    pub fn failures(&self) -> u32 {
        self.failures.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Number of successful completions
    pub fn successes(&self) -> u32 {
        self.successes.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Number of exhaustions
    pub fn exhaustions(&self) -> u32 {
        self.exhaustions.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Number of non-retryable rejections
    pub fn rejections(&self) -> u32 {
        self.rejections.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl RetryObserver for StatsObserver {
    fn on_attempt_start(&self, _operation: &str, _attempt: u32, _max_attempts: u32) {
        self.attempt_starts
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }

    fn on_attempt_failed(
        &self,
        _operation: &str,
        _attempt: u32,
        _kind: FailureKind,
        _signal: &FailureSignal,
        _delay: Duration,
    ) {
        self.failures
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }

    fn on_success(&self, _operation: &str, _attempt: u32, _total_duration: Duration) {
        self.successes
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }

    fn on_exhausted(
        &self,
        _operation: &str,
        _attempts: u32,
        _kind: FailureKind,
        _signal: &FailureSignal,
    ) {
        self.exhaustions
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }

    fn on_rejected(
        &self,
        _operation: &str,
        _attempt: u32,
        _kind: FailureKind,
        _signal: &FailureSignal,
    ) {
        self.rejections
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}

impl<T: RetryObserver + ?Sized> RetryObserver for std::sync::Arc<T> {
    fn on_attempt_start(&self, operation: &str, attempt: u32, max_attempts: u32) {
        (**self).on_attempt_start(operation, attempt, max_attempts)
    }

    fn on_attempt_failed(
        &self,
        operation: &str,
        attempt: u32,
        kind: FailureKind,
        signal: &FailureSignal,
        delay: Duration,
    ) {
        (**self).on_attempt_failed(operation, attempt, kind, signal, delay)
    }

    fn on_success(&self, operation: &str, attempt: u32, total_duration: Duration) {
        (**self).on_success(operation, attempt, total_duration)
    }

    fn on_exhausted(&self, operation: &str, attempts: u32, kind: FailureKind, signal: &FailureSignal) {
        (**self).on_exhausted(operation, attempts, kind, signal)
    }

    fn on_rejected(&self, operation: &str, attempt: u32, kind: FailureKind, signal: &FailureSignal) {
        (**self).on_rejected(operation, attempt, kind, signal)
    }
}

impl<T: RetryObserver + ?Sized> RetryObserver for Box<T> {
    fn on_attempt_start(&self, operation: &str, attempt: u32, max_attempts: u32) {
        (**self).on_attempt_start(operation, attempt, max_attempts)
    }

    fn on_attempt_failed(
        &self,
        operation: &str,
        attempt: u32,
        kind: FailureKind,
        signal: &FailureSignal,
        delay: Duration,
    ) {
        (**self).on_attempt_failed(operation, attempt, kind, signal, delay)
    }

    fn on_success(&self, operation: &str, attempt: u32, total_duration: Duration) {
        (**self).on_success(operation, attempt, total_duration)
    }

    fn on_exhausted(&self, operation: &str, attempts: u32, kind: FailureKind, signal: &FailureSignal) {
        (**self).on_exhausted(operation, attempts, kind, signal)
    }

    fn on_rejected(&self, operation: &str, attempt: u32, kind: FailureKind, signal: &FailureSignal) {
        (**self).on_rejected(operation, attempt, kind, signal)
    }
}
