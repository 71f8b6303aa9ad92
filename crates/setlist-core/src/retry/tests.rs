//! Integration tests for the retry module
//!
//! These drive the complete flow: classification, rule table, backoff
//! schedule, observers, and the typed failures surfaced on exhaustion.
//! Time-dependent tests run on tokio's paused clock so real backoff values
//! complete instantly.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::BackoffConfig;
use crate::failure::{ApiFailure, FailureKind, FailureSignal, TransportKind};
use crate::retry::observer::{RetryObserver, StatsObserver};
use crate::retry::runner::RetryRunnerBuilder;

/// Records the (kind, delay) pair of every retried attempt.
#[derive(Default)]
struct DelayRecorder {
    delays: Mutex<Vec<(FailureKind, Duration)>>,
}

impl DelayRecorder {
    fn recorded(&self) -> Vec<(FailureKind, Duration)> {
        self.delays.lock().unwrap().clone()
    }
}

impl RetryObserver for DelayRecorder {
    fn on_attempt_start(&self, _operation: &str, _attempt: u32, _max_attempts: u32) {}

    fn on_attempt_failed(
        &self,
        _operation: &str,
        _attempt: u32,
        kind: FailureKind,
        _signal: &FailureSignal,
        delay: Duration,
    ) {
        self.delays.lock().unwrap().push((kind, delay));
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

#[tokio::test(start_paused = true)]
async fn server_error_follows_exponential_schedule() {
    let recorder = Arc::new(DelayRecorder::default());
    let runner = RetryRunnerBuilder::new()
        .with_config(BackoffConfig::default())
        .with_observer(recorder.clone())
        .build();

    let result: Result<(), ApiFailure> = runner
        .run("fetch", || async {
            Err(FailureSignal::status(503, "service unavailable"))
        })
        .await;

    assert_eq!(result.unwrap_err().kind(), FailureKind::ServerError);
    assert_eq!(
        recorder.recorded(),
        vec![
            (FailureKind::ServerError, Duration::from_secs(2)),
            (FailureKind::ServerError, Duration::from_secs(4)),
            (FailureKind::ServerError, Duration::from_secs(8)),
            (FailureKind::ServerError, Duration::from_secs(16)),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn rate_limit_hint_overrides_schedule_on_every_attempt() {
    let recorder = Arc::new(DelayRecorder::default());
    let runner = RetryRunnerBuilder::new()
        .with_config(BackoffConfig::default())
        .with_observer(recorder.clone())
        .build();

    let result: Result<(), ApiFailure> = runner
        .run("fetch", || async {
            Err(FailureSignal::status_with_retry_after(
                429,
                "too many requests",
                "5",
            ))
        })
        .await;

    let failure = result.unwrap_err();
    assert_eq!(failure.kind(), FailureKind::RateLimited);
    assert_eq!(failure.retry_after(), Some(5));

    for (kind, delay) in recorder.recorded() {
        assert_eq!(kind, FailureKind::RateLimited);
        assert_eq!(delay, Duration::from_secs(5));
    }
}

#[tokio::test]
async fn not_found_is_a_single_invocation() {
    let observer = Arc::new(StatsObserver::new());
    let runner = RetryRunnerBuilder::new()
        .with_config(BackoffConfig::default())
        .with_observer(observer.clone())
        .build();

    let calls = Arc::new(AtomicU32::new(0));
    let calls_clone = calls.clone();

    let result: Result<(), ApiFailure> = runner
        .run("fetch", || {
            let calls = calls_clone.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FailureSignal::status(404, "playlist not found"))
            }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(observer.rejections(), 1);
    assert!(matches!(
        result.unwrap_err(),
        ApiFailure::NotFound { .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn token_expired_surfaces_for_reauthentication() {
    let runner = RetryRunnerBuilder::new()
        .with_config(BackoffConfig::default())
        .build();

    let result: Result<(), ApiFailure> = runner
        .run("fetch", || async {
            Err(FailureSignal::status(401, "token expired"))
        })
        .await;

    // callers match this variant to trigger a credential refresh
    match result.unwrap_err() {
        ApiFailure::TokenExpired { message } => assert_eq!(message, "token expired"),
        other => panic!("wrong variant: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn network_failures_retry_then_exhaust() {
    let observer = Arc::new(StatsObserver::new());
    let runner = RetryRunnerBuilder::new()
        .with_config(BackoffConfig::default())
        .with_observer(observer.clone())
        .build();

    let result: Result<(), ApiFailure> = runner
        .run("fetch", || async {
            Err(FailureSignal::transport(
                TransportKind::Connect,
                "connection refused",
            ))
        })
        .await;

    assert_eq!(observer.attempt_starts(), 5);
    assert_eq!(observer.failures(), 4);
    assert_eq!(observer.exhaustions(), 1);
    assert_eq!(result.unwrap_err().kind(), FailureKind::Network);
}

#[tokio::test(start_paused = true)]
async fn final_failure_reflects_last_signal() {
    let runner = RetryRunnerBuilder::new()
        .with_config(BackoffConfig::default())
        .build();

    let calls = Arc::new(AtomicU32::new(0));
    let calls_clone = calls.clone();

    // transient failures followed by a terminal one: the terminal signal wins
    let result: Result<(), ApiFailure> = runner
        .run("fetch", || {
            let calls = calls_clone.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(FailureSignal::status(502, "bad gateway"))
                } else {
                    Err(FailureSignal::status(403, "forbidden"))
                }
            }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    match result.unwrap_err() {
        ApiFailure::ClientError { status, .. } => assert_eq!(status, 403),
        other => panic!("wrong variant: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn unparsable_hint_falls_back_to_schedule() {
    let recorder = Arc::new(DelayRecorder::default());
    let runner = RetryRunnerBuilder::new()
        .with_config(BackoffConfig::default())
        .with_observer(recorder.clone())
        .build();

    let _: Result<(), ApiFailure> = runner
        .run("fetch", || async {
            Err(FailureSignal::status_with_retry_after(
                429,
                "too many requests",
                "soon",
            ))
        })
        .await;

    assert_eq!(
        recorder.recorded().first().map(|(_, d)| *d),
        Some(Duration::from_secs(2))
    );
}

#[tokio::test(start_paused = true)]
async fn dropping_the_call_aborts_pending_backoff() {
    let runner = RetryRunnerBuilder::new()
        .with_config(BackoffConfig::default())
        .build();

    let call = runner.run("fetch", || async {
        Err::<(), _>(FailureSignal::status_with_retry_after(
            429,
            "too many requests",
            "3600",
        ))
    });

    // the call sits in a one-hour backoff; cancelling it wins the race and
    // no typed failure is fabricated
    let result = tokio::time::timeout(Duration::from_secs(5), call).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn concurrent_runs_do_not_share_attempt_state() {
    let runner = Arc::new(
        RetryRunnerBuilder::new()
            .with_config(BackoffConfig {
                max_retries: 2,
                base_delay_secs: 0,
                max_delay_secs: 0,
            })
            .build(),
    );

    let mut handles = Vec::new();
    for _ in 0..8 {
        let runner = runner.clone();
        handles.push(tokio::spawn(async move {
            let calls = Arc::new(AtomicU32::new(0));
            let calls_clone = calls.clone();
            let result = runner
                .run("fetch", || {
                    let calls = calls_clone.clone();
                    async move {
                        if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                            Err(FailureSignal::status(500, "flaky"))
                        } else {
                            Ok("payload")
                        }
                    }
                })
                .await;
            (result, calls.load(Ordering::SeqCst))
        }));
    }

    for handle in handles {
        let (result, calls) = handle.await.unwrap();
        assert_eq!(result.unwrap(), "payload");
        assert_eq!(calls, 2);
    }
}
