//! Backoff delay calculation
//!
//! Pure scheduling: the wait before the next attempt is a function of the
//! failure kind, the 0-indexed attempt number, and an optional server wait
//! hint. Jitter is a separate, explicit step applied by the runner at sleep
//! time.

use crate::config::BackoffConfig;
use crate::failure::FailureKind;
use rand::Rng;
use std::time::Duration;

/// Compute the wait before the next retry attempt.
///
/// For [`FailureKind::RateLimited`] with a server hint, the hint is used
/// verbatim regardless of the attempt number. Every other retryable kind
/// (and a rate limit without a usable hint) follows the exponential
/// schedule `min(base * 2^attempt, max)` with `attempt` 0-indexed.
///
/// The function is total: kinds the rule table vetoes are never queried in
/// practice, but asking anyway yields the exponential schedule.
pub fn delay_for(
    config: &BackoffConfig,
    kind: FailureKind,
    attempt: u32,
    hint: Option<u64>,
) -> Duration {
    if kind == FailureKind::RateLimited {
        if let Some(secs) = hint {
            return Duration::from_secs(secs);
        }
    }

    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    let secs = config
        .base_delay_secs
        .saturating_mul(factor)
        .min(config.max_delay_secs);

    Duration::from_secs(secs)
}

/// Add up to 25% random variation to a delay.
///
/// Spreads out simultaneous retries from concurrent calls. Never applied to
/// server-provided wait hints.
pub fn apply_jitter(delay: Duration) -> Duration {
    if delay.is_zero() {
        return delay;
    }
    let jitter_range = delay.as_millis() as u64 / 4;
    let jitter = rand::rng().random_range(0..=jitter_range);
    delay + Duration::from_millis(jitter)
}
