//! Retry rule table
//!
//! The kind set is closed, so the policy is a single pure function rather
//! than a pluggable predicate. The table is constant for the lifetime of the
//! process.

use crate::failure::FailureKind;

/// Whether a failure of the given kind should be retried.
///
/// Retryable kinds are transient upstream conditions: rate limiting, server
/// faults, and network failures. Everything else will not change on an
/// immediate retry and surfaces at once so the caller can act (re-auth on
/// `TokenExpired`, fix the request on `ClientError`, and so on).
pub fn should_retry(kind: FailureKind) -> bool {
    matches!(
        kind,
        FailureKind::RateLimited | FailureKind::ServerError | FailureKind::Network
    )
}
