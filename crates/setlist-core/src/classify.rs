//! Pure classification of raw failure signals
//!
//! [`classify`] is a total function: every signal maps to exactly one
//! [`FailureKind`], it never panics, and it inspects nothing but its
//! argument. The retry policy and the typed failure constructors are both
//! driven by its output.

use crate::failure::{FailureKind, FailureSignal};

/// Map a raw failure signal to its failure kind.
///
/// Status codes take precedence in this order: 404, 401, 429, 5xx, then any
/// remaining 4xx. Transport-level failures classify as [`FailureKind::Network`];
/// everything else, including failure statuses outside the 4xx/5xx ranges,
/// classifies as [`FailureKind::Unexpected`].
pub fn classify(signal: &FailureSignal) -> FailureKind {
    match signal {
        FailureSignal::Status { code, .. } => classify_status(*code),
        FailureSignal::Transport { .. } => FailureKind::Network,
        FailureSignal::Other { .. } => FailureKind::Unexpected,
    }
}

fn classify_status(code: u16) -> FailureKind {
    match code {
        404 => FailureKind::NotFound,
        401 => FailureKind::TokenExpired,
        429 => FailureKind::RateLimited,
        500..=599 => FailureKind::ServerError,
        400..=499 => FailureKind::ClientError,
        _ => FailureKind::Unexpected,
    }
}

/// Parse a `Retry-After` header value into whole seconds.
///
/// Accepts a non-negative integer or decimal number of seconds; a decimal
/// value is rounded up so the server's wait is never undercut. HTTP-date
/// forms and negative or non-numeric values yield `None`, in which case the
/// caller falls back to the exponential schedule.
pub fn parse_retry_after(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    if let Ok(secs) = trimmed.parse::<u64>() {
        return Some(secs);
    }
    match trimmed.parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => Some(secs.ceil() as u64),
        _ => None,
    }
}
