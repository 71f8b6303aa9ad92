//! reqwest boundary: raw failure signal construction
//!
//! Everything reqwest can report is funneled into a [`FailureSignal`] here,
//! so the classifier stays pure and never sees transport types.

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use setlist_core::{FailureSignal, TransportKind};

/// Convert a reqwest error into a raw failure signal.
///
/// Connect failures and timeouts map to their transport kinds; any other
/// wire-level failure is a generic request failure. Body decode errors are
/// not transport failures: the request completed, the payload was wrong.
pub fn signal_from_reqwest(err: &reqwest::Error) -> FailureSignal {
    if err.is_connect() {
        FailureSignal::transport(TransportKind::Connect, err.to_string())
    } else if err.is_timeout() {
        FailureSignal::transport(TransportKind::Timeout, err.to_string())
    } else if err.is_decode() {
        FailureSignal::other(err.to_string())
    } else {
        FailureSignal::transport(TransportKind::Request, err.to_string())
    }
}

/// Build the status signal for a non-success response, capturing the raw
/// `Retry-After` header value when the server sent one.
pub fn signal_from_status(status: StatusCode, headers: &HeaderMap, body: &str) -> FailureSignal {
    let reason = status.canonical_reason().unwrap_or("upstream failure");
    let message = if body.trim().is_empty() {
        reason.to_string()
    } else {
        format!("{reason}: {}", truncate(body.trim(), 200))
    };

    let retry_after = headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    match retry_after {
        Some(raw) => FailureSignal::status_with_retry_after(status.as_u16(), message, raw),
        None => FailureSignal::status(status.as_u16(), message),
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
