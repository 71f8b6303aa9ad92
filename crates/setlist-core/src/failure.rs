//! Failure taxonomy for upstream API calls
//!
//! Every failure observed at the upstream boundary is classified into exactly
//! one [`FailureKind`] and surfaced to callers as the matching [`ApiFailure`]
//! variant. No other error type escapes the resilience core.

use thiserror::Error;

/// The seven failure categories for upstream calls.
///
/// The set is closed: every raw failure signal maps to exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The requested resource does not exist upstream (HTTP 404)
    NotFound,

    /// The access token was rejected and must be refreshed (HTTP 401)
    TokenExpired,

    /// The upstream rate limit was hit (HTTP 429)
    RateLimited,

    /// The upstream service failed (HTTP 5xx)
    ServerError,

    /// The request was rejected as invalid (other HTTP 4xx)
    ClientError,

    /// The request never completed: connect failure, timeout, or a
    /// transport-level error with no status
    Network,

    /// Anything else, including programming errors surfaced at the boundary
    Unexpected,
}

impl FailureKind {
    /// Stable name used in log fields and cache diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::NotFound => "not-found",
            FailureKind::TokenExpired => "token-expired",
            FailureKind::RateLimited => "rate-limited",
            FailureKind::ServerError => "server-error",
            FailureKind::ClientError => "client-error",
            FailureKind::Network => "network",
            FailureKind::Unexpected => "unexpected",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport-level failure categories reported by the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Could not establish a connection
    Connect,

    /// The request or connect attempt timed out
    Timeout,

    /// The request failed without producing a status code
    Request,
}

/// Raw failure signal handed to the classifier by the transport boundary.
///
/// A signal is either an HTTP status (with the raw `Retry-After` header value
/// when the server sent one), a transport-level failure, or an arbitrary
/// error that occurred while issuing the call.
#[derive(Debug, Clone)]
pub enum FailureSignal {
    /// The server responded with a non-success status
    Status {
        /// HTTP status code
        code: u16,
        /// Human-readable description of the failure
        message: String,
        /// Raw `Retry-After` header value, if present
        retry_after: Option<String>,
    },

    /// The request failed at the transport level
    Transport {
        /// What went wrong on the wire
        kind: TransportKind,
        /// Human-readable description of the failure
        message: String,
    },

    /// Any other failure raised while performing the call
    Other {
        /// Human-readable description of the failure
        message: String,
    },
}

impl FailureSignal {
    /// Create a status signal without a retry hint.
    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self::Status {
            code,
            message: message.into(),
            retry_after: None,
        }
    }

    /// Create a status signal carrying the raw `Retry-After` header value.
    pub fn status_with_retry_after(
        code: u16,
        message: impl Into<String>,
        retry_after: impl Into<String>,
    ) -> Self {
        Self::Status {
            code,
            message: message.into(),
            retry_after: Some(retry_after.into()),
        }
    }

    /// Create a transport-level signal.
    pub fn transport(kind: TransportKind, message: impl Into<String>) -> Self {
        Self::Transport {
            kind,
            message: message.into(),
        }
    }

    /// Create a signal for a failure with no status and no transport category.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// The human-readable message carried by the signal.
    pub fn message(&self) -> &str {
        match self {
            FailureSignal::Status { message, .. }
            | FailureSignal::Transport { message, .. }
            | FailureSignal::Other { message } => message,
        }
    }

    /// The server-provided wait hint in whole seconds, if one was sent and
    /// parses as a non-negative number.
    pub fn retry_after_hint(&self) -> Option<u64> {
        match self {
            FailureSignal::Status {
                retry_after: Some(raw),
                ..
            } => crate::classify::parse_retry_after(raw),
            _ => None,
        }
    }
}

impl std::fmt::Display for FailureSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureSignal::Status { code, message, .. } => {
                write!(f, "status {code}: {message}")
            }
            FailureSignal::Transport { kind, message } => {
                let label = match kind {
                    TransportKind::Connect => "connect",
                    TransportKind::Timeout => "timeout",
                    TransportKind::Request => "request",
                };
                write!(f, "transport ({label}): {message}")
            }
            FailureSignal::Other { message } => write!(f, "{message}"),
        }
    }
}

/// Typed failure surfaced to callers, one variant per [`FailureKind`].
///
/// Callers match broadly on `ApiFailure` or narrowly on a variant; by
/// convention `TokenExpired` triggers re-authentication at a higher layer and
/// every other kind is terminal for the request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiFailure {
    /// The requested resource does not exist upstream
    #[error("resource not found: {message}")]
    NotFound { message: String },

    /// The access token was rejected; the caller should re-authenticate
    #[error("access token expired: {message}")]
    TokenExpired { message: String },

    /// The upstream rate limit was exceeded
    #[error("rate limited by upstream: {message}")]
    RateLimited {
        message: String,
        /// Server-provided wait hint in seconds, if any
        retry_after: Option<u64>,
    },

    /// The upstream service failed
    #[error("upstream server error (status {status}): {message}")]
    ServerError { status: u16, message: String },

    /// The request was rejected as invalid
    #[error("upstream rejected request (status {status}): {message}")]
    ClientError { status: u16, message: String },

    /// The request never completed at the transport level
    #[error("network failure: {message}")]
    Network { message: String },

    /// An unclassifiable failure
    #[error("unexpected failure: {message}")]
    Unexpected { message: String },
}

impl ApiFailure {
    /// The [`FailureKind`] this failure belongs to.
    pub fn kind(&self) -> FailureKind {
        match self {
            ApiFailure::NotFound { .. } => FailureKind::NotFound,
            ApiFailure::TokenExpired { .. } => FailureKind::TokenExpired,
            ApiFailure::RateLimited { .. } => FailureKind::RateLimited,
            ApiFailure::ServerError { .. } => FailureKind::ServerError,
            ApiFailure::ClientError { .. } => FailureKind::ClientError,
            ApiFailure::Network { .. } => FailureKind::Network,
            ApiFailure::Unexpected { .. } => FailureKind::Unexpected,
        }
    }

    /// The server-provided wait hint, present only on `RateLimited`.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            ApiFailure::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Build the typed failure for a raw signal.
    ///
    /// The variant is chosen by [`crate::classify::classify`]; the message and
    /// (for rate limiting) the parsed wait hint are carried over from the
    /// signal.
    pub fn from_signal(signal: &FailureSignal) -> Self {
        let message = signal.message().to_string();
        match crate::classify::classify(signal) {
            FailureKind::NotFound => ApiFailure::NotFound { message },
            FailureKind::TokenExpired => ApiFailure::TokenExpired { message },
            FailureKind::RateLimited => ApiFailure::RateLimited {
                message,
                retry_after: signal.retry_after_hint(),
            },
            FailureKind::ServerError => ApiFailure::ServerError {
                status: signal_status(signal),
                message,
            },
            FailureKind::ClientError => ApiFailure::ClientError {
                status: signal_status(signal),
                message,
            },
            FailureKind::Network => ApiFailure::Network { message },
            FailureKind::Unexpected => ApiFailure::Unexpected { message },
        }
    }
}

fn signal_status(signal: &FailureSignal) -> u16 {
    match signal {
        FailureSignal::Status { code, .. } => *code,
        _ => 0,
    }
}

impl From<&FailureSignal> for ApiFailure {
    fn from(signal: &FailureSignal) -> Self {
        ApiFailure::from_signal(signal)
    }
}
