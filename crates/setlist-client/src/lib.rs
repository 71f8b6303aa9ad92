//! # setlist-client
//!
//! Client for the upstream music service, composing the resilience core:
//! - `signal`: converts transport-level errors and HTTP statuses into the
//!   raw failure signals the classifier consumes
//! - `transport`: the one-request-per-call boundary (`Transport` trait and
//!   the reqwest-backed `HttpTransport`)
//! - `service`: per-operation entry points that consult the cache, wrap the
//!   transport call in the retry engine, and invalidate after mutations
//!
//! Callers receive either the decoded value or one of the seven typed
//! failures; `TokenExpired` is the signal to refresh credentials upstream
//! of this crate.

pub mod service;
pub mod signal;
pub mod transport;

pub use service::PlaylistService;
pub use transport::{HttpTransport, RequestSpec, Transport};
