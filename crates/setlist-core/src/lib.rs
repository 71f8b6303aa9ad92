//! # setlist-core
//!
//! Core library for Setlist providing:
//! - The seven-kind failure taxonomy for upstream API calls
//! - Pure classification of raw failure signals
//! - Retry execution engine with bounded exponential backoff
//! - Runtime configuration types and loading

pub mod classify;
pub mod config;
pub mod error;
pub mod failure;
pub mod retry;

pub use classify::classify;
pub use config::{BackoffConfig, CacheTtlConfig, ResilienceConfig};
pub use error::{Error, Result};
pub use failure::{ApiFailure, FailureKind, FailureSignal, TransportKind};
