//! Upstream transport boundary
//!
//! A [`Transport`] performs exactly one network request per call and reports
//! failures as raw signals. It never retries, never caches, and never
//! decides what to request; that belongs to the service layer and the
//! resilience core above it.

use crate::signal::{signal_from_reqwest, signal_from_status};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use setlist_core::FailureSignal;
use std::time::Duration;
use url::Url;

/// Description of one upstream call.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    /// HTTP method
    pub method: Method,
    /// Path relative to the service base URL
    pub path: String,
    /// Query parameters
    pub query: Vec<(String, String)>,
    /// JSON body for mutations
    pub body: Option<Value>,
    /// Whether repeating the request after an ambiguous failure is safe.
    ///
    /// Reads are idempotent; mutations are not unless explicitly marked.
    /// The service layer only auto-retries idempotent specs.
    pub idempotent: bool,
}

impl RequestSpec {
    /// A GET request; idempotent by construction.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
            idempotent: true,
        }
    }

    /// A PUT request with a JSON body; treated as non-idempotent until
    /// marked otherwise.
    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::PUT,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
            idempotent: false,
        }
    }

    /// Append a query parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Mark the request safe to repeat.
    pub fn mark_idempotent(mut self) -> Self {
        self.idempotent = true;
        self
    }
}

/// The upstream operation contract: one request, one decoded value or one
/// raw failure signal.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the described request once.
    async fn send(&self, spec: &RequestSpec) -> Result<Value, FailureSignal>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    token: String,
}

impl HttpTransport {
    /// Create a transport for the given service base URL and bearer token.
    ///
    /// Token refresh is the caller's concern; on `TokenExpired` the caller
    /// builds a new transport with fresh credentials.
    pub fn new(base_url: Url, token: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("setlist/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to create HTTP client");

        Self {
            client,
            base_url,
            token: token.into(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, spec: &RequestSpec) -> Result<Value, FailureSignal> {
        let url = self
            .base_url
            .join(&spec.path)
            .map_err(|err| FailureSignal::other(format!("invalid request path: {err}")))?;

        let mut request = self
            .client
            .request(spec.method.clone(), url)
            .bearer_auth(&self.token);
        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }
        if let Some(body) = &spec.body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|err| signal_from_reqwest(&err))?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            return Err(signal_from_status(status, &headers, &body));
        }

        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        response
            .json::<Value>()
            .await
            .map_err(|err| signal_from_reqwest(&err))
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_specs_are_idempotent() {
        let spec = RequestSpec::get("playlists/p1");
        assert!(spec.idempotent);
        assert_eq!(spec.method, Method::GET);
    }

    #[test]
    fn put_specs_are_not_idempotent_by_default() {
        let spec = RequestSpec::put("playlists/p1/tracks", serde_json::json!({}));
        assert!(!spec.idempotent);
        assert!(spec.mark_idempotent().idempotent);
    }

    #[test]
    fn query_parameters_accumulate() {
        let spec = RequestSpec::get("playlists/p1/tracks")
            .with_query("offset", "0")
            .with_query("limit", "100");
        assert_eq!(spec.query.len(), 2);
        assert_eq!(spec.query[1], ("limit".to_string(), "100".to_string()));
    }
}
