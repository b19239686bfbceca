//! `Transport` trait and the reqwest-backed `HttpTransport`.
//!
//! A transport performs exactly one HTTP attempt; the retry policy lives in
//! [`ResilientClient`](crate::net::ResilientClient).  Keeping the seam here
//! lets the retry loop and everything above it be tested with in-process
//! doubles that never open a socket.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ApiConfig;

// ---------------------------------------------------------------------------
// TransportError / WireReply
// ---------------------------------------------------------------------------

/// Transport-level failure: the request never produced an HTTP status.
///
/// Covers connection refusal, DNS failure, TLS errors and timeouts.  All of
/// these are retryable from the caller's point of view.
#[derive(Debug, Error)]
#[error("transport failure: {0}")]
pub struct TransportError(pub String);

/// A completed HTTP exchange, before any status/JSON interpretation.
#[derive(Debug, Clone)]
pub struct WireReply {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

// ---------------------------------------------------------------------------
// Transport trait
// ---------------------------------------------------------------------------

/// Async trait over a single JSON POST attempt.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (e.g. wrapped in `Arc<dyn Transport>`).
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` as JSON to `url` and return the raw reply.
    ///
    /// An `Err` means the exchange never completed; any reply with a status
    /// code — including 4xx/5xx — is `Ok`.
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<WireReply, TransportError>;
}

// ---------------------------------------------------------------------------
// HttpTransport
// ---------------------------------------------------------------------------

/// reqwest-backed transport with the per-attempt timeout from [`ApiConfig`].
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build an `HttpTransport` from application config.
    ///
    /// A default (no-timeout) client is used as a last-resort fallback if the
    /// builder fails (should never happen in practice).
    pub fn from_config(config: &ApiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<WireReply, TransportError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(WireReply { status, body })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
