//! `ResilientClient` — bounded retry loop with jittered exponential backoff.
//!
//! Only two failure classes are retried: transport-level failures (the
//! request never completed) and HTTP 429.  Every other non-2xx status fails
//! immediately, surfacing the status code.  The retry budget is an explicit
//! loop counter so it is visible and testable, never recursion.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;

use crate::config::RetryConfig;
use crate::net::transport::{Transport, TransportError};

// ---------------------------------------------------------------------------
// CallError
// ---------------------------------------------------------------------------

/// Terminal outcome of a resilient call.
#[derive(Debug, Error)]
pub enum CallError {
    /// Non-429 non-2xx status — failed on the first attempt, no retries.
    #[error("endpoint returned HTTP {status}")]
    Http { status: u16 },

    /// Every attempt was rate-limited (HTTP 429).
    #[error("rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// Every attempt failed at the transport level.
    #[error("network failure after {attempts} attempts: {last}")]
    Network { attempts: u32, last: String },

    /// A 2xx reply whose body was not valid JSON.
    #[error("failed to parse response body: {0}")]
    Parse(String),
}

// last cause tracked across the retry loop
enum RetryCause {
    RateLimited,
    Network(String),
}

// ---------------------------------------------------------------------------
// ResilientClient
// ---------------------------------------------------------------------------

/// Issues JSON POST requests through a [`Transport`], absorbing transient
/// failures up to the configured retry budget.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use encounter_forge::config::{ApiConfig, RetryConfig};
/// use encounter_forge::net::{HttpTransport, ResilientClient};
///
/// # async fn example() {
/// let transport = Arc::new(HttpTransport::from_config(&ApiConfig::default()));
/// let client = ResilientClient::new(transport, RetryConfig::default());
///
/// let body = serde_json::json!({ "contents": [] });
/// let reply = client.post("http://localhost:8787/v1beta/models/m:generateContent", &body).await;
/// # let _ = reply;
/// # }
/// ```
pub struct ResilientClient {
    transport: Arc<dyn Transport>,
    retry: RetryConfig,
}

impl ResilientClient {
    /// Create a client over `transport` with the given retry policy.
    pub fn new(transport: Arc<dyn Transport>, retry: RetryConfig) -> Self {
        Self { transport, retry }
    }

    /// POST `body` to `url`, retrying on 429 and transport failure.
    ///
    /// Returns the parsed JSON body of the first 2xx reply, or a terminal
    /// [`CallError`] identifying the last cause once the budget is spent.
    pub async fn post(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, CallError> {
        let mut attempt: u32 = 0;

        loop {
            let cause = match self.transport.post_json(url, body).await {
                Ok(reply) if (200..300).contains(&reply.status) => {
                    return serde_json::from_str(&reply.body)
                        .map_err(|e| CallError::Parse(e.to_string()));
                }
                Ok(reply) if reply.status == 429 => {
                    log::warn!("net: HTTP 429 on attempt {}", attempt + 1);
                    RetryCause::RateLimited
                }
                Ok(reply) => {
                    // Terminal on the first occurrence — other 4xx/5xx are
                    // never retried.
                    return Err(CallError::Http {
                        status: reply.status,
                    });
                }
                Err(TransportError(msg)) => {
                    log::warn!("net: transport failure on attempt {}: {msg}", attempt + 1);
                    RetryCause::Network(msg)
                }
            };

            if attempt >= self.retry.max_retries {
                let attempts = attempt + 1;
                return Err(match cause {
                    RetryCause::RateLimited => CallError::RateLimited { attempts },
                    RetryCause::Network(last) => CallError::Network { attempts, last },
                });
            }

            let delay = self.backoff_delay(attempt);
            log::debug!("net: retrying in {delay:?} (attempt {})", attempt + 2);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Delay before retry number `attempt` (0-based):
    /// `2^attempt * base_delay_ms + uniform(0, max_jitter_ms)`.
    ///
    /// With `max_jitter_ms == 0` this is exactly the deterministic floor, so
    /// tests can assert the strictly increasing minimum delays.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let floor = self
            .retry
            .base_delay_ms
            .saturating_mul(1u64 << attempt.min(32));
        let jitter = if self.retry.max_jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..self.retry.max_jitter_ms)
        };
        Duration::from_millis(floor.saturating_add(jitter))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
