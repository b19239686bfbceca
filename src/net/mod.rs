//! Resilient HTTP layer for encounter-forge.
//!
//! This module provides:
//! * [`Transport`] — async trait over a single JSON POST attempt.
//! * [`HttpTransport`] — reqwest-backed implementation.
//! * [`ResilientClient`] — bounded retry loop with jittered exponential
//!   backoff around any [`Transport`].
//! * [`CallError`] — error taxonomy for a completed (failed) call.
//!
//! # Retry contract
//!
//! ```text
//! attempt 0 ──▶ 2xx            → Ok(parsed JSON)
//!           ──▶ 429 / network  → sleep 2^0·base + jitter, retry
//!           ──▶ other status   → Err(CallError::Http) — no retry
//! …
//! attempt 5 ──▶ 429 / network  → Err(RateLimited / Network { attempts: 6 })
//! ```

pub mod client;
pub mod transport;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{CallError, ResilientClient};
pub use transport::{HttpTransport, Transport, TransportError, WireReply};
