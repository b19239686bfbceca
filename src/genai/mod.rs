//! generateContent wire layer for encounter-forge.
//!
//! This module provides:
//! * [`TextGenerator`] / [`SpeechSynthesizer`] — async traits implemented by
//!   the real client and by test doubles.
//! * [`GenAiClient`] — config-driven client over the resilient HTTP caller.
//! * [`wire`] — request body builders and response extraction helpers.
//! * [`Citation`] — a grounding attribution kept only when complete.
//! * [`GenAiError`] — error variants for a generateContent exchange.

pub mod client;
pub mod wire;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{
    AudioPayload, GenAiClient, GenAiError, SpeechRequest, SpeechSynthesizer, TextGenerator,
    TextReply, TextRequest,
};
pub use wire::Citation;
