//! Prompt construction for encounter-forge.
//!
//! This module provides:
//! * [`EncounterParams`] / [`Difficulty`] — validated request parameters.
//! * [`NarrationStyle`] — the two fixed narration styles with their voice ids.
//! * [`build_generate`] / [`build_flesh_out`] / [`build_narrate`] — pure
//!   template functions producing a `(system, user)` pair per request kind.
//!
//! All builders are deterministic: the same inputs always produce the same
//! strings, and no input is ever mutated.

pub mod builder;
pub mod params;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use builder::{
    build_flesh_out, build_generate, build_narrate, first_paragraph, NarrationStyle, PromptParts,
};
pub use params::{Difficulty, EncounterParams, ParamsError};
