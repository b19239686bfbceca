//! Encounter session orchestration.
//!
//! This module wires the full params → prompt → API → state flow and exposes
//! the shared state a frontend reads.
//!
//! # Architecture
//!
//! ```text
//! generate(params) ──▶ build_generate ──▶ TextGenerator   [Generating]
//!                                             │
//!                          narrative + citations stored   [Ready]
//!
//! flesh_out() ──▶ build_flesh_out ──▶ TextGenerator       [DetailLoading]
//!                       └─ "\n\n---\n\n" + detail appended [Ready]
//!
//! narrate(style) ──▶ build_narrate ──▶ SpeechSynthesizer  [Speaking]
//!                       └─ base64 PCM → WAV → AudioPlayer
//!                          watcher clears the phase       [Ready]
//! ```
//!
//! `SharedState` (`Arc<Mutex<SessionState>>`) is read by the frontend and
//! mutated only by the controller.

pub mod controller;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use controller::{EncounterController, FLESH_OUT_TEMPERATURE, GENERATE_TEMPERATURE};
pub use state::{new_shared_state, SessionError, SessionPhase, SessionState, SharedState};
