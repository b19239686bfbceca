//! Session state machine and shared state.
//!
//! [`SessionPhase`] drives the controller's state machine; a frontend reads
//! it via [`SharedState`] to decide what to render and which actions to
//! enable.  [`SessionState`] is the single source of truth: current phase,
//! the narrative markdown, its citations, and the last error.

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::genai::Citation;

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// Phases of one encounter session.
///
/// The transitions are:
///
/// ```text
/// Idle ──generate()──▶ Generating ──done/error──▶ Ready
/// Ready ──flesh_out()──▶ DetailLoading ──done/error──▶ Ready
/// Ready ──narrate()──▶ Speaking ──playback end / stop / error──▶ Ready
/// ```
///
/// Errors land in `Ready` with [`SessionState::last_error`] set; no flow ever
/// leaves the session stuck in a loading phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No encounter generated yet.
    Idle,

    /// A generate request is in flight.
    Generating,

    /// A narrative exists; flesh-out and narrate are available.
    Ready,

    /// A flesh-out request is in flight.
    DetailLoading,

    /// A narration request is in flight or audio is playing.
    Speaking,
}

impl SessionPhase {
    /// Returns `true` while any request is in flight.
    ///
    /// ```
    /// use encounter_forge::session::SessionPhase;
    ///
    /// assert!(!SessionPhase::Idle.is_busy());
    /// assert!(SessionPhase::Generating.is_busy());
    /// assert!(!SessionPhase::Ready.is_busy());
    /// assert!(SessionPhase::DetailLoading.is_busy());
    /// assert!(SessionPhase::Speaking.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SessionPhase::Generating | SessionPhase::DetailLoading | SessionPhase::Speaking
        )
    }

    /// A short human-readable label suitable for a status line.
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "Idle",
            SessionPhase::Generating => "Generating",
            SessionPhase::Ready => "Ready",
            SessionPhase::DetailLoading => "Adding detail",
            SessionPhase::Speaking => "Speaking",
        }
    }
}

impl Default for SessionPhase {
    fn default() -> Self {
        SessionPhase::Idle
    }
}

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

/// User-visible session errors.
///
/// Every variant is locally recoverable: the user may retry the same action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The model replied without usable encounter text.
    #[error("the model returned no encounter — try again")]
    GenerationFailed,

    /// An HTTP call failed; the message carries the caller's description.
    #[error("request failed: {0}")]
    Request(String),

    /// Narration failed to synthesize, decode, or play.
    #[error("narration failed: {0}")]
    Audio(String),
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Everything a frontend needs about the current session.
///
/// Mutated only by the [`EncounterController`](crate::session::EncounterController)
/// in response to call completion; reset at the start of a new generate.
#[derive(Debug, Default)]
pub struct SessionState {
    /// Current phase of the session state machine.
    pub phase: SessionPhase,

    /// The encounter markdown, including appended flesh-out sections.
    ///
    /// `None` until the first generate completes.
    pub narrative: Option<String>,

    /// Grounding citations for the narrative, in received order.
    pub citations: Vec<Citation>,

    /// The most recent error, cleared when the action is retried.
    pub last_error: Option<SessionError>,
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`SessionState`].
///
/// Cheap to clone (`Arc` clone).  Lock with `.lock().unwrap()` for a short
/// critical section; do **not** hold the lock across `.await` points.
pub type SharedState = Arc<Mutex<SessionState>>;

/// Construct a new [`SharedState`] wrapping a default [`SessionState`].
pub fn new_shared_state() -> SharedState {
    Arc::new(Mutex::new(SessionState::default()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- SessionPhase::is_busy ---

    #[test]
    fn idle_and_ready_are_not_busy() {
        assert!(!SessionPhase::Idle.is_busy());
        assert!(!SessionPhase::Ready.is_busy());
    }

    #[test]
    fn in_flight_phases_are_busy() {
        assert!(SessionPhase::Generating.is_busy());
        assert!(SessionPhase::DetailLoading.is_busy());
        assert!(SessionPhase::Speaking.is_busy());
    }

    // ---- SessionPhase::label ---

    #[test]
    fn labels_are_distinct() {
        let labels = [
            SessionPhase::Idle.label(),
            SessionPhase::Generating.label(),
            SessionPhase::Ready.label(),
            SessionPhase::DetailLoading.label(),
            SessionPhase::Speaking.label(),
        ];
        let mut unique = labels.to_vec();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), labels.len());
    }

    // ---- Defaults ---

    #[test]
    fn default_state_is_idle_and_empty() {
        let state = SessionState::default();
        assert_eq!(state.phase, SessionPhase::Idle);
        assert!(state.narrative.is_none());
        assert!(state.citations.is_empty());
        assert!(state.last_error.is_none());
    }

    // ---- SharedState ---

    #[test]
    fn shared_state_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedState>();
    }

    #[test]
    fn shared_state_can_be_cloned_and_mutated() {
        let state = new_shared_state();
        let state2 = Arc::clone(&state);

        state.lock().unwrap().phase = SessionPhase::Generating;
        assert_eq!(state2.lock().unwrap().phase, SessionPhase::Generating);
    }

    // ---- SessionError display ---

    #[test]
    fn error_messages_are_user_readable() {
        assert!(SessionError::GenerationFailed.to_string().contains("try again"));
        assert!(SessionError::Request("HTTP 500".into())
            .to_string()
            .contains("HTTP 500"));
        assert!(SessionError::Audio("no device".into())
            .to_string()
            .contains("no device"));
    }
}
