//! `EncounterController` — drives the generate / flesh-out / narrate flows.
//!
//! The controller owns the [`SharedState`] and mutates it around calls to its
//! `Arc<dyn …>` collaborators.  Every flow follows the same discipline:
//!
//! 1. Take the lock briefly — check the in-flight guard, enter the loading
//!    phase, snapshot whatever the request needs.
//! 2. Await the call with the lock released.
//! 3. Take the lock again to store the result (or the error) and restore the
//!    phase.  No path leaves the session in a loading phase.

use std::sync::Arc;
use std::time::Duration;

use crate::audio::{decode_base64_pcm, AudioPlayer, DEFAULT_SAMPLE_RATE};
use crate::genai::wire::parse_sample_rate;
use crate::genai::{
    GenAiError, SpeechRequest, SpeechSynthesizer, TextGenerator, TextRequest,
};
use crate::prompt::{build_flesh_out, build_generate, build_narrate, EncounterParams, NarrationStyle};

use super::state::{SessionError, SessionPhase, SharedState};

/// Temperature for the generate flow.
pub const GENERATE_TEMPERATURE: f64 = 0.8;

/// Temperature for the flesh-out flow.
pub const FLESH_OUT_TEMPERATURE: f64 = 0.7;

/// Separator inserted between the narrative and each appended detail block.
const DETAIL_SEPARATOR: &str = "\n\n---\n\n";

/// How often the watcher task polls for the natural end of playback.
const PLAYBACK_POLL: Duration = Duration::from_millis(100);

// outcome of the narrate entry guard, decided under the lock
enum NarrateEntry {
    Start(String),
    StopPlayback,
    Ignore,
}

// ---------------------------------------------------------------------------
// EncounterController
// ---------------------------------------------------------------------------

/// Orchestrates the three request flows and owns the session state.
///
/// Create with [`EncounterController::new`]; the same instance serves every
/// flow for the lifetime of the session.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use encounter_forge::audio::RodioPlayer;
/// use encounter_forge::config::AppConfig;
/// use encounter_forge::genai::GenAiClient;
/// use encounter_forge::net::{HttpTransport, ResilientClient};
/// use encounter_forge::session::{new_shared_state, EncounterController};
///
/// # fn example() {
/// let config = AppConfig::default();
/// let transport = Arc::new(HttpTransport::from_config(&config.api));
/// let http = ResilientClient::new(transport, config.retry.clone());
/// let genai = Arc::new(GenAiClient::new(http, config.api.clone()));
///
/// let controller = EncounterController::new(
///     new_shared_state(),
///     genai.clone(),
///     genai,
///     Arc::new(RodioPlayer::spawn().unwrap()),
/// );
/// # let _ = controller;
/// # }
/// ```
pub struct EncounterController {
    state: SharedState,
    text: Arc<dyn TextGenerator>,
    speech: Arc<dyn SpeechSynthesizer>,
    player: Arc<dyn AudioPlayer>,
}

impl EncounterController {
    /// Create a new controller.
    ///
    /// # Arguments
    ///
    /// * `state`  — shared session state (also read by the frontend).
    /// * `text`   — text generation backend (e.g. `GenAiClient`).
    /// * `speech` — speech synthesis backend (usually the same client).
    /// * `player` — audio playback device.
    pub fn new(
        state: SharedState,
        text: Arc<dyn TextGenerator>,
        speech: Arc<dyn SpeechSynthesizer>,
        player: Arc<dyn AudioPlayer>,
    ) -> Self {
        Self {
            state,
            text,
            speech,
            player,
        }
    }

    // -----------------------------------------------------------------------
    // generate
    // -----------------------------------------------------------------------

    /// Generate a fresh encounter, replacing any previous session content.
    ///
    /// No-op while a generation is already in flight.  The phase always lands
    /// back at `Ready` — with the narrative stored on success, or with
    /// `last_error` set on any failure.
    pub async fn generate(&self, params: EncounterParams) {
        {
            let mut st = self.state.lock().unwrap();
            if st.phase == SessionPhase::Generating {
                log::debug!("session: generate ignored — already generating");
                return;
            }
            st.phase = SessionPhase::Generating;
            st.narrative = None;
            st.citations.clear();
            st.last_error = None;
        }

        let parts = build_generate(&params);
        let request = TextRequest {
            system: parts.system,
            user: parts.user,
            temperature: GENERATE_TEMPERATURE,
            grounded: true,
        };

        match self.text.generate(request).await {
            Ok(reply) => {
                log::info!(
                    "session: encounter generated ({} chars, {} citations)",
                    reply.text.len(),
                    reply.citations.len()
                );
                let mut st = self.state.lock().unwrap();
                st.narrative = Some(reply.text);
                st.citations = reply.citations;
                st.phase = SessionPhase::Ready;
            }
            Err(GenAiError::MissingContent) => {
                self.finish_with_error(SessionError::GenerationFailed);
            }
            Err(e) => {
                self.finish_with_error(SessionError::Request(e.to_string()));
            }
        }
    }

    // -----------------------------------------------------------------------
    // flesh_out
    // -----------------------------------------------------------------------

    /// Append tactics / environment / treasure detail to the narrative.
    ///
    /// No-op while any request is in flight or before a narrative exists.
    /// Appends are cumulative; a failure keeps the existing narrative intact
    /// and sets a non-terminal error.
    pub async fn flesh_out(&self) {
        let narrative = {
            let mut st = self.state.lock().unwrap();
            if st.phase.is_busy() {
                log::debug!("session: flesh_out ignored — busy ({})", st.phase.label());
                return;
            }
            let Some(narrative) = st.narrative.clone() else {
                log::debug!("session: flesh_out ignored — no narrative yet");
                return;
            };
            st.phase = SessionPhase::DetailLoading;
            st.last_error = None;
            narrative
        };

        let parts = build_flesh_out(&narrative);
        let request = TextRequest {
            system: parts.system,
            user: parts.user,
            temperature: FLESH_OUT_TEMPERATURE,
            grounded: false,
        };

        match self.text.generate(request).await {
            Ok(reply) => {
                let mut st = self.state.lock().unwrap();
                if let Some(existing) = st.narrative.as_mut() {
                    existing.push_str(DETAIL_SEPARATOR);
                    existing.push_str(&reply.text);
                }
                st.phase = SessionPhase::Ready;
            }
            Err(e) => {
                log::warn!("session: flesh_out failed: {e}");
                self.finish_with_error(SessionError::Request(e.to_string()));
            }
        }
    }

    // -----------------------------------------------------------------------
    // narrate
    // -----------------------------------------------------------------------

    /// Speak the opening paragraph of the narrative in the given style.
    ///
    /// Calling this while audio is playing stops playback instead of issuing
    /// a new request (toggle).  No-op before a narrative exists or while a
    /// text request is in flight.  The `Speaking` phase clears automatically
    /// when playback ends.
    pub async fn narrate(&self, style: NarrationStyle) {
        let entry = {
            let mut st = self.state.lock().unwrap();
            if st.narrative.is_none() {
                log::debug!("session: narrate ignored — no narrative yet");
                NarrateEntry::Ignore
            } else if st.phase == SessionPhase::Speaking {
                st.phase = SessionPhase::Ready;
                NarrateEntry::StopPlayback
            } else if st.phase.is_busy() {
                log::debug!("session: narrate ignored — busy ({})", st.phase.label());
                NarrateEntry::Ignore
            } else {
                st.phase = SessionPhase::Speaking;
                st.last_error = None;
                NarrateEntry::Start(st.narrative.clone().unwrap_or_default())
            }
        };

        let narrative = match entry {
            NarrateEntry::Ignore => return,
            NarrateEntry::StopPlayback => {
                log::debug!("session: narrate toggled off — stopping playback");
                self.player.stop();
                return;
            }
            NarrateEntry::Start(narrative) => narrative,
        };

        let (parts, voice_name) = build_narrate(&narrative, style);
        let request = SpeechRequest {
            system: parts.system,
            text: parts.user,
            voice_name,
        };

        let payload = match self.speech.synthesize(request).await {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("session: speech synthesis failed: {e}");
                self.finish_with_error(SessionError::Audio(e.to_string()));
                return;
            }
        };

        let sample_rate = payload
            .mime_type
            .as_deref()
            .and_then(parse_sample_rate)
            .unwrap_or(DEFAULT_SAMPLE_RATE);

        let wav = match decode_base64_pcm(&payload.data, sample_rate) {
            Ok(wav) => wav,
            Err(e) => {
                log::warn!("session: audio decode failed: {e}");
                self.finish_with_error(SessionError::Audio(e.to_string()));
                return;
            }
        };

        {
            // The user may have toggled narration off while the synthesis was
            // in flight; re-check under the lock and drop the clip if so.
            // `play` is synchronous, so holding the lock here closes the
            // window between the check and the playback start.
            let mut st = self.state.lock().unwrap();
            if st.phase != SessionPhase::Speaking {
                log::debug!("session: narration toggled off mid-flight, dropping clip");
                return;
            }
            if let Err(e) = self.player.play(wav) {
                log::warn!("session: playback failed: {e}");
                st.last_error = Some(SessionError::Audio(e.to_string()));
                st.phase = SessionPhase::Ready;
                return;
            }
        }

        log::info!("session: narration playing at {sample_rate} Hz ({voice_name})");
        self.spawn_playback_watcher();
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Record an error and restore the phase to `Ready` in one critical
    /// section.
    fn finish_with_error(&self, error: SessionError) {
        log::error!("session error: {error}");
        let mut st = self.state.lock().unwrap();
        st.last_error = Some(error);
        st.phase = SessionPhase::Ready;
    }

    /// Clear the `Speaking` phase once playback ends naturally.
    ///
    /// An explicit stop flips the phase first; the watcher then simply
    /// observes a non-Speaking phase and exits.
    fn spawn_playback_watcher(&self) {
        let state = Arc::clone(&self.state);
        let player = Arc::clone(&self.player);

        tokio::spawn(async move {
            let mut tick = tokio::time::interval(PLAYBACK_POLL);
            tick.tick().await; // first tick completes immediately
            loop {
                tick.tick().await;
                {
                    let mut st = state.lock().unwrap();
                    if st.phase != SessionPhase::Speaking {
                        break;
                    }
                    if !player.is_playing() {
                        st.phase = SessionPhase::Ready;
                        break;
                    }
                }
            }
            log::debug!("session: playback watcher finished");
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
