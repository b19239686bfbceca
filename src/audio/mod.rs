//! Audio handling — base64 PCM decode, WAV container encode, playback.
//!
//! # Pipeline
//!
//! ```text
//! inlineData.data (base64 PCM) → decode_base64_pcm → 44-byte RIFF/WAVE header
//!                              → AudioPlayer::play (rodio, dedicated thread)
//! ```
//!
//! The synthesized payload is raw 16-bit signed mono PCM; wrapping it in a
//! standard WAV header makes it playable by any decoder.

pub mod playback;
pub mod wav;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use playback::{AudioPlayer, RodioPlayer};
pub use wav::{decode_base64_pcm, pcm_to_wav, AudioError, DEFAULT_SAMPLE_RATE};

// test-only re-export so the session test module can use the in-memory
// player without reaching into `audio::playback` internals.
#[cfg(test)]
pub(crate) use playback::MockPlayer;
