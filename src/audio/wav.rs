//! base64 PCM decoding and WAV container encoding.
//!
//! The container is the standard 44-byte RIFF/WAVE/fmt/data layout for mono
//! 16-bit linear PCM.  No external WAV writer is needed at this size; the
//! header is written field by field in little-endian order.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use thiserror::Error;

/// Sample rate assumed when the response declares no `rate=` in its mime type.
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

const NUM_CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;

// ---------------------------------------------------------------------------
// AudioError
// ---------------------------------------------------------------------------

/// Errors that can occur while decoding or playing synthesized audio.
#[derive(Debug, Error)]
pub enum AudioError {
    /// The base64 payload could not be decoded.
    #[error("invalid base64 audio payload: {0}")]
    Decode(String),

    /// The payload decoded to zero bytes.
    #[error("audio payload was empty")]
    EmptyPayload,

    /// The playback device failed or is unavailable.
    #[error("audio playback failed: {0}")]
    Playback(String),
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Wrap raw 16-bit mono PCM bytes in a 44-byte RIFF/WAVE header.
///
/// Layout: `RIFF <size> WAVE fmt <16> <pcm=1> <channels> <rate> <byte rate>
/// <block align> <bits> data <size>` followed by the samples.
pub fn pcm_to_wav(pcm: &[u8], sample_rate: u32) -> Vec<u8> {
    let data_len = pcm.len() as u32;
    let byte_rate = sample_rate * u32::from(NUM_CHANNELS) * u32::from(BITS_PER_SAMPLE) / 8;
    let block_align = NUM_CHANNELS * BITS_PER_SAMPLE / 8;

    let mut wav = Vec::with_capacity(44 + pcm.len());
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes()); // fmt chunk size
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    wav.extend_from_slice(&NUM_CHANNELS.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.extend_from_slice(pcm);
    wav
}

/// Decode a base64 linear-PCM payload into a playable WAV byte buffer.
///
/// Fails on malformed base64 and on an empty payload; the caller supplies
/// the sample rate parsed from the response mime type (or
/// [`DEFAULT_SAMPLE_RATE`]).
pub fn decode_base64_pcm(data: &str, sample_rate: u32) -> Result<Vec<u8>, AudioError> {
    let pcm = B64
        .decode(data)
        .map_err(|e| AudioError::Decode(e.to_string()))?;
    if pcm.is_empty() {
        return Err(AudioError::EmptyPayload);
    }
    Ok(pcm_to_wav(&pcm, sample_rate))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;

    fn le_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    fn le_u16(bytes: &[u8], at: usize) -> u16 {
        u16::from_le_bytes(bytes[at..at + 2].try_into().unwrap())
    }

    /// Re-reading the produced header must report mono 16-bit at the given
    /// rate, with data size equal to 2 × sample count.
    #[test]
    fn header_round_trip_at_24k() {
        let samples: Vec<i16> = (0..100).map(|n| n * 32).collect();
        let pcm: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        let b64 = B64.encode(&pcm);

        let wav = decode_base64_pcm(&b64, 24_000).unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(le_u32(&wav, 16), 16); // fmt chunk size
        assert_eq!(le_u16(&wav, 20), 1); // PCM
        assert_eq!(le_u16(&wav, 22), 1, "numChannels");
        assert_eq!(le_u32(&wav, 24), 24_000, "sampleRate");
        assert_eq!(le_u16(&wav, 34), 16, "bitsPerSample");
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(le_u32(&wav, 40) as usize, 2 * samples.len(), "dataSize");

        // Chunk sizes are consistent with the total length.
        assert_eq!(wav.len(), 44 + 2 * samples.len());
        assert_eq!(le_u32(&wav, 4) as usize, wav.len() - 8);

        // The PCM bytes survive untouched.
        assert_eq!(&wav[44..], &pcm[..]);
    }

    #[test]
    fn byte_rate_and_block_align() {
        let wav = pcm_to_wav(&[0u8; 4], 16_000);
        assert_eq!(le_u32(&wav, 28), 32_000, "byteRate = rate × 2");
        assert_eq!(le_u16(&wav, 32), 2, "blockAlign");
    }

    #[test]
    fn invalid_base64_is_decode_error() {
        let err = decode_base64_pcm("!!!not base64!!!", 24_000).unwrap_err();
        assert!(matches!(err, AudioError::Decode(_)));
    }

    #[test]
    fn empty_payload_is_rejected() {
        let err = decode_base64_pcm("", 24_000).unwrap_err();
        assert!(matches!(err, AudioError::EmptyPayload));
    }

    #[test]
    fn default_sample_rate_is_24k() {
        assert_eq!(DEFAULT_SAMPLE_RATE, 24_000);
    }
}
