//! Request body builders and response extraction for the generateContent API.
//!
//! All helpers operate on raw `serde_json::Value`s; typed results exist only
//! at the edges ([`Citation`], the audio payload fields).  Extraction is
//! deliberately index-based because the wire format nests a single candidate
//! with a single part in every flow this crate uses.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Citation
// ---------------------------------------------------------------------------

/// A grounding attribution: the external page that informed the answer.
///
/// Both fields are required — entries missing either are dropped during
/// extraction rather than padded with placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub uri: String,
    pub title: String,
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body for a text generation request.
///
/// `grounded` adds the `google_search` tool so the response may carry
/// grounding attributions.
pub fn text_request_body(system: &str, user: &str, temperature: f64, grounded: bool) -> Value {
    let mut body = json!({
        "contents": [ { "parts": [ { "text": user } ] } ],
        "systemInstruction": { "parts": [ { "text": system } ] },
        "generationConfig": { "temperature": temperature }
    });
    if grounded {
        body["tools"] = json!([ { "google_search": {} } ]);
    }
    body
}

/// Body for a speech synthesis request.
///
/// The AUDIO-only response modality and the prebuilt voice id are fixed by
/// the caller's narration style.
pub fn speech_request_body(system: &str, text: &str, voice_name: &str) -> Value {
    json!({
        "contents": [ { "parts": [ { "text": text } ] } ],
        "systemInstruction": { "parts": [ { "text": system } ] },
        "generationConfig": {
            "responseModalities": [ "AUDIO" ],
            "speechConfig": {
                "voiceConfig": {
                    "prebuiltVoiceConfig": { "voiceName": voice_name }
                }
            }
        }
    })
}

// ---------------------------------------------------------------------------
// Response extraction
// ---------------------------------------------------------------------------

/// `candidates[0].content.parts[0].text`, or `None` when any level is absent.
pub fn extract_text(response: &Value) -> Option<String> {
    response["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .map(|s| s.to_string())
}

/// All complete grounding attributions, in received order.
///
/// `candidates[0].groundingMetadata.groundingAttributions[].web.{uri,title}`;
/// entries missing either field are dropped, the rest keep their order, and
/// duplicates are preserved.
pub fn extract_citations(response: &Value) -> Vec<Citation> {
    let Some(attributions) =
        response["candidates"][0]["groundingMetadata"]["groundingAttributions"].as_array()
    else {
        return Vec::new();
    };

    attributions
        .iter()
        .filter_map(|entry| {
            let uri = entry["web"]["uri"].as_str()?;
            let title = entry["web"]["title"].as_str()?;
            Some(Citation {
                uri: uri.to_string(),
                title: title.to_string(),
            })
        })
        .collect()
}

/// The inline audio payload: `(base64 data, mime type)`.
///
/// `candidates[0].content.parts[0].inlineData.{data, mimeType}`.  The mime
/// type is optional on the wire; the data field is not.
pub fn extract_audio(response: &Value) -> Option<(String, Option<String>)> {
    let inline = &response["candidates"][0]["content"]["parts"][0]["inlineData"];
    let data = inline["data"].as_str()?.to_string();
    let mime = inline["mimeType"].as_str().map(|s| s.to_string());
    Some((data, mime))
}

/// Parse the sample rate out of a mime type containing `rate=<n>`.
///
/// ```rust
/// use encounter_forge::genai::wire::parse_sample_rate;
///
/// assert_eq!(parse_sample_rate("audio/L16;codec=pcm;rate=24000"), Some(24000));
/// assert_eq!(parse_sample_rate("audio/L16"), None);
/// ```
pub fn parse_sample_rate(mime: &str) -> Option<u32> {
    let idx = mime.find("rate=")?;
    let digits: String = mime[idx + 5..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Request bodies
    // -----------------------------------------------------------------------

    #[test]
    fn text_body_carries_prompt_and_temperature() {
        let body = text_request_body("sys", "user", 0.8, false);
        assert_eq!(body["contents"][0]["parts"][0]["text"], "user");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "sys");
        assert_eq!(body["generationConfig"]["temperature"], 0.8);
        assert!(body.get("tools").is_none());
    }

    /// Round decimal temperatures must reach the wire exactly, with no
    /// float-widening drift.
    #[test]
    fn temperature_serializes_exactly() {
        for temperature in [0.7, 0.8] {
            let body = text_request_body("sys", "user", temperature, false);
            assert_eq!(
                body["generationConfig"]["temperature"].as_f64(),
                Some(temperature)
            );
        }
    }

    #[test]
    fn grounded_text_body_adds_search_tool() {
        let body = text_request_body("sys", "user", 0.8, true);
        assert!(body["tools"][0]["google_search"].is_object());
    }

    #[test]
    fn speech_body_requests_audio_modality_and_voice() {
        let body = speech_request_body("read it", "The ruin looms.", "Charon");
        assert_eq!(body["generationConfig"]["responseModalities"][0], "AUDIO");
        assert_eq!(
            body["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]
                ["voiceName"],
            "Charon"
        );
        assert_eq!(body["contents"][0]["parts"][0]["text"], "The ruin looms.");
    }

    // -----------------------------------------------------------------------
    // Text extraction
    // -----------------------------------------------------------------------

    fn text_response(text: &str) -> Value {
        serde_json::json!({
            "candidates": [ { "content": { "parts": [ { "text": text } ] } } ]
        })
    }

    #[test]
    fn extract_text_happy_path() {
        assert_eq!(extract_text(&text_response("X")), Some("X".into()));
    }

    #[test]
    fn extract_text_empty_candidates_is_none() {
        let response = serde_json::json!({ "candidates": [] });
        assert_eq!(extract_text(&response), None);
    }

    #[test]
    fn extract_text_missing_parts_is_none() {
        let response = serde_json::json!({
            "candidates": [ { "content": {} } ]
        });
        assert_eq!(extract_text(&response), None);
    }

    // -----------------------------------------------------------------------
    // Citation extraction
    // -----------------------------------------------------------------------

    fn grounded_response(attributions: Value) -> Value {
        serde_json::json!({
            "candidates": [ {
                "content": { "parts": [ { "text": "X" } ] },
                "groundingMetadata": { "groundingAttributions": attributions }
            } ]
        })
    }

    #[test]
    fn citations_absent_metadata_yields_empty() {
        assert!(extract_citations(&text_response("X")).is_empty());
    }

    #[test]
    fn citations_keep_complete_entries_in_order() {
        let response = grounded_response(serde_json::json!([
            { "web": { "uri": "https://a", "title": "A" } },
            { "web": { "uri": "https://b", "title": "B" } }
        ]));
        let citations = extract_citations(&response);
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].uri, "https://a");
        assert_eq!(citations[0].title, "A");
        assert_eq!(citations[1].uri, "https://b");
    }

    /// Entries missing uri or title are dropped; the order of the remainder
    /// is preserved.
    #[test]
    fn citations_drop_incomplete_entries() {
        let response = grounded_response(serde_json::json!([
            { "web": { "uri": "https://a", "title": "A" } },
            { "web": { "uri": "https://missing-title" } },
            { "web": { "title": "missing uri" } },
            { "web": { "uri": "https://d", "title": "D" } }
        ]));
        let citations = extract_citations(&response);
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].title, "A");
        assert_eq!(citations[1].title, "D");
    }

    #[test]
    fn citations_preserve_duplicates() {
        let response = grounded_response(serde_json::json!([
            { "web": { "uri": "https://a", "title": "A" } },
            { "web": { "uri": "https://a", "title": "A" } }
        ]));
        assert_eq!(extract_citations(&response).len(), 2);
    }

    // -----------------------------------------------------------------------
    // Audio extraction
    // -----------------------------------------------------------------------

    #[test]
    fn extract_audio_happy_path() {
        let response = serde_json::json!({
            "candidates": [ { "content": { "parts": [ {
                "inlineData": { "data": "AAAA", "mimeType": "audio/L16;rate=24000" }
            } ] } } ]
        });
        let (data, mime) = extract_audio(&response).unwrap();
        assert_eq!(data, "AAAA");
        assert_eq!(mime.as_deref(), Some("audio/L16;rate=24000"));
    }

    #[test]
    fn extract_audio_missing_inline_data_is_none() {
        assert_eq!(extract_audio(&text_response("X")), None);
    }

    #[test]
    fn extract_audio_without_mime_type() {
        let response = serde_json::json!({
            "candidates": [ { "content": { "parts": [ {
                "inlineData": { "data": "AAAA" }
            } ] } } ]
        });
        let (data, mime) = extract_audio(&response).unwrap();
        assert_eq!(data, "AAAA");
        assert!(mime.is_none());
    }

    // -----------------------------------------------------------------------
    // Sample rate parsing
    // -----------------------------------------------------------------------

    #[test]
    fn sample_rate_parses_from_mime() {
        assert_eq!(parse_sample_rate("audio/L16;codec=pcm;rate=24000"), Some(24_000));
        assert_eq!(parse_sample_rate("audio/L16;rate=16000;codec=pcm"), Some(16_000));
    }

    #[test]
    fn sample_rate_absent_or_garbled_is_none() {
        assert_eq!(parse_sample_rate("audio/L16"), None);
        assert_eq!(parse_sample_rate("audio/L16;rate="), None);
        assert_eq!(parse_sample_rate("audio/L16;rate=abc"), None);
    }
}
