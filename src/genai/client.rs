//! `TextGenerator` / `SpeechSynthesizer` traits and the `GenAiClient`.
//!
//! `GenAiClient` talks to any generateContent-compatible host.  All connection
//! details (`base_url`, `api_key`, model ids) come from [`ApiConfig`]; nothing
//! is hardcoded.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ApiConfig;
use crate::genai::wire::{self, Citation};
use crate::net::{CallError, ResilientClient};

// ---------------------------------------------------------------------------
// GenAiError
// ---------------------------------------------------------------------------

/// Errors that can occur during a generateContent exchange.
#[derive(Debug, Error)]
pub enum GenAiError {
    /// The HTTP call failed (after any retries).
    #[error(transparent)]
    Call(#[from] CallError),

    /// The reply carried no usable text content.
    #[error("response contained no generated text")]
    MissingContent,

    /// The reply carried no inline audio payload.
    #[error("response contained no audio data")]
    MissingAudio,
}

// ---------------------------------------------------------------------------
// Request / reply types
// ---------------------------------------------------------------------------

/// One text generation request.
#[derive(Debug, Clone)]
pub struct TextRequest {
    pub system: String,
    pub user: String,
    /// `f64` so round decimals serialize exactly on the wire (`0.8`, not the
    /// nearest `f32`).
    pub temperature: f64,
    /// Enable the search-grounding tool (generate flow only).
    pub grounded: bool,
}

/// A successful text reply: markdown plus any complete citations.
#[derive(Debug, Clone)]
pub struct TextReply {
    pub text: String,
    pub citations: Vec<Citation>,
}

/// One speech synthesis request.
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    /// Style-specific delivery instruction.
    pub system: String,
    /// The text to speak.
    pub text: String,
    /// Fixed prebuilt voice id.
    pub voice_name: &'static str,
}

/// Raw synthesized audio as returned on the wire.
#[derive(Debug, Clone)]
pub struct AudioPayload {
    /// base64-encoded linear PCM.
    pub data: String,
    /// Declared mime type, expected to contain `rate=<n>`.
    pub mime_type: Option<String>,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Async trait for text generation backends.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn TextGenerator>`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: TextRequest) -> Result<TextReply, GenAiError>;
}

/// Async trait for speech synthesis backends.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, request: SpeechRequest) -> Result<AudioPayload, GenAiError>;
}

// ---------------------------------------------------------------------------
// GenAiClient
// ---------------------------------------------------------------------------

/// Config-driven client implementing both traits over a [`ResilientClient`].
pub struct GenAiClient {
    http: ResilientClient,
    config: ApiConfig,
}

impl GenAiClient {
    /// Create a client; model ids and the API key come from `config`.
    pub fn new(http: ResilientClient, config: ApiConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url,
            model,
            self.config.key()
        )
    }
}

#[async_trait]
impl TextGenerator for GenAiClient {
    async fn generate(&self, request: TextRequest) -> Result<TextReply, GenAiError> {
        let body = wire::text_request_body(
            &request.system,
            &request.user,
            request.temperature,
            request.grounded,
        );
        let url = self.endpoint(&self.config.text_model);

        let response = self.http.post(&url, &body).await?;

        let text = wire::extract_text(&response).ok_or(GenAiError::MissingContent)?;
        let citations = wire::extract_citations(&response);
        log::debug!(
            "genai: received {} chars, {} citations",
            text.len(),
            citations.len()
        );

        Ok(TextReply { text, citations })
    }
}

#[async_trait]
impl SpeechSynthesizer for GenAiClient {
    async fn synthesize(&self, request: SpeechRequest) -> Result<AudioPayload, GenAiError> {
        let body = wire::speech_request_body(&request.system, &request.text, request.voice_name);
        let url = self.endpoint(&self.config.tts_model);

        let response = self.http.post(&url, &body).await?;

        let (data, mime_type) = wire::extract_audio(&response).ok_or(GenAiError::MissingAudio)?;
        log::debug!(
            "genai: received {} base64 chars of audio ({})",
            data.len(),
            mime_type.as_deref().unwrap_or("no mime type")
        );

        Ok(AudioPayload { data, mime_type })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryConfig;
    use crate::net::{Transport, TransportError, WireReply};
    use std::sync::Arc;

    /// Serves a canned JSON body with HTTP 200, recording the request URL.
    struct CannedTransport {
        body: String,
        seen_url: std::sync::Mutex<Option<String>>,
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn post_json(
            &self,
            url: &str,
            _body: &serde_json::Value,
        ) -> Result<WireReply, TransportError> {
            *self.seen_url.lock().unwrap() = Some(url.to_string());
            Ok(WireReply {
                status: 200,
                body: self.body.clone(),
            })
        }
    }

    fn make_client(body: &str) -> (GenAiClient, Arc<CannedTransport>) {
        let transport = Arc::new(CannedTransport {
            body: body.into(),
            seen_url: std::sync::Mutex::new(None),
        });
        let retry = RetryConfig {
            max_retries: 0,
            base_delay_ms: 0,
            max_jitter_ms: 0,
        };
        let http = ResilientClient::new(Arc::clone(&transport) as Arc<dyn Transport>, retry);
        let config = ApiConfig {
            base_url: "http://host/v1beta".into(),
            api_key: Some("k".into()),
            text_model: "text-model".into(),
            tts_model: "tts-model".into(),
            timeout_secs: 5,
        };
        (GenAiClient::new(http, config), transport)
    }

    fn request() -> TextRequest {
        TextRequest {
            system: "sys".into(),
            user: "user".into(),
            temperature: 0.8,
            grounded: true,
        }
    }

    #[tokio::test]
    async fn generate_hits_text_model_endpoint() {
        let (client, transport) = make_client(
            r#"{"candidates":[{"content":{"parts":[{"text":"X"}]}}]}"#,
        );
        let reply = client.generate(request()).await.unwrap();
        assert_eq!(reply.text, "X");
        assert!(reply.citations.is_empty());

        let url = transport.seen_url.lock().unwrap().clone().unwrap();
        assert_eq!(url, "http://host/v1beta/models/text-model:generateContent?key=k");
    }

    #[tokio::test]
    async fn generate_empty_candidates_is_missing_content() {
        let (client, _) = make_client(r#"{"candidates":[]}"#);
        let err = client.generate(request()).await.unwrap_err();
        assert!(matches!(err, GenAiError::MissingContent));
    }

    #[tokio::test]
    async fn synthesize_hits_tts_model_endpoint() {
        let (client, transport) = make_client(
            r#"{"candidates":[{"content":{"parts":[{"inlineData":{"data":"QUJD","mimeType":"audio/L16;rate=24000"}}]}}]}"#,
        );
        let payload = client
            .synthesize(SpeechRequest {
                system: "read".into(),
                text: "hook".into(),
                voice_name: "Charon",
            })
            .await
            .unwrap();
        assert_eq!(payload.data, "QUJD");
        assert_eq!(payload.mime_type.as_deref(), Some("audio/L16;rate=24000"));

        let url = transport.seen_url.lock().unwrap().clone().unwrap();
        assert!(url.contains("models/tts-model:generateContent"));
    }

    #[tokio::test]
    async fn synthesize_without_inline_data_is_missing_audio() {
        let (client, _) = make_client(
            r#"{"candidates":[{"content":{"parts":[{"text":"not audio"}]}}]}"#,
        );
        let err = client
            .synthesize(SpeechRequest {
                system: "read".into(),
                text: "hook".into(),
                voice_name: "Puck",
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GenAiError::MissingAudio));
    }
}
