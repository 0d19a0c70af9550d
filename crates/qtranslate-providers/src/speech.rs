//! Speech synthesis — text-to-speech via a Piper HTTP service.
//!
//! The service exposes one route per voice language
//! (`{base}/{lang}/api/tts`) and answers with raw audio bytes. Playback is
//! left to the caller.

use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use qtranslate_core::language;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::health::DEFAULT_SPEECH_ENDPOINT;

/// Per-request timeout for synthesis.
pub const SYNTHESIS_TIMEOUT: Duration = Duration::from_secs(30);

// ─────────────────────────────────────────────
// Trait
// ─────────────────────────────────────────────

/// Trait for text-to-speech providers.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` in `language` (a code or a language name).
    ///
    /// Returns the encoded audio.
    async fn synthesize(
        &self,
        text: &str,
        language: &str,
        cancel: &CancellationToken,
    ) -> anyhow::Result<Vec<u8>>;

    /// Whether `language` has a dedicated voice.
    fn is_language_supported(&self, language: &str) -> bool;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}

// ─────────────────────────────────────────────
// Piper
// ─────────────────────────────────────────────

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    audio_format: &'a str,
}

/// Piper-based synthesis over HTTP, producing WAV audio.
#[derive(Debug, Clone)]
pub struct PiperSpeechClient {
    base_url: String,
    client: reqwest::Client,
}

impl PiperSpeechClient {
    /// Create a client for `base_url`, or the public service when empty.
    pub fn new(base_url: Option<&str>) -> Self {
        let base = base_url
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_SPEECH_ENDPOINT)
            .trim_end_matches('/')
            .to_string();

        Self {
            base_url: base,
            client: reqwest::Client::new(),
        }
    }

    /// Synthesis URL for an already-normalized language code.
    fn synthesis_url(&self, code: &str) -> String {
        format!("{}/{}/api/tts", self.base_url, code)
    }
}

#[async_trait]
impl SpeechSynthesizer for PiperSpeechClient {
    async fn synthesize(
        &self,
        text: &str,
        language: &str,
        cancel: &CancellationToken,
    ) -> anyhow::Result<Vec<u8>> {
        if text.trim().is_empty() {
            bail!("Text is empty");
        }

        if !language::is_speech_supported(language) {
            warn!(language = %language, fallback = language::FALLBACK_LANGUAGE, "speech: unsupported language");
        }
        let code = language::normalize(language);
        let url = self.synthesis_url(code);

        info!(chars = text.chars().count(), language = code, "speech: synthesizing");

        let call = async {
            let response = self
                .client
                .post(&url)
                .json(&SynthesisRequest {
                    text,
                    audio_format: "wav",
                })
                .timeout(SYNTHESIS_TIMEOUT)
                .send()
                .await
                .context("speech request failed")?;

            let status = response.status();
            if !status.is_success() {
                bail!("speech service returned status {}", status);
            }

            let audio = response
                .bytes()
                .await
                .context("failed to read speech audio")?;
            Ok(audio.to_vec())
        };

        let audio = tokio::select! {
            biased;
            _ = cancel.cancelled() => bail!("Request was cancelled"),
            result = call => result?,
        };

        debug!(bytes = audio.len(), "speech: audio received");
        Ok(audio)
    }

    fn is_language_supported(&self, language: &str) -> bool {
        language::is_speech_supported(language)
    }

    fn display_name(&self) -> &str {
        "Piper"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_default_base_url() {
        let client = PiperSpeechClient::new(None);
        assert_eq!(client.synthesis_url("en"), "https://tts.rox-net.ru/en/api/tts");

        let client = PiperSpeechClient::new(Some("http://localhost:5000/ "));
        assert_eq!(client.synthesis_url("de"), "http://localhost:5000/de/api/tts");
    }

    #[test]
    fn test_language_support() {
        let client = PiperSpeechClient::new(None);
        assert!(client.is_language_supported("German"));
        assert!(!client.is_language_supported("Japanese"));
        assert_eq!(client.display_name(), "Piper");
    }

    #[tokio::test]
    async fn test_synthesize_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/de/api/tts"))
            .and(body_json(json!({ "text": "Guten Tag", "audio_format": "wav" })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"RIFF....WAVE".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let client = PiperSpeechClient::new(Some(&server.uri()));
        let audio = client
            .synthesize("Guten Tag", "German", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(audio, b"RIFF....WAVE");
    }

    #[tokio::test]
    async fn test_unsupported_language_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ru/api/tts"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1, 2, 3]))
            .expect(1)
            .mount(&server)
            .await;

        let client = PiperSpeechClient::new(Some(&server.uri()));
        let audio = client
            .synthesize("こんにちは", "Japanese", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(audio, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_synthesize_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = PiperSpeechClient::new(Some(&server.uri()));
        let err = client
            .synthesize("Hello", "en", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_synthesize_empty_text_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = PiperSpeechClient::new(Some(&server.uri()));
        let err = client
            .synthesize("   ", "en", &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Text is empty");
    }

    #[tokio::test]
    async fn test_synthesize_cancelled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
            .mount(&server)
            .await;

        let client = PiperSpeechClient::new(Some(&server.uri()));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = client.synthesize("Hello", "en", &cancel).await.unwrap_err();
        assert_eq!(err.to_string(), "Request was cancelled");
    }
}
