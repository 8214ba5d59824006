//! **Text-to-Speech (TTS)**: synthesize the interviewer's reply.
//!
//! `OpenAiTts` calls an OpenAI-compatible `/audio/speech` endpoint and returns MP3 bytes.

use crate::audio::SynthesizedAudio;
use crate::error::{VoiceError, VoiceResult};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Backend that turns text into encoded audio.
#[async_trait]
pub trait TtsBackend: Send + Sync {
    async fn synthesize(&self, text: &str) -> VoiceResult<SynthesizedAudio>;
}

/// Placeholder TTS: returns an empty MP3 body. Use for wiring tests.
#[derive(Debug, Default)]
pub struct PlaceholderTts;

#[async_trait]
impl TtsBackend for PlaceholderTts {
    async fn synthesize(&self, _text: &str) -> VoiceResult<SynthesizedAudio> {
        Ok(SynthesizedAudio::mpeg(Vec::new()))
    }
}

/// Production TTS backend: OpenAI-compatible speech API.
#[derive(Debug, Clone)]
pub struct OpenAiTts {
    /// Base URL without trailing slash (e.g. https://api.openai.com/v1).
    pub base_url: String,
    /// Bearer API key.
    pub api_key: String,
    /// TTS model: tts-1 (fast) or tts-1-hd (higher quality).
    pub model: String,
    /// alloy, echo, fable, onyx, nova, shimmer, ...
    pub voice: String,
    client: reqwest::Client,
}

impl OpenAiTts {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        voice: impl Into<String>,
    ) -> VoiceResult<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(VoiceError::Config("TTS requires an API key".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| VoiceError::Config(format!("TTS client: {}", e)))?;
        Ok(Self {
            base_url: base_url.into(),
            api_key,
            model: model.into(),
            voice: voice.into(),
            client,
        })
    }
}

#[async_trait]
impl TtsBackend for OpenAiTts {
    async fn synthesize(&self, text: &str) -> VoiceResult<SynthesizedAudio> {
        let text = text.trim();
        if text.is_empty() {
            return Err(VoiceError::Tts("nothing to synthesize".to_string()));
        }
        let url = format!("{}/audio/speech", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "model": self.model,
            "input": text,
            "voice": self.voice,
            "response_format": "mp3",
        });
        debug!(target: "parley::tts", chars = text.len(), voice = %self.voice, "synthesizing");
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VoiceError::Tts(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(VoiceError::Tts(format!("TTS API error {}: {}", status, body)));
        }
        let bytes = res.bytes().await.map_err(|e| VoiceError::Tts(e.to_string()))?;
        Ok(SynthesizedAudio::mpeg(bytes.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn placeholder_tts_returns_empty() {
        let out = PlaceholderTts.synthesize("hello").await.unwrap();
        assert!(out.bytes.is_empty());
        assert_eq!(out.content_type, "audio/mpeg");
    }

    #[tokio::test]
    async fn sends_voice_and_returns_bytes() {
        let app = Router::new().route(
            "/audio/speech",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["voice"], "nova");
                assert_eq!(body["input"], "Thank you.");
                vec![0xFFu8, 0xFB, 0x90]
            }),
        );
        let base = serve(app).await;
        let tts = OpenAiTts::new(base, "sk-test", "tts-1", "nova").unwrap();
        let audio = tts.synthesize("  Thank you. ").await.unwrap();
        assert_eq!(audio.bytes, vec![0xFF, 0xFB, 0x90]);
    }

    #[tokio::test]
    async fn upstream_failure_is_tts_error() {
        let app = Router::new().route(
            "/audio/speech",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let base = serve(app).await;
        let tts = OpenAiTts::new(base, "sk-test", "tts-1", "alloy").unwrap();
        let err = tts.synthesize("hi").await.unwrap_err();
        assert!(matches!(err, VoiceError::Tts(_)));
    }

    #[tokio::test]
    async fn blank_text_is_rejected() {
        let tts = OpenAiTts::new("http://127.0.0.1:9", "sk-test", "tts-1", "alloy").unwrap();
        assert!(tts.synthesize("   ").await.is_err());
    }
}
