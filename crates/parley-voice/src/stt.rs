//! **Speech-to-Text (STT)**: turn the uploaded utterance into text for the generator.
//!
//! Implement `SttBackend` for any transcription engine. `OpenAiStt` talks to an
//! OpenAI-compatible `/audio/transcriptions` endpoint (OpenAI Whisper, OpenRouter, etc.).

use crate::audio::AudioInput;
use crate::error::{VoiceError, VoiceResult};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Backend converting one uploaded utterance to text.
#[async_trait]
pub trait SttBackend: Send + Sync {
    /// Transcribe one utterance. Returns an empty string if nothing was recognized.
    async fn transcribe(&self, audio: &AudioInput) -> VoiceResult<String>;
}

/// Placeholder STT: returns a fixed string. Use to exercise the pipeline without an API.
#[derive(Debug, Default)]
pub struct PlaceholderStt {
    /// If set, return this instead of the default message.
    pub response: Option<String>,
}

impl PlaceholderStt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(s: impl Into<String>) -> Self {
        Self {
            response: Some(s.into()),
        }
    }
}

#[async_trait]
impl SttBackend for PlaceholderStt {
    async fn transcribe(&self, audio: &AudioInput) -> VoiceResult<String> {
        if let Some(ref r) = self.response {
            return Ok(r.clone());
        }
        Ok(format!(
            "[STT placeholder: {} bytes of {}, configure stt.api_key for real transcription]",
            audio.bytes.len(),
            audio.content_type
        ))
    }
}

/// Production STT backend: OpenAI-compatible transcription API.
#[derive(Debug, Clone)]
pub struct OpenAiStt {
    /// Base URL without trailing slash (e.g. https://api.openai.com/v1).
    pub base_url: String,
    /// Bearer API key.
    pub api_key: String,
    /// Model: whisper-1 or gpt-4o-transcribe, etc.
    pub model: String,
    /// ISO-639-1 hint forwarded to the API; improves accuracy for short clips.
    pub language: Option<String>,
    client: reqwest::Client,
}

impl OpenAiStt {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        language: Option<String>,
    ) -> VoiceResult<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(VoiceError::Config("STT requires an API key".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| VoiceError::Config(format!("STT client: {}", e)))?;
        Ok(Self {
            base_url: base_url.into(),
            api_key,
            model: model.into(),
            language: language.filter(|l| !l.trim().is_empty()),
            client,
        })
    }
}

#[async_trait]
impl SttBackend for OpenAiStt {
    async fn transcribe(&self, audio: &AudioInput) -> VoiceResult<String> {
        if audio.is_empty() {
            return Ok(String::new());
        }
        let url = format!("{}/audio/transcriptions", self.base_url.trim_end_matches('/'));
        let part = reqwest::multipart::Part::bytes(audio.bytes.clone())
            .file_name(audio.file_name.clone())
            .mime_str(&audio.content_type)
            .map_err(|e| VoiceError::Stt(e.to_string()))?;
        let mut form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone());
        if let Some(ref lang) = self.language {
            form = form.text("language", lang.clone());
        }
        debug!(target: "parley::stt", bytes = audio.bytes.len(), model = %self.model, "transcribing");
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| VoiceError::Stt(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(VoiceError::Stt(format!("STT API error {}: {}", status, body)));
        }
        let json: serde_json::Value = res.json().await.map_err(|e| VoiceError::Stt(e.to_string()))?;
        let text = json
            .get("text")
            .and_then(|t| t.as_str())
            .unwrap_or("")
            .trim()
            .to_string();
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Multipart, http::StatusCode, routing::post, Json, Router};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn clip() -> AudioInput {
        AudioInput::new(vec![7u8; 64], "audio.webm", Some("audio/webm".to_string()))
    }

    #[tokio::test]
    async fn placeholder_returns_message() {
        let stt = PlaceholderStt::new();
        let s = stt.transcribe(&clip()).await.unwrap();
        assert!(s.contains("STT placeholder"));
        assert!(s.contains("64 bytes"));
    }

    #[tokio::test]
    async fn placeholder_with_response() {
        let stt = PlaceholderStt::with_response("hello world");
        assert_eq!(stt.transcribe(&clip()).await.unwrap(), "hello world");
    }

    #[test]
    fn missing_key_is_config_error() {
        let err = OpenAiStt::new("http://localhost", "  ", "whisper-1", None).unwrap_err();
        assert!(matches!(err, VoiceError::Config(_)));
    }

    #[tokio::test]
    async fn uploads_form_and_trims_text() {
        let app = Router::new().route(
            "/audio/transcriptions",
            post(|mut form: Multipart| async move {
                let mut fields = Vec::new();
                while let Some(field) = form.next_field().await.unwrap() {
                    fields.push(field.name().unwrap_or_default().to_string());
                }
                assert_eq!(fields, vec!["file", "model", "language"]);
                Json(serde_json::json!({ "text": "  I am a sales manager.  " }))
            }),
        );
        let base = serve(app).await;
        let stt = OpenAiStt::new(base, "sk-test", "whisper-1", Some("en".to_string())).unwrap();
        assert_eq!(stt.transcribe(&clip()).await.unwrap(), "I am a sales manager.");
    }

    #[tokio::test]
    async fn non_success_status_is_stt_error() {
        let app = Router::new().route(
            "/audio/transcriptions",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad key") }),
        );
        let base = serve(app).await;
        let stt = OpenAiStt::new(base, "sk-test", "whisper-1", None).unwrap();
        let err = stt.transcribe(&clip()).await.unwrap_err();
        assert!(err.to_string().contains("401"));
    }
}
