//! Request orchestrator: one interview turn, start to finish.
//!
//! Steps run strictly in sequence: decode token, transcribe, generate, re-encode,
//! synthesize, notify. Any failure before notification aborts the turn with no
//! partial response.

use crate::completion::{ChatCompletion, OpenAiChat};
use crate::config::InterviewConfig;
use crate::conversation::{self, ConversationToken, MAX_TOKEN_LEN};
use crate::error::{InterviewError, InterviewResult};
use crate::generator::ResponseGenerator;
use crate::notifier::{EventNotifier, EventSource, HttpEventSink};
use crate::prompt_provider::{HttpPromptSource, PromptProvider, PromptSource, StaticPromptSource};
use parley_voice::{
    AudioInput, OpenAiStt, OpenAiTts, PlaceholderStt, PlaceholderTts, SttBackend, SynthesizedAudio,
    TtsBackend, VoiceResult,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Everything the client gets back for one turn.
#[derive(Debug, Clone)]
pub struct InferenceReply {
    pub audio: SynthesizedAudio,
    /// Prior transcript plus this turn's user and assistant messages.
    pub token: ConversationToken,
    pub user_text: String,
    pub ai_text: String,
}

pub struct RequestOrchestrator {
    stt: Arc<dyn SttBackend>,
    generator: ResponseGenerator,
    tts: Arc<dyn TtsBackend>,
    notifier: Arc<EventNotifier>,
}

impl RequestOrchestrator {
    pub fn new(
        stt: Arc<dyn SttBackend>,
        generator: ResponseGenerator,
        tts: Arc<dyn TtsBackend>,
        notifier: Arc<EventNotifier>,
    ) -> Self {
        Self {
            stt,
            generator,
            tts,
            notifier,
        }
    }

    /// Wire real backends from configuration. Spawns the notifier worker, so
    /// this must run inside a tokio runtime. Fails only on backend setup
    /// (`VoiceError::Config`).
    pub fn from_config(cfg: &InterviewConfig) -> VoiceResult<Self> {
        let stt: Arc<dyn SttBackend> = match cfg.stt_api_key() {
            Some(key) => Arc::new(
                OpenAiStt::new(&cfg.stt.api_url, key, &cfg.stt.model, Some(cfg.language.clone()))?,
            ),
            None => {
                warn!(target: "parley::voice", "STT: [Placeholder] (set stt.api_key or OPENAI_API_KEY for real transcription)");
                Arc::new(PlaceholderStt::new())
            }
        };
        let tts: Arc<dyn TtsBackend> = match cfg.tts_api_key() {
            Some(key) => Arc::new(
                OpenAiTts::new(&cfg.tts.api_url, key, &cfg.tts.model, &cfg.tts.voice)?,
            ),
            None => {
                warn!(target: "parley::voice", "TTS: [Placeholder] (set tts.api_key or OPENAI_API_KEY for spoken replies)");
                Arc::new(PlaceholderTts)
            }
        };

        if cfg.completion.api_key.is_none() {
            warn!(target: "parley::generator", "completion.api_key not set; completion calls will be rejected upstream");
        }
        let chat: Arc<dyn ChatCompletion> = Arc::new(OpenAiChat::new(
            &cfg.completion.api_url,
            cfg.completion.api_key.clone().unwrap_or_default(),
        ));

        let source: Arc<dyn PromptSource> = match cfg.prompt.url {
            Some(ref url) => Arc::new(HttpPromptSource::new(
                url,
                Duration::from_secs(cfg.prompt.timeout_secs),
            )),
            None => Arc::new(StaticPromptSource::builtin()),
        };
        let prompts = Arc::new(
            PromptProvider::new(source, &cfg.language)
                .with_builtin_fallback(cfg.prompt.fallback_to_builtin),
        );
        let generator = ResponseGenerator::new(prompts, chat, &cfg.completion.model, cfg.completion_timeout());

        let notifier = match cfg.notifier.webhook_url {
            Some(ref url) => EventNotifier::spawn(
                Arc::new(HttpEventSink::new(
                    url,
                    Duration::from_secs(cfg.notifier.timeout_secs),
                )),
                cfg.notifier.queue_capacity,
            ),
            None => {
                info!(target: "parley::notifier", "notifier.webhook_url not set; utterance logging disabled");
                EventNotifier::disabled()
            }
        };

        info!(
            target: "parley::orchestrator",
            model = %generator.model(),
            language = %cfg.language,
            "interview pipeline ready"
        );
        Ok(Self::new(stt, generator, tts, Arc::new(notifier)))
    }

    pub fn notifier(&self) -> Arc<EventNotifier> {
        Arc::clone(&self.notifier)
    }

    /// Run one turn for the uploaded utterance and the client's prior token.
    pub async fn handle(&self, audio: AudioInput, prior_token: Option<&str>) -> InterviewResult<InferenceReply> {
        let started = Instant::now();
        let history = conversation::decode(prior_token)?;

        let user_text = self
            .stt
            .transcribe(&audio)
            .await
            .map_err(InterviewError::Transcription)?;
        drop(audio);

        let ai_text = self.generator.generate(&user_text, prior_token).await?;

        let token = conversation::encode(&conversation::append_turn(
            history,
            user_text.as_str(),
            ai_text.as_str(),
        ));
        // Checked before paying for synthesis: the client could never send this back.
        if token.len() > MAX_TOKEN_LEN {
            return Err(InterviewError::TranscriptTooLong {
                len: token.len(),
                limit: MAX_TOKEN_LEN,
            });
        }

        let reply_audio = self
            .tts
            .synthesize(&ai_text)
            .await
            .map_err(InterviewError::Synthesis)?;

        self.notifier.notify(EventSource::Applicant, &user_text);
        self.notifier.notify(EventSource::Assistant, &ai_text);

        info!(
            target: "parley::orchestrator",
            elapsed_ms = started.elapsed().as_millis() as u64,
            audio_bytes = reply_audio.bytes.len(),
            "total processing time"
        );
        Ok(InferenceReply {
            audio: reply_audio,
            token,
            user_text,
            ai_text,
        })
    }
}
