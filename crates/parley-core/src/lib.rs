//! parley-core: the interview turn pipeline.
//!
//! One turn: transcribe the applicant's utterance, ask the model for the next
//! interviewer line (system prompt + client-held history), synthesize it, log
//! both lines to the analytics webhook, and hand back audio plus the updated
//! conversation token. The server keeps no per-conversation state.

pub mod completion;
pub mod config;
pub mod conversation;
pub mod error;
pub mod generator;
pub mod notifier;
pub mod orchestrator;
pub mod prompt_provider;
pub mod prompts;

pub use completion::{ChatCompletion, CompletionResult, OpenAiChat};
pub use config::InterviewConfig;
pub use conversation::{ConversationMessage, ConversationToken, Role, MAX_TOKEN_LEN};
pub use error::{InterviewError, InterviewResult};
pub use generator::ResponseGenerator;
pub use notifier::{EventNotifier, EventSink, EventSource, HttpEventSink, NotificationError, NotifierEvent};
pub use orchestrator::{InferenceReply, RequestOrchestrator};
pub use prompt_provider::{HttpPromptSource, PromptProvider, PromptSource, StaticPromptSource};

pub use parley_voice::{AudioInput, SttBackend, SynthesizedAudio, TtsBackend};
