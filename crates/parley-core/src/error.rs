//! Error types for the interview turn pipeline.
//!
//! Every variant aborts the in-flight request with no partial response.
//! Nothing here is retried by the pipeline itself.

use parley_voice::VoiceError;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type InterviewResult<T> = Result<T, InterviewError>;

#[derive(Error, Debug)]
pub enum InterviewError {
    /// Transcription came back blank; rejected before any completion or synthesis call.
    #[error("empty user prompt received")]
    EmptyInput,

    #[error("malformed conversation token: {0}")]
    MalformedToken(String),

    /// The extended transcript would not fit in a token the next request could send back.
    #[error("conversation transcript too long: {len} bytes encoded, limit is {limit}")]
    TranscriptTooLong { len: usize, limit: usize },

    /// System prompt could not be fetched and nothing is cached.
    #[error("system prompt unavailable: {0}")]
    PromptUnavailable(String),

    #[error("completion failed: {0}")]
    Completion(String),

    #[error("transcription failed: {0}")]
    Transcription(#[source] VoiceError),

    #[error("speech synthesis failed: {0}")]
    Synthesis(#[source] VoiceError),
}
