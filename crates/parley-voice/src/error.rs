//! Error types for the speech backends

use thiserror::Error;

/// Result type alias for voice operations
pub type VoiceResult<T> = Result<T, VoiceError>;

/// Errors raised by STT/TTS backends
#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("STT error: {0}")]
    Stt(String),

    #[error("TTS error: {0}")]
    Tts(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
