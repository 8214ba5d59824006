//! # Parley Voice - speech backends for the interview turn
//!
//! Speech-to-text and text-to-speech are opaque collaborators of the turn
//! pipeline: one uploaded utterance goes in, one transcript comes out; one reply
//! text goes in, one encoded audio clip comes out.
//!
//! ```text
//!  AudioInput ──► SttBackend ──► String
//!  String     ──► TtsBackend ──► SynthesizedAudio
//! ```
//!
//! Both traits have an OpenAI-compatible HTTP implementation and a placeholder
//! for wiring tests and offline runs.

pub mod audio;
pub mod error;
pub mod stt;
pub mod tts;

pub use audio::{AudioInput, SynthesizedAudio};
pub use error::{VoiceError, VoiceResult};
pub use stt::{OpenAiStt, PlaceholderStt, SttBackend};
pub use tts::{OpenAiTts, PlaceholderTts, TtsBackend};
