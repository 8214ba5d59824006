//! Audio payloads owned by a single inference request.

/// Content type used when the uploader did not send one.
pub const DEFAULT_INPUT_CONTENT_TYPE: &str = "application/octet-stream";

/// The applicant's recorded utterance, as uploaded by the browser.
#[derive(Debug, Clone)]
pub struct AudioInput {
    pub bytes: Vec<u8>,
    /// Original file name; STT APIs use the extension to sniff the container.
    pub file_name: String,
    pub content_type: String,
}

impl AudioInput {
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>, content_type: Option<String>) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
            content_type: content_type
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_INPUT_CONTENT_TYPE.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Encoded reply audio produced by a TTS backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedAudio {
    pub bytes: Vec<u8>,
    /// MIME type of `bytes` (e.g. `audio/mpeg`).
    pub content_type: String,
}

impl SynthesizedAudio {
    pub fn mpeg(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            content_type: "audio/mpeg".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_content_type_falls_back() {
        let input = AudioInput::new(vec![1, 2, 3], "audio.webm", Some("  ".to_string()));
        assert_eq!(input.content_type, DEFAULT_INPUT_CONTENT_TYPE);
        assert!(!input.is_empty());
    }
}
