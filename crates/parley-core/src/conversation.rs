//! Client-held conversation transcript and its header-safe token encoding.
//!
//! The server never stores history. Each reply carries the whole transcript
//! back to the browser as base64-of-JSON; the browser sends it again with the
//! next utterance.

use crate::error::{InterviewError, InterviewResult};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// Largest accepted token, in encoded characters. A longer transcript is the
/// client's responsibility to trim; it is rejected as malformed.
pub const MAX_TOKEN_LEN: usize = 256 * 1024;

/// Opaque, reversible encoding of a conversation (base64 of a JSON array).
pub type ConversationToken = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
}

impl ConversationMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Encode messages in order. Deterministic: equal inputs give equal tokens.
pub fn encode(messages: &[ConversationMessage]) -> ConversationToken {
    // Serializing a Vec of plain structs cannot fail.
    let json = serde_json::to_vec(messages).unwrap_or_else(|_| b"[]".to_vec());
    STANDARD.encode(json)
}

/// Decode a token. `None`, `""` and whitespace-only tokens mean "no prior turns".
pub fn decode(token: Option<&str>) -> InterviewResult<Vec<ConversationMessage>> {
    let token = match token.map(str::trim) {
        None | Some("") => return Ok(Vec::new()),
        Some(t) => t,
    };
    if token.len() > MAX_TOKEN_LEN {
        return Err(InterviewError::MalformedToken(format!(
            "token is {} bytes, limit is {}",
            token.len(),
            MAX_TOKEN_LEN
        )));
    }
    let raw = STANDARD
        .decode(token)
        .map_err(|e| InterviewError::MalformedToken(format!("not base64: {}", e)))?;
    serde_json::from_slice(&raw)
        .map_err(|e| InterviewError::MalformedToken(format!("not a message list: {}", e)))
}

/// The transcript after one more turn: `prior + [user, assistant]`.
pub fn append_turn(
    mut prior: Vec<ConversationMessage>,
    user_text: impl Into<String>,
    ai_text: impl Into<String>,
) -> Vec<ConversationMessage> {
    prior.push(ConversationMessage::user(user_text));
    prior.push(ConversationMessage::assistant(ai_text));
    prior
}
