//! Prompt templates for the interviewer persona.

pub mod interviewer;

pub use interviewer::{interviewer_system_prompt, BUILTIN_INTERVIEWER_PROMPT, LANGUAGE_PLACEHOLDER};
