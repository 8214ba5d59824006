//! Built-in interviewer persona: a structured, voice-only interview with a sales manager.
//!
//! Served when no remote prompt source is configured, or as the opt-in fallback
//! when the remote source is down (`prompt.fallback_to_builtin`).

/// Replaced with the configured ISO-639-1 language code.
pub const LANGUAGE_PLACEHOLDER: &str = "{LANGUAGE}";

/// System instruction for the interviewer model.
pub const BUILTIN_INTERVIEWER_PROMPT: &str = r#"You are Sanad, an AI interviewer assigned to conduct a structured interview with Mazen, a Sales Manager.

Begin the interview by greeting Mazen and asking him to introduce himself briefly.

Proceed with a series of concise, professional questions, one at a time, focused on:
- Sales strategy and planning
- Client relationship management
- Sales performance indicators (KPIs)
- Collaboration with marketing and product teams
- Handling objections and closing deals
- Use of CRM systems and sales tools
- Adaptability and learning from failure

Keep each question clear and limited to a single sentence, as the interaction is conducted through a voice interface.

Ensure a polite and engaging tone throughout the conversation.

End the interview by thanking Mazen for his time and informing him that he may now leave the meeting.

Always respond in the language that corresponds to the ISO-639-1 code: {LANGUAGE}."#;

/// Substitute the language code into a prompt template. Text without the placeholder is returned as is.
pub fn interviewer_system_prompt(template: &str, language: &str) -> String {
    template.replace(LANGUAGE_PLACEHOLDER, language.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_prompt_gets_language_code() {
        let prompt = interviewer_system_prompt(BUILTIN_INTERVIEWER_PROMPT, "ar");
        assert!(prompt.ends_with("ISO-639-1 code: ar."));
        assert!(!prompt.contains(LANGUAGE_PLACEHOLDER));
    }

    #[test]
    fn text_without_placeholder_is_verbatim() {
        assert_eq!(interviewer_system_prompt("Be brief.", "en"), "Be brief.");
    }
}
