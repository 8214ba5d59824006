//! Interviewer reply generation: validate, assemble history, call the model under a deadline.

use crate::completion::ChatCompletion;
use crate::conversation::{self, ConversationMessage};
use crate::error::{InterviewError, InterviewResult};
use crate::prompt_provider::PromptProvider;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct ResponseGenerator {
    prompts: Arc<PromptProvider>,
    chat: Arc<dyn ChatCompletion>,
    model: String,
    timeout: Duration,
}

impl ResponseGenerator {
    pub fn new(
        prompts: Arc<PromptProvider>,
        chat: Arc<dyn ChatCompletion>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            prompts,
            chat,
            model: model.into(),
            timeout,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Produce the next interviewer line for `user_utterance` given the prior transcript.
    pub async fn generate(&self, user_utterance: &str, prior_token: Option<&str>) -> InterviewResult<String> {
        if is_blank(user_utterance) {
            return Err(InterviewError::EmptyInput);
        }

        let started = Instant::now();
        let history = conversation::decode(prior_token)?;
        let system = self.prompts.get_prompt().await?;

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ConversationMessage::system(system));
        messages.extend(history);
        messages.push(ConversationMessage::user(user_utterance));

        debug!(target: "parley::generator", model = %self.model, messages = messages.len(), "calling completion");
        let reply = tokio::time::timeout(self.timeout, self.chat.complete(&self.model, &messages))
            .await
            .map_err(|_| {
                InterviewError::Completion(format!(
                    "{} did not answer within {:?}",
                    self.model, self.timeout
                ))
            })?
            .map_err(InterviewError::Completion)?;

        info!(
            target: "parley::generator",
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "response received"
        );
        debug!(target: "parley::generator", model = %self.model, "response: {}", reply);
        Ok(reply)
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}
