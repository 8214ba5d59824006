//! Chat-completion client: the language model behind the interviewer.
//!
//! `ChatCompletion` is the seam the generator calls through. `OpenAiChat`
//! speaks the OpenAI-compatible `/chat/completions` protocol (OpenAI, OpenRouter,
//! local gateways).

use crate::conversation::ConversationMessage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Provider errors are plain messages; the generator wraps them in `InterviewError::Completion`.
pub type CompletionResult<T> = Result<T, String>;

#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Run one completion and return the text of the first choice.
    async fn complete(&self, model: &str, messages: &[ConversationMessage]) -> CompletionResult<String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ConversationMessage],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat client. No client-side timeout: the generator bounds the call.
pub struct OpenAiChat {
    api_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiChat {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into().trim().to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ChatCompletion for OpenAiChat {
    async fn complete(&self, model: &str, messages: &[ConversationMessage]) -> CompletionResult<String> {
        let url = format!("{}/chat/completions", self.api_url.trim_end_matches('/'));
        let body = ChatRequest { model, messages };

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("completion request failed: {}", e))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("completion API error {}: {}", status, body));
        }

        let parsed: ChatResponse = res
            .json()
            .await
            .map_err(|e| format!("completion response parse failed: {}", e))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| "completion returned no choices".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn posts_messages_and_reads_first_choice() {
        let app = Router::new().route(
            "/chat/completions",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["model"], "gpt-3.5-turbo");
                assert_eq!(body["messages"][0]["role"], "system");
                assert_eq!(body["messages"][1]["content"], "hello");
                Json(serde_json::json!({
                    "choices": [
                        { "message": { "role": "assistant", "content": "first" } },
                        { "message": { "role": "assistant", "content": "second" } }
                    ]
                }))
            }),
        );
        let chat = OpenAiChat::new(serve(app).await, "sk-test");
        let messages = vec![
            ConversationMessage::system("be an interviewer"),
            ConversationMessage::user("hello"),
        ];
        assert_eq!(chat.complete("gpt-3.5-turbo", &messages).await.unwrap(), "first");
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let app = Router::new().route(
            "/chat/completions",
            post(|| async { Json(serde_json::json!({ "choices": [] })) }),
        );
        let chat = OpenAiChat::new(serve(app).await, "sk-test");
        let err = chat.complete("m", &[]).await.unwrap_err();
        assert!(err.contains("no choices"));
    }

    #[tokio::test]
    async fn http_error_carries_status() {
        let app = Router::new().route(
            "/chat/completions",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let chat = OpenAiChat::new(serve(app).await, "sk-test");
        let err = chat.complete("m", &[]).await.unwrap_err();
        assert!(err.contains("500"));
    }
}
