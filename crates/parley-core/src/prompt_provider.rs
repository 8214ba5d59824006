//! System prompt provisioning with a process-wide, fetch-once cache.
//!
//! The prompt is fetched lazily on first use and kept until restart. A failed
//! fetch leaves the cache empty, so the next request tries again. Concurrent
//! first callers each fetch on their own, so a caller never waits longer than
//! one fetch. The first successful fetch wins and the cell is written at most
//! once.

use crate::error::{InterviewError, InterviewResult};
use crate::prompts::{interviewer_system_prompt, BUILTIN_INTERVIEWER_PROMPT};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{info, warn};

/// Where the raw prompt text comes from.
#[async_trait]
pub trait PromptSource: Send + Sync {
    async fn fetch(&self) -> Result<String, String>;
}

/// Fixed prompt text (no network).
#[derive(Debug, Clone)]
pub struct StaticPromptSource(pub String);

impl StaticPromptSource {
    pub fn builtin() -> Self {
        Self(BUILTIN_INTERVIEWER_PROMPT.to_string())
    }
}

#[async_trait]
impl PromptSource for StaticPromptSource {
    async fn fetch(&self) -> Result<String, String> {
        Ok(self.0.clone())
    }
}

#[derive(Deserialize)]
struct PromptPayload {
    message: String,
}

/// Remote prompt: `GET url` returning `{"message": "..."}`.
pub struct HttpPromptSource {
    url: String,
    client: reqwest::Client,
}

impl HttpPromptSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl PromptSource for HttpPromptSource {
    async fn fetch(&self) -> Result<String, String> {
        let res = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| format!("prompt request failed: {}", e))?;
        if !res.status().is_success() {
            return Err(format!("prompt source returned {}", res.status()));
        }
        let payload: PromptPayload = res
            .json()
            .await
            .map_err(|e| format!("prompt payload malformed: {}", e))?;
        Ok(payload.message)
    }
}

pub struct PromptProvider {
    source: Arc<dyn PromptSource>,
    language: String,
    fallback_to_builtin: bool,
    cached: OnceLock<String>,
}

impl PromptProvider {
    pub fn new(source: Arc<dyn PromptSource>, language: impl Into<String>) -> Self {
        Self {
            source,
            language: language.into(),
            fallback_to_builtin: false,
            cached: OnceLock::new(),
        }
    }

    /// On fetch failure, answer with the built-in prompt instead of failing. The
    /// fallback is never cached.
    pub fn with_builtin_fallback(mut self, enabled: bool) -> Self {
        self.fallback_to_builtin = enabled;
        self
    }

    pub fn is_cached(&self) -> bool {
        self.cached.get().is_some()
    }

    pub async fn get_prompt(&self) -> InterviewResult<String> {
        if let Some(prompt) = self.cached.get() {
            return Ok(prompt.clone());
        }

        match self.fetch_prompt().await {
            Ok(prompt) => {
                if self.cached.set(prompt.clone()).is_ok() {
                    info!(target: "parley::prompt", chars = prompt.len(), "system prompt cached");
                }
                // A concurrent caller may have won the race; everyone serves its value.
                Ok(self.cached.get().cloned().unwrap_or(prompt))
            }
            Err(e) if self.fallback_to_builtin => {
                warn!(target: "parley::prompt", "prompt fetch failed, serving built-in prompt: {}", e);
                Ok(interviewer_system_prompt(BUILTIN_INTERVIEWER_PROMPT, &self.language))
            }
            Err(e) => {
                warn!(target: "parley::prompt", "prompt fetch failed: {}", e);
                Err(InterviewError::PromptUnavailable(e))
            }
        }
    }

    async fn fetch_prompt(&self) -> Result<String, String> {
        let raw = self.source.fetch().await?;
        let prompt = interviewer_system_prompt(&raw, &self.language);
        if prompt.trim().is_empty() {
            return Err("prompt source returned an empty message".to_string());
        }
        Ok(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        fail_first: usize,
    }

    impl CountingSource {
        fn new(fail_first: usize) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail_first,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PromptSource for CountingSource {
        async fn fetch(&self) -> Result<String, String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if n < self.fail_first {
                Err("connection refused".to_string())
            } else {
                Ok(format!("prompt #{} in {{LANGUAGE}}", n))
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_calls_agree_on_one_prompt() {
        let source = CountingSource::new(0);
        let provider = Arc::new(PromptProvider::new(source.clone(), "en"));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let p = provider.clone();
                tokio::spawn(async move { p.get_prompt().await })
            })
            .collect();
        let results = futures::future::join_all(tasks).await;

        let prompts: Vec<String> = results.into_iter().map(|r| r.unwrap().unwrap()).collect();
        assert!(prompts.iter().all(|p| !p.is_empty() && p == &prompts[0]));
        assert!(prompts[0].starts_with("prompt #") && prompts[0].ends_with(" in en"));
        assert!(provider.is_cached());

        let fetched = source.calls();
        assert!((1..=16).contains(&fetched));
        assert_eq!(provider.get_prompt().await.unwrap(), prompts[0]);
        assert_eq!(source.calls(), fetched);
    }

    struct StalledSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PromptSource for StalledSource {
        async fn fetch(&self) -> Result<String, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(10)).await;
            Err("prompt request failed: timed out".to_string())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn outage_costs_each_caller_one_fetch() {
        let source = Arc::new(StalledSource {
            calls: AtomicUsize::new(0),
        });
        let provider = Arc::new(PromptProvider::new(source.clone(), "en"));

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let p = provider.clone();
                tokio::spawn(async move {
                    let started = tokio::time::Instant::now();
                    let result = p.get_prompt().await;
                    (result, started.elapsed())
                })
            })
            .collect();

        for joined in futures::future::join_all(tasks).await {
            let (result, waited) = joined.unwrap();
            assert!(matches!(result, Err(InterviewError::PromptUnavailable(_))));
            assert!(waited < Duration::from_secs(11), "waited {:?}", waited);
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 20);
        assert!(!provider.is_cached());
    }

    #[tokio::test]
    async fn failed_fetch_is_not_cached() {
        let source = CountingSource::new(1);
        let provider = PromptProvider::new(source.clone(), "en");

        let err = provider.get_prompt().await.unwrap_err();
        assert!(matches!(err, InterviewError::PromptUnavailable(_)));
        assert!(!provider.is_cached());

        assert_eq!(provider.get_prompt().await.unwrap(), "prompt #1 in en");
        assert_eq!(source.calls(), 2);

        // Cached now: no further fetches.
        provider.get_prompt().await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn builtin_fallback_is_served_but_not_cached() {
        let source = CountingSource::new(1);
        let provider = PromptProvider::new(source.clone(), "de").with_builtin_fallback(true);

        let fallback = provider.get_prompt().await.unwrap();
        assert!(fallback.contains("AI interviewer"));
        assert!(fallback.ends_with("code: de."));
        assert!(!provider.is_cached());

        assert_eq!(provider.get_prompt().await.unwrap(), "prompt #1 in de");
        assert!(provider.is_cached());
    }

    #[tokio::test]
    async fn blank_prompt_is_unavailable() {
        let provider = PromptProvider::new(Arc::new(StaticPromptSource("  ".to_string())), "en");
        assert!(matches!(
            provider.get_prompt().await,
            Err(InterviewError::PromptUnavailable(_))
        ));
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn http_source_reads_message_field() {
        let app = Router::new().route(
            "/prompt",
            get(|| async { Json(serde_json::json!({ "message": "Interview in {LANGUAGE}." })) }),
        );
        let url = format!("{}/prompt", serve(app).await);
        let source = Arc::new(HttpPromptSource::new(url, Duration::from_secs(2)));
        let provider = PromptProvider::new(source, "fr");
        assert_eq!(provider.get_prompt().await.unwrap(), "Interview in fr.");
    }

    #[tokio::test]
    async fn http_source_rejects_bad_status_and_payload() {
        let app = Router::new()
            .route("/down", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
            .route("/odd", get(|| async { Json(serde_json::json!({ "text": "nope" })) }));
        let base = serve(app).await;

        let down = HttpPromptSource::new(format!("{}/down", base), Duration::from_secs(2));
        assert!(down.fetch().await.unwrap_err().contains("503"));

        let odd = HttpPromptSource::new(format!("{}/odd", base), Duration::from_secs(2));
        assert!(odd.fetch().await.unwrap_err().contains("malformed"));
    }
}
