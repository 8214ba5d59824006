//! Best-effort utterance logging to an external webhook.
//!
//! `notify` never blocks and never fails: events go into a bounded queue that a
//! single background worker drains. When the queue is full the new event is
//! dropped. Delivery failures are logged and forgotten; nothing is retried.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Who said the logged line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    User,
    Assistant,
    Applicant,
}

/// Webhook body: `{timestamp, source, text}`.
#[derive(Debug, Clone, Serialize)]
pub struct NotifierEvent {
    /// ISO-8601, UTC.
    pub timestamp: String,
    pub source: EventSource,
    pub text: String,
}

impl NotifierEvent {
    pub fn now(source: EventSource, text: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            source,
            text: text.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("webhook unreachable: {0}")]
    Unreachable(String),
    #[error("webhook returned {0}")]
    Status(u16),
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn deliver(&self, event: &NotifierEvent) -> Result<(), NotificationError>;
}

/// POSTs each event as JSON to a fixed URL.
pub struct HttpEventSink {
    url: String,
    client: reqwest::Client,
}

impl HttpEventSink {
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
impl EventSink for HttpEventSink {
    async fn deliver(&self, event: &NotifierEvent) -> Result<(), NotificationError> {
        let res = self
            .client
            .post(&self.url)
            .json(event)
            .send()
            .await
            .map_err(|e| NotificationError::Unreachable(e.to_string()))?;
        if !res.status().is_success() {
            return Err(NotificationError::Status(res.status().as_u16()));
        }
        Ok(())
    }
}

pub struct EventNotifier {
    tx: Option<mpsc::Sender<NotifierEvent>>,
    worker: Option<JoinHandle<()>>,
}

impl EventNotifier {
    /// Start the delivery worker. Must be called inside a tokio runtime.
    pub fn spawn(sink: Arc<dyn EventSink>, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<NotifierEvent>(capacity.max(1));
        let worker = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match sink.deliver(&event).await {
                    Ok(()) => debug!(target: "parley::notifier", source = ?event.source, "event delivered"),
                    Err(e) => warn!(target: "parley::notifier", "Failed to log message: {}", e),
                }
            }
            debug!(target: "parley::notifier", "notifier worker stopped");
        });
        Self {
            tx: Some(tx),
            worker: Some(worker),
        }
    }

    /// A notifier that drops everything (no webhook configured).
    pub fn disabled() -> Self {
        Self {
            tx: None,
            worker: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Queue an event and return immediately.
    pub fn notify(&self, source: EventSource, text: &str) {
        let Some(tx) = &self.tx else {
            return;
        };
        match tx.try_send(NotifierEvent::now(source, text)) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!(target: "parley::notifier", source = ?event.source, "notifier queue full, event dropped");
            }
            Err(TrySendError::Closed(_)) => {
                warn!(target: "parley::notifier", "notifier stopped, event dropped");
            }
        }
    }

    /// Stop accepting events and wait until queued ones have been attempted.
    pub async fn shutdown(mut self) {
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.await;
        }
    }
}
