//! Routes: `POST /inference`, `GET /` redirect, `GET /health`, static UI fallback.

use crate::error::ApiError;
use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use parley_core::{AudioInput, InterviewError, RequestOrchestrator};
use std::sync::Arc;
use std::time::Instant;
use tower_http::services::ServeDir;

/// Request header carrying the prior conversation token.
pub const CONVERSATION_HEADER: &str = "conversation";
/// Response header carrying the updated conversation token.
pub const TOKEN_RESPONSE_HEADER: &str = "text";
/// Multipart field holding the recorded utterance.
pub const AUDIO_FIELD: &str = "audio";
/// Same ceiling as the hosted transcription APIs.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<RequestOrchestrator>,
}

pub fn build_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(root))
        .route(
            "/inference",
            post(inference).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .with_state(state)
        .fallback_service(ServeDir::new(static_dir))
        .layer(axum::middleware::from_fn(log_requests))
}

async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    tracing::debug!(
        target: "parley::gateway",
        %method,
        path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request handled"
    );
    response
}

async fn health() -> &'static str {
    "OK"
}

async fn root() -> Redirect {
    Redirect::temporary("/index.html")
}

/// One interview turn: multipart `audio` in, synthesized reply out, new token in the `text` header.
async fn inference(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    tracing::debug!(target: "parley::gateway", "received request");
    let prior_token = headers
        .get(CONVERSATION_HEADER)
        .map(|v| v.to_str())
        .transpose()
        .map_err(|_| InterviewError::MalformedToken("conversation header is not ASCII".to_string()))?;

    let audio = read_audio(multipart).await?;
    let reply = state.orchestrator.handle(audio, prior_token).await?;

    Ok((
        [
            (header::CONTENT_TYPE.as_str(), reply.audio.content_type),
            (TOKEN_RESPONSE_HEADER, reply.token),
        ],
        reply.audio.bytes,
    )
        .into_response())
}

async fn read_audio(mut multipart: Multipart) -> Result<AudioInput, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadUpload(format!("invalid multipart body: {}", e)))?
    {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("audio.webm").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadUpload(format!("failed to read audio: {}", e)))?;
        return Ok(AudioInput::new(bytes.to_vec(), file_name, content_type));
    }
    Err(ApiError::BadUpload(format!("missing '{}' file part", AUDIO_FIELD)))
}
