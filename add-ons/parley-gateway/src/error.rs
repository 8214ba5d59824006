//! HTTP mapping for pipeline failures. Every error aborts the turn; no audio is returned.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use parley_core::InterviewError;
use serde::Serialize;

#[derive(Debug)]
pub enum ApiError {
    /// The upload itself was unusable (missing part, broken multipart).
    BadUpload(String),
    Interview(InterviewError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl From<InterviewError> for ApiError {
    fn from(err: InterviewError) -> Self {
        ApiError::Interview(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadUpload(_) => StatusCode::BAD_REQUEST,
            ApiError::Interview(err) => match err {
                InterviewError::EmptyInput => StatusCode::UNPROCESSABLE_ENTITY,
                InterviewError::MalformedToken(_) => StatusCode::BAD_REQUEST,
                InterviewError::TranscriptTooLong { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                InterviewError::PromptUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                InterviewError::Completion(_)
                | InterviewError::Transcription(_)
                | InterviewError::Synthesis(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadUpload(msg) => msg.clone(),
            ApiError::Interview(err) => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            tracing::error!(target: "parley::gateway", %status, "inference failed: {}", message);
        } else {
            tracing::warn!(target: "parley::gateway", %status, "inference rejected: {}", message);
        }
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
