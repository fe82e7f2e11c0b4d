use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::generation::session::Failure;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Generation(#[from] Failure),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, detail) = match &self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::Multipart(e) => multipart_rejection(e),
            AppError::Generation(failure) => (
                failure_status(failure),
                failure.code(),
                failure.to_string(),
                failure.detail(),
            ),
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                    None,
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "detail": detail,
            }
        }));

        (status, body).into_response()
    }
}

/// Body-limit breaches surface as 413 so clients can tell an oversized upload from a malformed one.
fn multipart_rejection(e: &MultipartError) -> (StatusCode, &'static str, String, Option<String>) {
    let status = e.status();
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        (
            status,
            "PAYLOAD_TOO_LARGE",
            "The upload exceeds the maximum allowed size".to_string(),
            Some(e.body_text()),
        )
    } else {
        (status, "INVALID_MULTIPART", e.body_text(), None)
    }
}

fn failure_status(failure: &Failure) -> StatusCode {
    match failure {
        Failure::MissingJobInfo { .. } | Failure::MissingResume => StatusCode::BAD_REQUEST,
        Failure::UnreadableResume { .. } | Failure::ExtractionEmpty => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        Failure::Generic(_) => StatusCode::BAD_GATEWAY,
    }
}
