//! Axum route handlers for cold email generation.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::generation::job_posting::{JobDetails, JobPosting};
use crate::generation::session::{
    ColdEmailRequest, ColdEmailSession, EmailDownload, SessionState,
};
use crate::resume::ResumeUpload;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DownloadInfo {
    pub file_name: &'static str,
    pub mime_type: &'static str,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub job: JobPosting,
    pub details: JobDetails,
    pub email: String,
    pub extracted_jobs: usize,
    pub download: DownloadInfo,
}

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub email: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/cold-email
///
/// Multipart fields: `job_url`, `job_text`, `additional_info`, `resume` (PDF file).
/// Runs one generation attempt to completion.
pub async fn handle_generate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<GenerateResponse>, AppError> {
    let request = read_request(multipart).await?;

    let mut session = ColdEmailSession::new();
    session.trigger(&state.service, request).await;
    let download = session.download();

    match (session.into_state(), download) {
        (SessionState::Success(mail), Some(download)) => Ok(Json(GenerateResponse {
            job: mail.job,
            details: mail.details,
            email: mail.email,
            extracted_jobs: mail.extracted_jobs,
            download: DownloadInfo {
                file_name: download.file_name,
                mime_type: download.mime_type,
            },
        })),
        (SessionState::Failed(failure), _) => Err(AppError::Generation(failure)),
        (other, _) => Err(AppError::Internal(anyhow::anyhow!(
            "Generation attempt ended in unexpected state {other:?}"
        ))),
    }
}

/// POST /api/v1/cold-email/download
///
/// Returns the posted email verbatim as a `cold_email.txt` attachment.
pub async fn handle_download(Json(request): Json<DownloadRequest>) -> Result<Response, AppError> {
    if request.email.trim().is_empty() {
        return Err(AppError::Validation("email cannot be empty".to_string()));
    }
    Ok(EmailDownload::new(request.email).into_response())
}

impl IntoResponse for EmailDownload {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.file_name);
        (
            [
                (header::CONTENT_TYPE, self.mime_type.to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.content,
        )
            .into_response()
    }
}

async fn read_request(mut multipart: Multipart) -> Result<ColdEmailRequest, AppError> {
    let mut request = ColdEmailRequest::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "job_url" => request.job_url = Some(field.text().await?),
            "job_text" => request.job_text = Some(field.text().await?),
            "additional_info" => request.additional_info = Some(field.text().await?),
            "resume" => {
                let file_name = field.file_name().map(String::from);
                let bytes = field.bytes().await?;
                // Browsers send an empty part when no file was chosen.
                if !bytes.is_empty() {
                    request.resume = Some(ResumeUpload::new(file_name, bytes));
                }
            }
            other => debug!("Ignoring unknown multipart field '{other}'"),
        }
    }

    Ok(request)
}
