//! Extraction/generation pipeline: the boundary to the language model.
//!
//! `MailPipeline` is what the orchestration sees. `LlmMailPipeline` is the
//! production implementation; tests plug in their own.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::generation::job_posting::{job_postings_from_value, ApplicantProfile, JobPosting};
use crate::generation::prompts::{
    EXTRACT_JOBS_PROMPT_TEMPLATE, EXTRACT_JOBS_SYSTEM, NO_ADDITIONAL_INFO,
    WRITE_MAIL_PROMPT_TEMPLATE, WRITE_MAIL_SYSTEM,
};
use crate::llm_client::prompts::{fill_template, JSON_ONLY_SYSTEM, NO_PREAMBLE_SYSTEM};
use crate::llm_client::LlmClient;

#[async_trait]
pub trait MailPipeline: Send + Sync {
    /// Structured job records found in `raw_text`, in order. Empty means nothing was found.
    async fn extract_jobs(&self, raw_text: &str) -> Result<Vec<JobPosting>, AppError>;

    /// Cold email body for one job and one applicant.
    async fn write_mail(
        &self,
        job: &JobPosting,
        applicant: &ApplicantProfile,
    ) -> Result<String, AppError>;
}

pub struct LlmMailPipeline {
    llm: LlmClient,
}

impl LlmMailPipeline {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl MailPipeline for LlmMailPipeline {
    async fn extract_jobs(&self, raw_text: &str) -> Result<Vec<JobPosting>, AppError> {
        let prompt = fill_template(EXTRACT_JOBS_PROMPT_TEMPLATE, &[("job_text", raw_text)]);
        let system = format!("{EXTRACT_JOBS_SYSTEM} {JSON_ONLY_SYSTEM}");

        let answer: Value = self
            .llm
            .call_json(&prompt, &system)
            .await
            .map_err(|e| AppError::Llm(format!("Job extraction failed: {e}")))?;

        let postings = job_postings_from_value(&answer);
        info!("Extracted {} job posting(s)", postings.len());
        Ok(postings)
    }

    async fn write_mail(
        &self,
        job: &JobPosting,
        applicant: &ApplicantProfile,
    ) -> Result<String, AppError> {
        let prompt = build_mail_prompt(job, applicant)?;
        let system = format!("{WRITE_MAIL_SYSTEM} {NO_PREAMBLE_SYSTEM}");

        let email = self
            .llm
            .call_text(&prompt, &system)
            .await
            .map_err(|e| AppError::Llm(format!("Email generation failed: {e}")))?;

        debug!("Generated email of {} chars", email.len());
        Ok(email)
    }
}

fn build_mail_prompt(job: &JobPosting, applicant: &ApplicantProfile) -> Result<String, AppError> {
    let job_json = serde_json::to_string_pretty(job)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize job posting: {e}")))?;

    let additional_info = if applicant.additional_info.is_empty() {
        NO_ADDITIONAL_INFO
    } else {
        applicant.additional_info.as_str()
    };

    Ok(fill_template(
        WRITE_MAIL_PROMPT_TEMPLATE,
        &[
            ("job_json", job_json.as_str()),
            ("resume_text", applicant.resume_text.as_str()),
            ("additional_info", additional_info),
        ],
    ))
}
