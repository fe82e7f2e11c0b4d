//! Recording stand-ins for the service collaborators.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::generation::job_posting::{ApplicantProfile, JobPosting};
use crate::generation::pipeline::MailPipeline;
use crate::job_source::fetcher::{FetchError, PageFetcher};
use crate::resume::{ResumeError, ResumeTextExtractor, ResumeUpload};

pub fn acme_posting() -> JobPosting {
    JobPosting {
        title: Some("Senior Backend Engineer".to_string()),
        company: Some("Acme Corp".to_string()),
        location: Some("Remote".to_string()),
        ..Default::default()
    }
}

/// Records requested URLs and replays a fixed answer.
pub struct StubFetcher {
    answer: Result<String, u16>,
    pub calls: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn returning(text: &str) -> Self {
        Self {
            answer: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every fetch fails with the given HTTP status.
    pub fn failing(status: u16) -> Self {
        Self {
            answer: Err(status),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.answer.clone().map_err(FetchError::Status)
    }
}

pub struct StubResumeReader {
    text: Option<String>,
    calls: Mutex<usize>,
}

impl StubResumeReader {
    pub fn returning(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            calls: Mutex::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            text: None,
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl ResumeTextExtractor for StubResumeReader {
    fn extract(&self, _resume: &ResumeUpload) -> Result<String, ResumeError> {
        *self.calls.lock().unwrap() += 1;
        self.text
            .clone()
            .ok_or_else(|| ResumeError::Parse("stub parser refused".to_string()))
    }
}

/// Replays fixed postings and a fixed email (or error), recording every call.
pub struct StubPipeline {
    postings: Vec<JobPosting>,
    email: Result<String, String>,
    extract_calls: Mutex<Vec<String>>,
    mail_calls: Mutex<Vec<(JobPosting, ApplicantProfile)>>,
}

impl StubPipeline {
    pub fn new(postings: Vec<JobPosting>, email: Result<String, String>) -> Self {
        Self {
            postings,
            email,
            extract_calls: Mutex::new(Vec::new()),
            mail_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn extract_inputs(&self) -> Vec<String> {
        self.extract_calls.lock().unwrap().clone()
    }

    pub fn extract_call_count(&self) -> usize {
        self.extract_calls.lock().unwrap().len()
    }

    pub fn mail_calls(&self) -> Vec<(JobPosting, ApplicantProfile)> {
        self.mail_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailPipeline for StubPipeline {
    async fn extract_jobs(&self, raw_text: &str) -> Result<Vec<JobPosting>, AppError> {
        self.extract_calls.lock().unwrap().push(raw_text.to_string());
        Ok(self.postings.clone())
    }

    async fn write_mail(
        &self,
        job: &JobPosting,
        applicant: &ApplicantProfile,
    ) -> Result<String, AppError> {
        self.mail_calls
            .lock()
            .unwrap()
            .push((job.clone(), applicant.clone()));
        self.email.clone().map_err(AppError::Llm)
    }
}
