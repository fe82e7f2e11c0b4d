//! Cold email orchestration: one attempt runs resolve → read resume → extract
//! jobs → write mail, and lands in either `Success` or `Failed`.
//!
//! Every collaborator failure is turned into a `Failure` here. Nothing escapes
//! as a panic or an unhandled error.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::generation::job_posting::{ApplicantProfile, JobDetails, JobPosting};
use crate::generation::pipeline::MailPipeline;
use crate::job_source::fetcher::PageFetcher;
use crate::job_source::{resolve_job_content, ResolveError};
use crate::resume::{ResumeTextExtractor, ResumeUpload};

/// Suggested file name for the downloaded email.
pub const EMAIL_FILE_NAME: &str = "cold_email.txt";
pub const EMAIL_MIME_TYPE: &str = "text/plain";

/// Why an attempt ended without an email. Terminal for that attempt.
#[derive(Debug, Error)]
pub enum Failure {
    /// No usable job text. `fetch_error` is set when a URL was given but could not be fetched.
    #[error("Please provide job info (URL or manual input)")]
    MissingJobInfo { fetch_error: Option<String> },

    #[error("Please upload your resume")]
    MissingResume,

    #[error("Failed to read resume. Please check your PDF file.")]
    UnreadableResume { reason: String },

    #[error("Could not extract job details. Try a different job post.")]
    ExtractionEmpty,

    #[error("An error occurred: {0}")]
    Generic(String),
}

impl Failure {
    pub fn code(&self) -> &'static str {
        match self {
            Failure::MissingJobInfo {
                fetch_error: Some(_),
            } => "FETCH_FAILED",
            Failure::MissingJobInfo { fetch_error: None } => "MISSING_JOB_INFO",
            Failure::MissingResume => "MISSING_RESUME",
            Failure::UnreadableResume { .. } => "UNREADABLE_RESUME",
            Failure::ExtractionEmpty => "EXTRACTION_EMPTY",
            Failure::Generic(_) => "GENERATION_FAILED",
        }
    }

    /// True when a collaborator (model, runtime) broke rather than the user's input.
    pub fn is_collaborator_fault(&self) -> bool {
        matches!(self, Failure::Generic(_))
    }

    /// Extra context for the user beyond the headline message.
    pub fn detail(&self) -> Option<String> {
        match self {
            Failure::MissingJobInfo {
                fetch_error: Some(e),
            } => Some(format!(
                "{e}. Try pasting the job description as text instead."
            )),
            Failure::UnreadableResume { reason } => Some(reason.clone()),
            _ => None,
        }
    }
}

/// Everything the user supplied for one attempt.
#[derive(Debug, Clone, Default)]
pub struct ColdEmailRequest {
    pub job_text: Option<String>,
    pub job_url: Option<String>,
    pub resume: Option<ResumeUpload>,
    pub additional_info: Option<String>,
}

/// A request whose inputs are all present.
#[derive(Debug)]
pub struct ValidatedRequest {
    pub job_text: String,
    pub resume: ResumeUpload,
    pub additional_info: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColdEmail {
    pub job: JobPosting,
    pub details: JobDetails,
    pub email: String,
    /// How many postings the model found; only the first is used.
    pub extracted_jobs: usize,
}

impl ColdEmail {
    pub fn download(&self) -> EmailDownload {
        EmailDownload::new(self.email.clone())
    }
}

/// The generated email packaged as a plain-text file.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailDownload {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub content: String,
}

impl EmailDownload {
    pub fn new(content: String) -> Self {
        Self {
            file_name: EMAIL_FILE_NAME,
            mime_type: EMAIL_MIME_TYPE,
            content,
        }
    }
}

/// Runs attempts against injected collaborators.
pub struct ColdEmailService {
    fetcher: Arc<dyn PageFetcher>,
    resume_reader: Arc<dyn ResumeTextExtractor>,
    pipeline: Arc<dyn MailPipeline>,
}

impl ColdEmailService {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        resume_reader: Arc<dyn ResumeTextExtractor>,
        pipeline: Arc<dyn MailPipeline>,
    ) -> Self {
        Self {
            fetcher,
            resume_reader,
            pipeline,
        }
    }

    /// Resolves the job text, then checks that a resume was uploaded.
    pub async fn validate(&self, request: ColdEmailRequest) -> Result<ValidatedRequest, Failure> {
        let job_text = resolve_job_content(
            request.job_text.as_deref(),
            request.job_url.as_deref(),
            self.fetcher.as_ref(),
        )
        .await
        .map_err(|e| match e {
            ResolveError::NoContent => Failure::MissingJobInfo { fetch_error: None },
            ResolveError::Fetch(_) => Failure::MissingJobInfo {
                fetch_error: Some(e.to_string()),
            },
        })?;

        let resume = request.resume.ok_or(Failure::MissingResume)?;

        Ok(ValidatedRequest {
            job_text,
            resume,
            additional_info: request.additional_info,
        })
    }

    /// Reads the resume, extracts job postings and drafts the email for the first one.
    pub async fn process(&self, request: ValidatedRequest) -> Result<ColdEmail, Failure> {
        let reader = Arc::clone(&self.resume_reader);
        let resume = request.resume;
        let resume_text = tokio::task::spawn_blocking(move || reader.extract(&resume))
            .await
            .map_err(|e| Failure::Generic(format!("Resume extraction task failed: {e}")))?
            .map_err(|e| Failure::UnreadableResume {
                reason: e.to_string(),
            })?;

        let applicant = ApplicantProfile::new(resume_text, request.additional_info);

        let postings = self
            .pipeline
            .extract_jobs(&request.job_text)
            .await
            .map_err(|e| Failure::Generic(e.to_string()))?;

        let extracted_jobs = postings.len();
        // A careers page listing several openings yields several postings; only the first is used.
        let Some(job) = postings.into_iter().next() else {
            return Err(Failure::ExtractionEmpty);
        };
        if extracted_jobs > 1 {
            warn!("{extracted_jobs} job postings extracted, drafting for the first only");
        }

        let email = self
            .pipeline
            .write_mail(&job, &applicant)
            .await
            .map_err(|e| Failure::Generic(e.to_string()))?;

        Ok(ColdEmail {
            details: job.details(),
            job,
            email,
            extracted_jobs,
        })
    }

    #[allow(dead_code)]
    pub async fn generate(&self, request: ColdEmailRequest) -> Result<ColdEmail, Failure> {
        let validated = self.validate(request).await?;
        self.process(validated).await
    }
}

#[derive(Debug)]
pub enum SessionState {
    Idle,
    Validating,
    Processing,
    Success(ColdEmail),
    Failed(Failure),
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Validating => "validating",
            SessionState::Processing => "processing",
            SessionState::Success(_) => "success",
            SessionState::Failed(_) => "failed",
        }
    }
}

/// One user's generation flow. `trigger` runs an attempt, `reset` starts over.
#[derive(Debug)]
pub struct ColdEmailSession {
    state: SessionState,
}

impl Default for ColdEmailSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ColdEmailSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
        }
    }

    #[allow(dead_code)]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn into_state(self) -> SessionState {
        self.state
    }

    pub async fn trigger(
        &mut self,
        service: &ColdEmailService,
        request: ColdEmailRequest,
    ) -> &SessionState {
        let span = info_span!("cold_email", request_id = %Uuid::new_v4());
        self.run(service, request).instrument(span).await;
        &self.state
    }

    /// "Generate another": drop the previous outcome.
    // The HTTP surface is stateless; embedding callers keep a session across attempts.
    #[allow(dead_code)]
    pub fn reset(&mut self) {
        self.transition(SessionState::Idle);
    }

    /// Only available after a successful attempt.
    pub fn download(&self) -> Option<EmailDownload> {
        match &self.state {
            SessionState::Success(mail) => Some(mail.download()),
            _ => None,
        }
    }

    async fn run(&mut self, service: &ColdEmailService, request: ColdEmailRequest) {
        self.transition(SessionState::Validating);
        let validated = match service.validate(request).await {
            Ok(validated) => validated,
            Err(failure) => return self.fail(failure),
        };

        self.transition(SessionState::Processing);
        match service.process(validated).await {
            Ok(mail) => {
                info!(
                    "Cold email ready for {} at {}",
                    mail.details.title, mail.details.company
                );
                self.transition(SessionState::Success(mail));
            }
            Err(failure) => self.fail(failure),
        }
    }

    fn fail(&mut self, failure: Failure) {
        match &failure {
            f if f.is_collaborator_fault() => error!("Generation failed: {f}"),
            f => warn!("Attempt rejected: {f} ({})", f.code()),
        }
        self.transition(SessionState::Failed(failure));
    }

    fn transition(&mut self, next: SessionState) {
        debug!("Session {} -> {}", self.state.name(), next.name());
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::resume::cache::ResumeCache;
    use crate::resume::tests::pdf_with_pages;
    use crate::resume::PdfResumeReader;
    use crate::test_support::{acme_posting, StubFetcher, StubPipeline, StubResumeReader};

    const ACME_TEXT: &str = "Senior Backend Engineer at Acme Corp, Remote";

    fn resume_upload() -> ResumeUpload {
        ResumeUpload::new(Some("resume.pdf".to_string()), b"%PDF-stub".to_vec())
    }

    fn request_with_text(text: &str) -> ColdEmailRequest {
        ColdEmailRequest {
            job_text: Some(text.to_string()),
            resume: Some(resume_upload()),
            ..Default::default()
        }
    }

    struct Harness {
        fetcher: Arc<StubFetcher>,
        reader: Arc<StubResumeReader>,
        pipeline: Arc<StubPipeline>,
        service: ColdEmailService,
    }

    fn harness(fetcher: StubFetcher, reader: StubResumeReader, pipeline: StubPipeline) -> Harness {
        let fetcher = Arc::new(fetcher);
        let reader = Arc::new(reader);
        let pipeline = Arc::new(pipeline);
        let service = ColdEmailService::new(fetcher.clone(), reader.clone(), pipeline.clone());
        Harness {
            fetcher,
            reader,
            pipeline,
            service,
        }
    }

    #[tokio::test]
    async fn test_end_to_end_success_with_real_pdf() {
        let reader = Arc::new(PdfResumeReader::new(ResumeCache::new(
            NonZeroUsize::new(4).unwrap(),
        )));
        let pipeline = Arc::new(StubPipeline::new(
            vec![acme_posting()],
            Ok("Dear Acme team, ...".to_string()),
        ));
        let service = ColdEmailService::new(
            Arc::new(StubFetcher::returning("unused")),
            reader,
            pipeline.clone(),
        );

        let request = ColdEmailRequest {
            job_text: Some(ACME_TEXT.to_string()),
            job_url: None,
            resume: Some(ResumeUpload::new(
                Some("jane.pdf".to_string()),
                pdf_with_pages(&["Jane Doe, 5 years Python"]),
            )),
            additional_info: None,
        };

        let mut session = ColdEmailSession::new();
        let state = session.trigger(&service, request).await;

        let SessionState::Success(mail) = state else {
            panic!("expected success, got {state:?}");
        };
        assert_eq!(mail.details.title, "Senior Backend Engineer");
        assert_eq!(mail.details.company, "Acme Corp");
        assert_eq!(mail.details.location, "Remote");
        assert_eq!(mail.email, "Dear Acme team, ...");

        let download = session.download().unwrap();
        assert_eq!(download.content, "Dear Acme team, ...");
        assert_eq!(download.file_name, "cold_email.txt");
        assert_eq!(download.mime_type, "text/plain");

        assert_eq!(pipeline.extract_inputs(), vec![ACME_TEXT.to_string()]);
        let mails = pipeline.mail_calls();
        assert_eq!(mails.len(), 1);
        assert!(mails[0].1.resume_text.contains("Jane Doe"));
        assert_eq!(mails[0].1.additional_info, "");
    }

    #[tokio::test]
    async fn test_fetch_failure_stops_before_resume_extraction() {
        let h = harness(
            StubFetcher::failing(503),
            StubResumeReader::returning("Jane Doe"),
            StubPipeline::new(vec![acme_posting()], Ok("mail".to_string())),
        );
        let request = ColdEmailRequest {
            job_text: None,
            job_url: Some("https://bad.invalid".to_string()),
            resume: Some(resume_upload()),
            additional_info: None,
        };

        let mut session = ColdEmailSession::new();
        let state = session.trigger(&h.service, request).await;

        let SessionState::Failed(failure) = state else {
            panic!("expected failure, got {state:?}");
        };
        assert!(matches!(
            failure,
            Failure::MissingJobInfo {
                fetch_error: Some(_)
            }
        ));
        assert_eq!(failure.code(), "FETCH_FAILED");
        assert!(failure.detail().unwrap().contains("Could not fetch URL"));
        assert_eq!(h.fetcher.call_count(), 1);
        assert_eq!(h.reader.call_count(), 0);
        assert_eq!(h.pipeline.extract_call_count(), 0);
        assert!(session.download().is_none());
    }

    #[tokio::test]
    async fn test_missing_job_info_without_url() {
        let h = harness(
            StubFetcher::returning("unused"),
            StubResumeReader::returning("Jane Doe"),
            StubPipeline::new(vec![acme_posting()], Ok("mail".to_string())),
        );
        let request = ColdEmailRequest {
            job_text: Some("   ".to_string()),
            resume: Some(resume_upload()),
            ..Default::default()
        };

        let result = h.service.generate(request).await;
        let failure = result.unwrap_err();
        assert!(matches!(
            failure,
            Failure::MissingJobInfo { fetch_error: None }
        ));
        assert_eq!(failure.code(), "MISSING_JOB_INFO");
        assert_eq!(h.fetcher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_resume_touches_no_collaborator() {
        let h = harness(
            StubFetcher::returning("unused"),
            StubResumeReader::returning("Jane Doe"),
            StubPipeline::new(vec![acme_posting()], Ok("mail".to_string())),
        );
        let request = ColdEmailRequest {
            job_text: Some(ACME_TEXT.to_string()),
            ..Default::default()
        };

        let mut session = ColdEmailSession::new();
        let state = session.trigger(&h.service, request).await;

        assert!(matches!(state, SessionState::Failed(Failure::MissingResume)));
        assert_eq!(h.reader.call_count(), 0);
        assert_eq!(h.pipeline.extract_call_count(), 0);
        assert!(h.pipeline.mail_calls().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_resume_stops_before_pipeline() {
        let h = harness(
            StubFetcher::returning("unused"),
            StubResumeReader::failing(),
            StubPipeline::new(vec![acme_posting()], Ok("mail".to_string())),
        );

        let failure = h
            .service
            .generate(request_with_text(ACME_TEXT))
            .await
            .unwrap_err();

        assert!(matches!(failure, Failure::UnreadableResume { .. }));
        assert_eq!(failure.code(), "UNREADABLE_RESUME");
        assert_eq!(h.reader.call_count(), 1);
        assert_eq!(h.pipeline.extract_call_count(), 0);
    }

    #[tokio::test]
    async fn test_real_reader_rejects_non_pdf_upload() {
        let reader = Arc::new(PdfResumeReader::new(ResumeCache::new(
            NonZeroUsize::new(4).unwrap(),
        )));
        let pipeline = Arc::new(StubPipeline::new(vec![acme_posting()], Ok("mail".to_string())));
        let service = ColdEmailService::new(
            Arc::new(StubFetcher::returning("unused")),
            reader,
            pipeline.clone(),
        );

        let failure = service
            .generate(request_with_text(ACME_TEXT))
            .await
            .unwrap_err();

        assert!(matches!(failure, Failure::UnreadableResume { .. }));
        assert_eq!(pipeline.extract_call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_extraction_never_writes_mail() {
        let h = harness(
            StubFetcher::returning("unused"),
            StubResumeReader::returning("Jane Doe"),
            StubPipeline::new(vec![], Ok("mail".to_string())),
        );

        let mut session = ColdEmailSession::new();
        let state = session
            .trigger(&h.service, request_with_text("lorem ipsum"))
            .await;

        assert!(matches!(state, SessionState::Failed(Failure::ExtractionEmpty)));
        assert_eq!(h.pipeline.extract_call_count(), 1);
        assert!(h.pipeline.mail_calls().is_empty());
    }

    #[tokio::test]
    async fn test_only_first_of_many_postings_is_mailed() {
        let second = JobPosting {
            title: Some("Staff Engineer".to_string()),
            ..Default::default()
        };
        let h = harness(
            StubFetcher::returning("unused"),
            StubResumeReader::returning("Jane Doe"),
            StubPipeline::new(vec![acme_posting(), second], Ok("mail".to_string())),
        );

        let mail = h
            .service
            .generate(request_with_text("two openings"))
            .await
            .unwrap();

        assert_eq!(mail.extracted_jobs, 2);
        let calls = h.pipeline.mail_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, acme_posting());
        assert_eq!(mail.job, acme_posting());
    }

    #[tokio::test]
    async fn test_pipeline_error_becomes_generic_failure() {
        let h = harness(
            StubFetcher::returning("unused"),
            StubResumeReader::returning("Jane Doe"),
            StubPipeline::new(vec![acme_posting()], Err("model overloaded".to_string())),
        );

        let mut session = ColdEmailSession::new();
        let state = session
            .trigger(&h.service, request_with_text(ACME_TEXT))
            .await;

        let SessionState::Failed(failure) = state else {
            panic!("expected failure, got {state:?}");
        };
        assert!(matches!(failure, Failure::Generic(_)));
        assert!(failure.to_string().contains("model overloaded"));
        assert_eq!(failure.code(), "GENERATION_FAILED");
    }

    #[tokio::test]
    async fn test_additional_info_reaches_the_pipeline() {
        let h = harness(
            StubFetcher::returning("unused"),
            StubResumeReader::returning("Jane Doe"),
            StubPipeline::new(vec![acme_posting()], Ok("mail".to_string())),
        );
        let mut request = request_with_text(ACME_TEXT);
        request.additional_info = Some(" Portfolio: janedoe.dev ".to_string());

        h.service.generate(request).await.unwrap();

        let calls = h.pipeline.mail_calls();
        assert_eq!(calls[0].1.additional_info, "Portfolio: janedoe.dev");
        assert_eq!(calls[0].1.resume_text, "Jane Doe");
    }

    #[tokio::test]
    async fn test_url_is_fetched_when_no_manual_text() {
        let h = harness(
            StubFetcher::returning("<careers page> Rust Engineer at Initech"),
            StubResumeReader::returning("Jane Doe"),
            StubPipeline::new(vec![acme_posting()], Ok("mail".to_string())),
        );
        let request = ColdEmailRequest {
            job_url: Some("https://initech.test/jobs/7".to_string()),
            resume: Some(resume_upload()),
            ..Default::default()
        };

        h.service.generate(request).await.unwrap();

        assert_eq!(h.fetcher.call_count(), 1);
        assert_eq!(
            h.pipeline.extract_inputs(),
            vec!["<careers page> Rust Engineer at Initech".to_string()]
        );
    }

    #[tokio::test]
    async fn test_reset_returns_to_idle_and_drops_download() {
        let h = harness(
            StubFetcher::returning("unused"),
            StubResumeReader::returning("Jane Doe"),
            StubPipeline::new(vec![acme_posting()], Ok("mail".to_string())),
        );

        let mut session = ColdEmailSession::new();
        assert!(matches!(session.state(), SessionState::Idle));
        session
            .trigger(&h.service, request_with_text(ACME_TEXT))
            .await;
        assert!(session.download().is_some());

        session.reset();
        assert!(matches!(session.state(), SessionState::Idle));
        assert!(session.download().is_none());
    }

    #[test]
    fn test_only_generic_failures_are_collaborator_faults() {
        assert!(Failure::Generic("model overloaded".to_string()).is_collaborator_fault());
        for failure in [
            Failure::MissingJobInfo { fetch_error: None },
            Failure::MissingJobInfo {
                fetch_error: Some("Could not fetch URL".to_string()),
            },
            Failure::MissingResume,
            Failure::UnreadableResume {
                reason: "not a PDF".to_string(),
            },
            Failure::ExtractionEmpty,
        ] {
            assert!(!failure.is_collaborator_fault(), "{failure:?}");
        }
    }

    #[test]
    fn test_failure_messages_match_user_copy() {
        assert_eq!(
            Failure::MissingResume.to_string(),
            "Please upload your resume"
        );
        assert_eq!(
            Failure::ExtractionEmpty.to_string(),
            "Could not extract job details. Try a different job post."
        );
        assert!(Failure::MissingResume.detail().is_none());
    }
}
