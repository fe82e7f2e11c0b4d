// Prompt templates for job extraction and cold email drafting.
// Shared fragments come from llm_client::prompts.

/// Role statement for job extraction; JSON_ONLY_SYSTEM is appended at call time.
pub const EXTRACT_JOBS_SYSTEM: &str = "You are a precise recruiting assistant that \
    extracts job postings from text scraped from careers pages or pasted by a user.";

/// Job extraction prompt. Replace `{job_text}` before sending.
pub const EXTRACT_JOBS_PROMPT_TEMPLATE: &str = r#"The text below comes from a job posting or a careers page.
Extract every job posting it describes and return a JSON ARRAY of objects with these keys:
[
  {
    "title": "Senior Backend Engineer",
    "company": "Acme Corp",
    "location": "Remote",
    "experience": "5+ years",
    "skills": ["Python", "PostgreSQL"],
    "description": "One or two sentence summary of the role"
  }
]

Rules:
- Use null for any field the text does not state. Do NOT guess.
- Keep postings in the order they appear in the text.
- Return an empty array if the text does not describe any job.

JOB POSTING TEXT:
{job_text}"#;

/// Role statement for email drafting; NO_PREAMBLE_SYSTEM is appended at call time.
pub const WRITE_MAIL_SYSTEM: &str = "You are an experienced career coach who writes \
    concise, specific cold emails from job applicants to hiring managers.";

/// Cold email prompt. Replace `{job_json}`, `{resume_text}` and `{additional_info}`.
pub const WRITE_MAIL_PROMPT_TEMPLATE: &str = r#"Write a cold email from the applicant to the hiring manager for the job below.

JOB:
{job_json}

APPLICANT RESUME:
{resume_text}

ADDITIONAL INFORMATION FROM THE APPLICANT:
{additional_info}

Guidelines:
- Open with a subject line of the form "Subject: ...", then the email body.
- Connect two or three concrete facts from the resume to the job's requirements.
- Mention the additional information where it strengthens the application.
- Use ONLY facts present in the resume and additional information. Do NOT invent experience.
- Keep it under 250 words and end with a clear, polite call to action and the applicant's name."#;

/// Substituted for `{additional_info}` when the applicant gave none.
pub const NO_ADDITIONAL_INFO: &str = "(none provided)";
