// Cold email generation: job extraction, mail drafting and the per-request flow.
// All model calls go through pipeline::LlmMailPipeline.

pub mod handlers;
pub mod job_posting;
pub mod pipeline;
pub mod prompts;
pub mod session;
