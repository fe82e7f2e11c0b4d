//! Job content resolution: pasted text wins, otherwise the posting URL is fetched.

pub mod fetcher;

use thiserror::Error;
use tracing::{debug, warn};

use crate::job_source::fetcher::{FetchError, PageFetcher};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("No job text or URL was provided")]
    NoContent,

    #[error("Could not fetch URL: {0}")]
    Fetch(#[from] FetchError),
}

/// Returns the job posting text for one request.
///
/// Non-blank `manual_text` is returned trimmed and `url` is ignored. Otherwise a
/// non-blank `url` is fetched once. A page with no readable text counts as no content.
pub async fn resolve_job_content(
    manual_text: Option<&str>,
    url: Option<&str>,
    fetcher: &dyn PageFetcher,
) -> Result<String, ResolveError> {
    if let Some(text) = non_blank(manual_text) {
        debug!("Using pasted job text ({} chars)", text.len());
        return Ok(text.to_string());
    }

    let Some(url) = non_blank(url) else {
        return Err(ResolveError::NoContent);
    };

    let page = fetcher.fetch_text(url).await.map_err(|e| {
        warn!("Job page fetch failed for {url}: {e}");
        ResolveError::Fetch(e)
    })?;

    match non_blank(Some(page.as_str())) {
        Some(text) => Ok(text.to_string()),
        None => {
            warn!("Job page {url} has no readable text");
            Err(ResolveError::NoContent)
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
