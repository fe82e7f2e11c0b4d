mod config;
mod errors;
mod generation;
mod job_source;
mod llm_client;
mod resume;
mod routes;
mod state;
#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::generation::pipeline::LlmMailPipeline;
use crate::generation::session::ColdEmailService;
use crate::job_source::fetcher::WebPageFetcher;
use crate::llm_client::LlmClient;
use crate::resume::cache::ResumeCache;
use crate::resume::PdfResumeReader;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Coldmail API v{}", env!("CARGO_PKG_VERSION"));

    let llm = LlmClient::new(config.anthropic_api_key.clone())
        .context("Failed to build LLM HTTP client")?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let fetcher = WebPageFetcher::new(Duration::from_secs(config.fetch_timeout_secs))
        .context("Failed to build job page HTTP client")?;

    let cache_capacity = NonZeroUsize::new(config.resume_cache_capacity)
        .context("RESUME_CACHE_CAPACITY must be at least 1")?;
    let resume_reader = PdfResumeReader::new(ResumeCache::new(cache_capacity));
    info!("Resume cache holds up to {cache_capacity} documents");

    let service = ColdEmailService::new(
        Arc::new(fetcher),
        Arc::new(resume_reader),
        Arc::new(LlmMailPipeline::new(llm)),
    );

    let state = AppState {
        service: Arc::new(service),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
