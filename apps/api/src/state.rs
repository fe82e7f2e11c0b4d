use std::sync::Arc;

use crate::config::Config;
use crate::generation::session::ColdEmailService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ColdEmailService>,
    pub config: Config,
}
