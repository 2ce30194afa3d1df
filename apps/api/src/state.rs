use std::sync::Arc;

use crate::config::Config;
use crate::drafting::session::SessionStore;
use crate::llm_client::ModelGateway;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Model gateway. `GeminiClient` in production, a scripted stub in tests.
    pub llm: Arc<dyn ModelGateway>,
    pub sessions: SessionStore,
    pub config: Config,
}
