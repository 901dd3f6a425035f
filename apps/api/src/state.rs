use std::sync::Arc;

use crate::interview::orchestrator::InterviewOrchestrator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The session engine. Owns the LLM client and session store; handlers
    /// never touch either directly.
    pub orchestrator: Arc<InterviewOrchestrator>,
}
