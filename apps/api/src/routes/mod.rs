pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Mock-interview API
        .route("/api/v1/interviews", post(handlers::handle_start_interview))
        .route("/api/v1/interviews/:id", get(handlers::handle_get_session))
        .route(
            "/api/v1/interviews/:id/messages",
            post(handlers::handle_submit_response),
        )
        .route(
            "/api/v1/interviews/:id/conclude",
            post(handlers::handle_conclude),
        )
        .route(
            "/api/v1/interviews/:id/feedback",
            get(handlers::handle_get_feedback),
        )
        .with_state(state)
}
