use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::models::{Feedback, InterviewConfig, InterviewSession, TurnReply};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub config: InterviewConfig,
}

#[derive(Debug, Deserialize)]
pub struct SubmitResponseRequest {
    pub user_id: Uuid,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ConcludeRequest {
    pub user_id: Uuid,
}

/// POST /api/v1/interviews
pub async fn handle_start_interview(
    State(state): State<AppState>,
    Json(req): Json<StartInterviewRequest>,
) -> Result<Json<InterviewSession>, AppError> {
    if req.config.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description must not be empty".to_string(),
        ));
    }
    let session = state
        .orchestrator
        .start_interview(req.config, req.user_id)
        .await?;
    Ok(Json(session))
}

/// POST /api/v1/interviews/:id/messages
pub async fn handle_submit_response(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitResponseRequest>,
) -> Result<Json<TurnReply>, AppError> {
    if req.message.trim().is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }
    let reply = state
        .orchestrator
        .process_user_response(id, &req.message, req.user_id)
        .await?;
    Ok(Json(reply))
}

/// POST /api/v1/interviews/:id/conclude
pub async fn handle_conclude(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ConcludeRequest>,
) -> Result<Json<Feedback>, AppError> {
    let feedback = state
        .orchestrator
        .conclude_interview(id, req.user_id)
        .await?;
    Ok(Json(feedback))
}

/// GET /api/v1/interviews/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewSession>, AppError> {
    let session = state.orchestrator.get_session(id).await?;
    Ok(Json(session))
}

/// GET /api/v1/interviews/:id/feedback
pub async fn handle_get_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Feedback>, AppError> {
    let feedback = state.orchestrator.get_feedback(id).await?;
    Ok(Json(feedback))
}
