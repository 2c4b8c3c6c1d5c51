use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use omnicall_directory_core::{Agent, CreateAgentRequest, Error as DirectoryError};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub success: bool,
    pub agent: Agent,
}

/// Add an operator that inbound calls can be routed to
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateAgentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AgentResponse>), ApiError> {
    let Json(request) = body.map_err(|_| ApiError::bad_request("Invalid request body"))?;

    let agent = state.store.create_agent(request).await.map_err(|e| match e {
        DirectoryError::AlreadyExists { .. } => ApiError::bad_request("Agent ID or email already exists"),
        other => ApiError::from_store("Failed to create agent", other),
    })?;

    Ok((StatusCode::CREATED, Json(AgentResponse { success: true, agent })))
}
