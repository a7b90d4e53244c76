//! Task REST API

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::{AgentState, ApiError};
use crate::agent::{CancelOutcome, Task};
use crate::error::TaskError;

/// Command submission body
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub command: String,
}

/// Accepted task
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub task_id: String,
}

/// POST /tasks - accept a command; the task runs in the background
pub async fn submit_task(
    State(state): State<Arc<AgentState>>,
    Json(request): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let task_id = state.executor.submit(&request.command).await?;
    Ok((StatusCode::ACCEPTED, Json(SubmitResponse { task_id })))
}

/// GET /tasks/{id}
pub async fn get_task(
    State(state): State<Arc<AgentState>>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    Ok(Json(state.executor.get(&id).await?))
}

/// POST /tasks/{id}/cancel
pub async fn cancel_task(
    State(state): State<Arc<AgentState>>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    match state.executor.cancel(&id).await? {
        CancelOutcome::Requested => {
            info!("Cancel accepted for task {}", id);
            Ok(Json(state.executor.get(&id).await?))
        }
        CancelOutcome::AlreadyTerminal | CancelOutcome::NotOwned => {
            let task = state.executor.get(&id).await?;
            Err(ApiError::new(
                StatusCode::CONFLICT,
                TaskError::InvalidTransition {
                    from: task.state.to_string(),
                    to: "cancelled".to_string(),
                },
            ))
        }
    }
}
