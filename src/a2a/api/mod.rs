//! Agent API Endpoints
//!
//! Routes:
//! - GET  /.well-known/agent.json - Agent descriptor
//! - POST /                       - JSON-RPC (message/send, tasks/get, tasks/cancel)
//! - POST /tasks                  - Submit a command
//! - GET  /tasks/{id}             - Task snapshot
//! - POST /tasks/{id}/cancel      - Request cancellation
//! - GET  /tasks/{id}/events      - Task events (SSE)
//! - GET  /health                 - Health check

pub mod health;
pub mod rpc;
pub mod stream;
pub mod tasks;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::agent::{AgentDescriptor, TaskExecutor};
use crate::error::TaskError;

/// Application state shared across handlers
pub struct AgentState {
    pub descriptor: AgentDescriptor,
    pub executor: TaskExecutor,
    /// Server start time for uptime calculation
    pub start_time: Instant,
    pub version: &'static str,
}

impl AgentState {
    pub fn new(descriptor: AgentDescriptor, executor: TaskExecutor) -> Self {
        Self {
            descriptor,
            executor,
            start_time: Instant::now(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
}

/// Task error mapped to an HTTP response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: TaskError,
}

impl ApiError {
    pub fn new(status: StatusCode, error: TaskError) -> Self {
        Self { status, error }
    }
}

impl From<TaskError> for ApiError {
    fn from(error: TaskError) -> Self {
        let status = match &error {
            TaskError::TaskNotFound(_) => StatusCode::NOT_FOUND,
            TaskError::TaskStore(_) => StatusCode::SERVICE_UNAVAILABLE,
            TaskError::InvalidTransition { .. } => StatusCode::CONFLICT,
            _ => StatusCode::BAD_REQUEST,
        };
        Self { status, error }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = match &self.error {
            TaskError::TaskNotFound(_) | TaskError::InvalidTransition { .. } => None,
            other => Some(other.kind().as_str()),
        };
        let body = ErrorResponse {
            error: self.error.to_string(),
            kind,
        };
        (self.status, Json(body)).into_response()
    }
}

/// GET /.well-known/agent.json
pub async fn agent_card(State(state): State<Arc<AgentState>>) -> Json<AgentDescriptor> {
    Json(state.descriptor.describe().clone())
}

/// Create the full agent router
pub fn agent_router(state: Arc<AgentState>) -> Router {
    Router::new()
        .route("/.well-known/agent.json", get(agent_card))
        .route("/", post(rpc::rpc_handler))
        .route("/tasks", post(tasks::submit_task))
        .route("/tasks/{id}", get(tasks::get_task))
        .route("/tasks/{id}/cancel", post(tasks::cancel_task))
        .route("/tasks/{id}/events", get(stream::stream_task_events))
        .route("/health", get(health::health_check))
        .route("/healthz", get(health::liveness))
        .with_state(state)
}
